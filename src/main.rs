// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CUFit API Server
//!
//! Serves user profiles, profile-matched meals and workouts, the CUFITBot
//! assistant and subscription billing.

use cufit::{
    config::Config,
    db::FirestoreDb,
    services::{BillingService, CatalogService, ChatService, GeminiModel, StripeClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting CUFit API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    // Load catalog reference data
    tracing::info!(path = %config.catalog_path, "Loading catalog");
    let catalog = Arc::new(CatalogService::load_from_file(&config.catalog_path)?);
    tracing::info!(
        meals = catalog.meals().len(),
        exercises = catalog.exercises().len(),
        plans = catalog.plans().len(),
        "Catalog loaded"
    );

    let model = GeminiModel::new(config.gemini_api_key.clone(), config.gemini_model.clone());
    let assistant = ChatService::new(Arc::new(model), catalog.clone());
    tracing::info!(model = %config.gemini_model, "Assistant initialized");

    let billing = BillingService::new(
        Arc::new(StripeClient::new(config.stripe_secret_key.clone())),
        db.clone(),
        catalog.clone(),
        config.stripe_webhook_secret.clone(),
        config.frontend_url.clone(),
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        catalog,
        assistant,
        billing,
    });

    // Build router
    let app = cufit::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cufit=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
