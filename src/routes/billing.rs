// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Billing routes: plans, checkout, subscriptions and the Stripe webhook.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Plan, Subscription};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Header carrying the webhook signature.
const SIGNATURE_HEADER: &str = "stripe-signature";

/// Public billing routes.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/billing/plans", get(list_plans))
        .route("/billing/webhook", post(webhook))
}

/// Billing routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/billing/checkout", post(checkout))
        .route("/api/billing/subscriptions", get(list_subscriptions))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub plan_name: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckoutResponse {
    pub session_url: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
}

async fn list_plans(State(state): State<Arc<AppState>>) -> Json<Vec<Plan>> {
    Json(state.catalog.plans().to_vec())
}

async fn checkout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(body), _): WithRejection<Json<CheckoutBody>, AppError>,
) -> Result<Json<CheckoutResponse>> {
    let plan_name = body.plan_name.trim();
    if plan_name.is_empty() {
        return Err(AppError::BadRequest("Plan name is required".to_string()));
    }

    let account = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let session_url = state.billing.checkout(account, plan_name).await?;
    Ok(Json(CheckoutResponse { session_url }))
}

async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Subscription>>> {
    Ok(Json(
        state.db.get_subscriptions_for_user(&user.user_id).await?,
    ))
}

/// Receive a provider event. The raw body is needed for signature checks.
async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let outcome = state
        .billing
        .handle_webhook(&body, signature, chrono::Utc::now().timestamp())
        .await?;

    tracing::info!(status = outcome.as_str(), "Webhook handled");
    Ok(Json(WebhookResponse {
        status: outcome.as_str(),
    }))
}
