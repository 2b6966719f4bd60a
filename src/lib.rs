// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! CUFit: fitness and meal planning backend
//!
//! This crate provides the backend API for user profiles, profile-driven
//! meal and workout matching, a catalog-aware chat assistant, and
//! subscription billing.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{BillingService, CatalogService, ChatService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub catalog: Arc<CatalogService>,
    pub assistant: ChatService,
    pub billing: BillingService,
}
