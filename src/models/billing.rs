// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Billing plans and provider-mirrored subscription/payment records.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A purchasable subscription plan (catalog reference data).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Plan {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_interval")]
    pub interval: String,
    pub product_id: String,
    pub price_id: String,
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_interval() -> String {
    "month".to_string()
}

/// Subscription created by a completed checkout (document ID = provider ID).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Subscription {
    pub subscription_id: String,
    pub status: String,
    pub plan_name: String,
    /// Owner, from the checkout session's client reference
    pub user_id: Option<String>,
    pub customer_id: Option<String>,
    pub created_at: String,
}

/// Payment for a subscription invoice (document ID = payment intent ID).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub payment_intent: String,
    pub subscription_id: String,
    /// Smallest currency unit
    pub amount: i64,
    pub status: String,
    pub currency: String,
    pub created_at: String,
}

/// Provider webhook event that has been processed (document ID = event ID).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEventRecord {
    pub event_id: String,
    pub event_type: String,
    pub received_at: String,
}
