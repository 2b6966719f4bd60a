// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stripe API client and webhook signature verification.
//!
//! Handles:
//! - Customer and checkout session creation
//! - Subscription, invoice and payment intent lookups
//! - `Stripe-Signature` header verification

use crate::error::AppError;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook payload, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Parameters for a subscription-mode checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer_id: String,
    pub price_id: String,
    pub client_reference_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// Subscription as returned by `GET /v1/subscriptions/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSubscription {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub items: ListOf<SubscriptionItem>,
}

impl ProviderSubscription {
    /// Price of the first subscription item.
    pub fn price_id(&self) -> Option<&str> {
        self.items.data.first().map(|item| item.price.id.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListOf<T> {
    pub data: Vec<T>,
}

impl<T> Default for ListOf<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    pub price: PriceRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceRef {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderInvoice {
    pub id: String,
    #[serde(default)]
    pub payment_intent: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderPaymentIntent {
    pub id: String,
    pub amount_received: i64,
    pub status: String,
    pub currency: String,
}

/// Payment provider operations used by billing.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a customer and return its ID.
    async fn create_customer(&self, email: &str) -> Result<String, AppError>;

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, AppError>;

    async fn retrieve_subscription(&self, id: &str) -> Result<ProviderSubscription, AppError>;

    async fn retrieve_invoice(&self, id: &str) -> Result<ProviderInvoice, AppError>;

    async fn retrieve_payment_intent(&self, id: &str)
        -> Result<ProviderPaymentIntent, AppError>;
}

/// Stripe REST client (form-encoded requests, JSON responses).
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(secret_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://api.stripe.com/v1".to_string(),
            secret_key,
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::PaymentProvider(e.to_string()))?;

        self.check_response_json(response).await
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::PaymentProvider(e.to_string()))?;

        self.check_response_json(response).await
    }

    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<StripeErrorWrapper>(&body)
                .ok()
                .and_then(|w| w.error.message)
                .unwrap_or(body);
            return Err(AppError::PaymentProvider(format!(
                "HTTP {}: {}",
                status, message
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::PaymentProvider(format!("JSON parse error: {}", e)))
    }
}

#[derive(Deserialize)]
struct StripeErrorWrapper {
    error: StripeErrorBody,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_customer(&self, email: &str) -> Result<String, AppError> {
        let customer: Created = self.post_form("customers", &[("email", email)]).await?;
        tracing::info!(customer_id = %customer.id, "Stripe customer created");
        Ok(customer.id)
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, AppError> {
        self.post_form(
            "checkout/sessions",
            &[
                ("mode", "subscription"),
                ("payment_method_types[0]", "card"),
                ("customer", request.customer_id.as_str()),
                ("line_items[0][price]", request.price_id.as_str()),
                ("line_items[0][quantity]", "1"),
                ("client_reference_id", request.client_reference_id.as_str()),
                ("success_url", request.success_url.as_str()),
                ("cancel_url", request.cancel_url.as_str()),
            ],
        )
        .await
    }

    async fn retrieve_subscription(&self, id: &str) -> Result<ProviderSubscription, AppError> {
        self.get_json(&format!("subscriptions/{}", id)).await
    }

    async fn retrieve_invoice(&self, id: &str) -> Result<ProviderInvoice, AppError> {
        self.get_json(&format!("invoices/{}", id)).await
    }

    async fn retrieve_payment_intent(
        &self,
        id: &str,
    ) -> Result<ProviderPaymentIntent, AppError> {
        self.get_json(&format!("payment_intents/{}", id)).await
    }
}

// ─── Webhook Signatures ─────────────────────────────────────────

/// Errors from webhook signature verification.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Malformed signature header")]
    Malformed,

    #[error("Signature timestamp outside tolerance")]
    Expired,

    #[error("No matching signature")]
    Mismatch,
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`.
pub fn compute_signature(payload: &[u8], timestamp: i64, secret: &str) -> String {
    // HMAC accepts keys of any length
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=<hex>...]`).
///
/// Any `v1` entry may match; other schemes are ignored.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for item in header.split(',') {
        match item.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse::<i64>().map_err(|_| SignatureError::Malformed)?)
            }
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if candidates.is_empty() {
        return Err(SignatureError::Malformed);
    }

    if now.abs_diff(timestamp) > SIGNATURE_TOLERANCE_SECS.unsigned_abs() {
        return Err(SignatureError::Expired);
    }

    let expected = compute_signature(payload, timestamp, secret);
    let matched = candidates
        .iter()
        .any(|candidate| bool::from(candidate.as_bytes().ct_eq(expected.as_bytes())));

    if matched {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}
