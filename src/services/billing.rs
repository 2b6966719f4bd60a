// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Checkout and webhook handling for subscriptions.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{Payment, Subscription, User, WebhookEventRecord};
use crate::services::catalog::CatalogService;
use crate::services::stripe::{verify_signature, CheckoutRequest, PaymentProvider};
use crate::time_utils::now_rfc3339;
use serde::Deserialize;
use std::sync::Arc;

/// The only event type that changes stored state.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Result of handling one webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Processed,
    Ignored,
    Duplicate,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Processed => "success",
            WebhookOutcome::Ignored => "ignored",
            WebhookOutcome::Duplicate => "duplicate",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Event {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CompletedSession {
    subscription: Option<String>,
    invoice: Option<String>,
    client_reference_id: Option<String>,
    customer: Option<String>,
}

/// Billing service: checkout creation and webhook processing.
pub struct BillingService {
    provider: Arc<dyn PaymentProvider>,
    db: FirestoreDb,
    catalog: Arc<CatalogService>,
    webhook_secret: String,
    frontend_url: String,
}

impl BillingService {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        db: FirestoreDb,
        catalog: Arc<CatalogService>,
        webhook_secret: String,
        frontend_url: String,
    ) -> Self {
        Self {
            provider,
            db,
            catalog,
            webhook_secret,
            frontend_url,
        }
    }

    /// Start a checkout for `plan_name` and return the hosted session URL.
    ///
    /// Reuses the user's provider customer when one exists.
    pub async fn checkout(&self, mut user: User, plan_name: &str) -> Result<String, AppError> {
        let plan = self
            .catalog
            .plan_by_name(plan_name)
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;

        let customer_id = match &user.customer_id {
            Some(id) => id.clone(),
            None => self.provider.create_customer(&user.email).await?,
        };

        user.customer_id = Some(customer_id.clone());
        user.selected_plan = Some(plan.name.clone());
        self.db.upsert_user(&user).await?;

        let frontend = self.frontend_url.trim_end_matches('/');
        let session = self
            .provider
            .create_checkout_session(&CheckoutRequest {
                customer_id,
                price_id: plan.price_id.clone(),
                client_reference_id: user.user_id.clone(),
                success_url: format!("{}/billing/plans", frontend),
                cancel_url: format!("{}/billing", frontend),
            })
            .await?;

        tracing::info!(
            user_id = %user.user_id,
            plan = %plan.name,
            session_id = %session.id,
            "Checkout session created"
        );

        session
            .url
            .ok_or_else(|| AppError::PaymentProvider("Checkout session has no URL".to_string()))
    }

    /// Verify and process a webhook delivery.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<WebhookOutcome, AppError> {
        let signature =
            signature.ok_or_else(|| AppError::BadRequest("Missing signature".to_string()))?;
        verify_signature(payload, signature, &self.webhook_secret, now).map_err(|e| {
            tracing::warn!(error = %e, "Rejected webhook signature");
            AppError::BadRequest("Invalid signature".to_string())
        })?;

        let event: Event = serde_json::from_slice(payload)
            .map_err(|e| AppError::BadRequest(format!("Invalid event payload: {}", e)))?;

        if event.event_type != CHECKOUT_COMPLETED {
            tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring webhook event");
            return Ok(WebhookOutcome::Ignored);
        }

        if self.db.webhook_event_seen(&event.id).await? {
            tracing::info!(event_id = %event.id, "Duplicate webhook event");
            return Ok(WebhookOutcome::Duplicate);
        }

        let session: CompletedSession = serde_json::from_value(event.data.object)
            .map_err(|e| AppError::BadRequest(format!("Invalid checkout session: {}", e)))?;
        let subscription_id = session
            .subscription
            .ok_or_else(|| AppError::BadRequest("Session has no subscription".to_string()))?;

        let provider_sub = self.provider.retrieve_subscription(&subscription_id).await?;
        let price_id = provider_sub
            .price_id()
            .ok_or_else(|| AppError::BadRequest("Subscription has no items".to_string()))?;
        let plan = self
            .catalog
            .plan_by_price_id(price_id)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown price: {}", price_id)))?;

        let now_rfc = now_rfc3339();
        let subscription = Subscription {
            subscription_id: provider_sub.id.clone(),
            status: provider_sub.status.clone(),
            plan_name: plan.name.clone(),
            user_id: session.client_reference_id,
            customer_id: session.customer,
            created_at: now_rfc.clone(),
        };

        let payment = match session.invoice {
            Some(invoice_id) => self.fetch_payment(&invoice_id, &subscription_id, &now_rfc).await?,
            None => {
                tracing::warn!(subscription_id = %subscription_id, "Checkout session has no invoice");
                None
            }
        };

        let record = WebhookEventRecord {
            event_id: event.id,
            event_type: event.event_type,
            received_at: now_rfc,
        };
        let recorded = self
            .db
            .record_checkout(&record, &subscription, payment.as_ref())
            .await?;

        if recorded {
            Ok(WebhookOutcome::Processed)
        } else {
            Ok(WebhookOutcome::Duplicate)
        }
    }

    async fn fetch_payment(
        &self,
        invoice_id: &str,
        subscription_id: &str,
        now: &str,
    ) -> Result<Option<Payment>, AppError> {
        let invoice = self.provider.retrieve_invoice(invoice_id).await?;
        let Some(intent_id) = invoice.payment_intent else {
            tracing::warn!(invoice_id = %invoice.id, "Invoice has no payment intent, skipping payment");
            return Ok(None);
        };

        let intent = self.provider.retrieve_payment_intent(&intent_id).await?;
        Ok(Some(Payment {
            payment_intent: intent.id,
            subscription_id: subscription_id.to_string(),
            amount: intent.amount_received,
            status: intent.status,
            currency: intent.currency,
            created_at: now.to_string(),
        }))
    }
}
