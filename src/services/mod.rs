// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod assistant;
pub mod billing;
pub mod catalog;
pub mod credentials;
pub mod gemini;
pub mod matching;
pub mod restrictions;
pub mod stripe;

pub use assistant::{AssistantError, ChatModel, ChatService};
pub use billing::{BillingService, WebhookOutcome};
pub use catalog::{CatalogError, CatalogService};
pub use gemini::GeminiModel;
pub use matching::Selection;
pub use stripe::{PaymentProvider, StripeClient};
