// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use cufit::config::Config;
use cufit::db::FirestoreDb;
use cufit::error::AppError;
use cufit::routes::create_router;
use cufit::services::assistant::{ChatTurn, ModelReply, ToolDeclaration};
use cufit::services::stripe::{
    CheckoutRequest, CheckoutSession, ListOf, PriceRef, ProviderInvoice, ProviderPaymentIntent,
    ProviderSubscription, SubscriptionItem,
};
use cufit::services::{
    AssistantError, BillingService, CatalogService, ChatModel, ChatService, PaymentProvider,
};
use cufit::AppState;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Small catalog shared by the HTTP tests.
#[allow(dead_code)]
pub const TEST_CATALOG: &str = r#"{
    "meals": [
        {"id": 1, "name": "Oatmeal with Berries", "meal_type": "breakfast", "diet_selection": "no-diet",
         "diet_preference": "vegan", "goal_selection": "weight-loss", "cooking_time": "<10", "calories": 320},
        {"id": 2, "name": "Keto Omelette", "meal_type": "breakfast", "diet_selection": "keto",
         "diet_preference": "eggitarian", "goal_selection": "muscle-gain", "cooking_time": "10-20", "calories": 410},
        {"id": 3, "name": "Grilled Chicken Salad", "meal_type": "lunch", "diet_selection": "keto",
         "diet_preference": "non-veg", "goal_selection": "muscle-gain", "cooking_time": "10-20", "calories": 520},
        {"id": 4, "name": "Quinoa Buddha Bowl", "meal_type": "lunch", "diet_selection": "no-diet",
         "diet_preference": "vegan", "cooking_time": "20-30", "calories": 480},
        {"id": 5, "name": "Grilled Salmon", "meal_type": "dinner", "diet_selection": "keto",
         "diet_preference": "non-veg", "goal_selection": "muscle-gain", "cooking_time": "20-30", "calories": 610},
        {"id": 6, "name": "Vegetable Curry", "meal_type": "dinner", "diet_selection": "no-diet",
         "diet_preference": "veg", "cooking_time": "30-45", "calories": 560},
        {"id": 7, "name": "Mixed Nuts", "meal_type": "snacks", "diet_selection": "keto",
         "diet_preference": "vegan", "cooking_time": "<10", "calories": 190}
    ],
    "exercises": [
        {"id": 1, "name": "Squats", "body_part": "legs", "exercise_type": "strength",
         "difficulty": "beginner", "impact_level": "medium", "duration_minutes": 10, "sets": 3, "reps": 12},
        {"id": 2, "name": "Glute Bridges", "body_part": "glutes", "exercise_type": "strength",
         "difficulty": "beginner", "impact_level": "low", "duration_minutes": 10, "sets": 3, "reps": 12,
         "equipment": ["yoga-mat"]},
        {"id": 3, "name": "Pull-ups", "body_part": "back", "exercise_type": "strength",
         "difficulty": "advanced", "impact_level": "low", "duration_minutes": 10, "sets": 4, "reps": 8,
         "equipment": ["pull-up-bar"]},
        {"id": 4, "name": "Plank", "body_part": "core", "exercise_type": "core",
         "difficulty": "intermediate", "impact_level": "low", "duration_minutes": 5, "sets": 3, "reps": 1}
    ],
    "master_workouts": [
        {"id": 1, "name": "Squats", "instructions": "Five sets of squats.", "video_url": "https://www.youtube.com/watch?v=a1"},
        {"id": 2, "name": "Core Stability", "instructions": "Planks and bird dogs.", "video_url": "https://www.youtube.com/watch?v=a2"}
    ],
    "campus_meals": [
        {"id": 1, "name": "Veggie Wrap", "location": "Library Cafe", "price_cents": 849}
    ],
    "plans": [
        {"name": "Basic", "price_cents": 499, "product_id": "prod_basic", "price_id": "price_basic"},
        {"name": "Premium", "price_cents": 999, "product_id": "prod_premium", "price_id": "price_premium"}
    ]
}"#;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

#[allow(dead_code)]
pub fn test_catalog() -> Arc<CatalogService> {
    Arc::new(CatalogService::load_from_json(TEST_CATALOG).expect("test catalog should load"))
}

/// Model that replays canned replies and records what it was sent.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ModelReply>>,
    pub seen: Mutex<Vec<Vec<ChatTurn>>>,
}

impl ScriptedModel {
    #[allow(dead_code)]
    pub fn new(replies: Vec<ModelReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn generate(
        &self,
        _system_instruction: &str,
        history: &[ChatTurn],
        _tools: &[ToolDeclaration],
    ) -> Result<ModelReply, AssistantError> {
        self.seen.lock().unwrap().push(history.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(AssistantError::EmptyResponse)
    }
}

/// Payment provider with fixed responses for one subscription.
#[allow(dead_code)]
pub struct FakeProvider {
    pub price_id: String,
    /// Whether invoices carry a payment intent
    pub invoice_has_intent: bool,
    pub created_customers: Mutex<Vec<String>>,
    pub checkouts: Mutex<Vec<CheckoutRequest>>,
}

impl FakeProvider {
    pub fn new(price_id: &str) -> Self {
        Self {
            price_id: price_id.to_string(),
            invoice_has_intent: true,
            created_customers: Mutex::new(Vec::new()),
            checkouts: Mutex::new(Vec::new()),
        }
    }

    /// Provider whose invoices were settled without a payment intent.
    #[allow(dead_code)]
    pub fn without_payment_intent(price_id: &str) -> Self {
        Self {
            invoice_has_intent: false,
            ..Self::new(price_id)
        }
    }
}

#[async_trait]
impl PaymentProvider for FakeProvider {
    async fn create_customer(&self, email: &str) -> Result<String, AppError> {
        self.created_customers.lock().unwrap().push(email.to_string());
        Ok("cus_test".to_string())
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, AppError> {
        self.checkouts.lock().unwrap().push(request.clone());
        Ok(CheckoutSession {
            id: "cs_test".to_string(),
            url: Some("https://checkout.stripe.test/cs_test".to_string()),
        })
    }

    async fn retrieve_subscription(&self, id: &str) -> Result<ProviderSubscription, AppError> {
        Ok(ProviderSubscription {
            id: id.to_string(),
            status: "active".to_string(),
            items: ListOf {
                data: vec![SubscriptionItem {
                    price: PriceRef {
                        id: self.price_id.clone(),
                    },
                }],
            },
        })
    }

    async fn retrieve_invoice(&self, id: &str) -> Result<ProviderInvoice, AppError> {
        Ok(ProviderInvoice {
            id: id.to_string(),
            payment_intent: self.invoice_has_intent.then(|| format!("pi_{}", id)),
        })
    }

    async fn retrieve_payment_intent(
        &self,
        id: &str,
    ) -> Result<ProviderPaymentIntent, AppError> {
        Ok(ProviderPaymentIntent {
            id: id.to_string(),
            amount_received: 499,
            status: "succeeded".to_string(),
            currency: "usd".to_string(),
        })
    }
}

/// Build app state around the given database and fakes.
#[allow(dead_code)]
pub fn build_state(
    db: FirestoreDb,
    model: Arc<dyn ChatModel>,
    provider: Arc<dyn PaymentProvider>,
) -> Arc<AppState> {
    let config = Config::default();
    let catalog = test_catalog();
    let assistant = ChatService::new(model, catalog.clone());
    let billing = BillingService::new(
        provider,
        db.clone(),
        catalog.clone(),
        config.stripe_webhook_secret.clone(),
        config.frontend_url.clone(),
    );

    Arc::new(AppState {
        config,
        db,
        catalog,
        assistant,
        billing,
    })
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = build_state(
        test_db_offline(),
        Arc::new(ScriptedModel::default()),
        Arc::new(FakeProvider::new("price_basic")),
    );
    (create_router(state.clone()), state)
}

/// Create a test app backed by the Firestore emulator.
#[allow(dead_code)]
pub async fn create_emulator_app(
    model: Arc<dyn ChatModel>,
) -> (axum::Router, Arc<AppState>) {
    let state = build_state(
        test_db().await,
        model,
        Arc::new(FakeProvider::new("price_basic")),
    );
    (create_router(state.clone()), state)
}

/// Access token for `user_id`, as issued at login.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    cufit::middleware::auth::create_jwt(user_id, signing_key).expect("Failed to create JWT")
}

/// Unique suffix for test isolation against a shared emulator.
#[allow(dead_code)]
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
