// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users and their preference profiles
//! - Refresh tokens
//! - Daily meal plans
//! - Subscriptions, payments and processed webhook events

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    DailyMealPlan, Payment, Profile, RefreshTokenRecord, Subscription, User, WebhookEventRecord,
};
use firestore::FirestoreConsistencySelector;
use futures_util::try_join;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Generic Document Helpers ─────────────────────────────────

    async fn get_doc<T>(&self, collection: &str, doc_id: &str) -> Result<Option<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn set_doc<T>(&self, collection: &str, doc_id: &str, object: &T) -> Result<(), AppError>
    where
        T: serde::Serialize + for<'de> serde::Deserialize<'de> + Sync + Send,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(doc_id)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, doc_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(doc_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All documents in `collection` whose `field` equals `value`.
    async fn query_eq<T>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(|q| q.for_all([q.field(field).eq(value)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_doc(collections::USERS, user_id).await
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .query_eq(collections::USERS, "username", username)
            .await?;
        Ok(users.into_iter().next())
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self.query_eq(collections::USERS, "email", email).await?;
        Ok(users.into_iter().next())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.set_doc(collections::USERS, &user.user_id, user).await
    }

    /// Atomically create a user together with its empty profile.
    pub async fn create_user_with_profile(
        &self,
        user: &User,
        profile: &Profile,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add user to transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(&user.user_id)
            .object(profile)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add profile to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(user_id = %user.user_id, "User created");
        Ok(())
    }

    // ─── Profile Operations ──────────────────────────────────────

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        self.get_doc(collections::PROFILES, user_id).await
    }

    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        self.set_doc(collections::PROFILES, &profile.user_id, profile)
            .await
    }

    // ─── Refresh Token Operations ────────────────────────────────

    pub async fn store_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError> {
        self.set_doc(collections::REFRESH_TOKENS, &record.token_hash, record)
            .await
    }

    pub async fn get_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, AppError> {
        self.get_doc(collections::REFRESH_TOKENS, token_hash).await
    }

    pub async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError> {
        self.delete_doc(collections::REFRESH_TOKENS, token_hash)
            .await
    }

    // ─── Meal Plan Operations ────────────────────────────────────

    pub async fn get_daily_plan(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Option<DailyMealPlan>, AppError> {
        self.get_doc(
            collections::DAILY_MEAL_PLANS,
            &DailyMealPlan::doc_id(user_id, date),
        )
        .await
    }

    pub async fn set_daily_plan(&self, plan: &DailyMealPlan) -> Result<(), AppError> {
        self.set_doc(
            collections::DAILY_MEAL_PLANS,
            &DailyMealPlan::doc_id(&plan.user_id, &plan.date),
            plan,
        )
        .await
    }

    // ─── Billing Operations ──────────────────────────────────────

    pub async fn get_subscriptions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Subscription>, AppError> {
        self.query_eq(collections::SUBSCRIPTIONS, "user_id", user_id)
            .await
    }

    /// Whether a provider event has already been processed.
    pub async fn webhook_event_seen(&self, event_id: &str) -> Result<bool, AppError> {
        let record: Option<WebhookEventRecord> =
            self.get_doc(collections::WEBHOOK_EVENTS, event_id).await?;
        Ok(record.is_some())
    }

    pub async fn get_payment(&self, payment_intent: &str) -> Result<Option<Payment>, AppError> {
        self.get_doc(collections::PAYMENTS, payment_intent).await
    }

    /// Atomically store a completed checkout and mark its event processed.
    ///
    /// The event record is read inside the transaction, so of two concurrent
    /// deliveries of one event only one commits. Returns `false` without
    /// writing anything when the event was already recorded.
    pub async fn record_checkout(
        &self,
        event: &WebhookEventRecord,
        subscription: &Subscription,
        payment: Option<&Payment>,
    ) -> Result<bool, AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let seen: Option<WebhookEventRecord> = client
            .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ))
            .fluent()
            .select()
            .by_id_in(collections::WEBHOOK_EVENTS)
            .obj()
            .one(&event.event_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if seen.is_some() {
            transaction
                .rollback()
                .await
                .map_err(|e| AppError::Database(format!("Transaction rollback failed: {}", e)))?;
            tracing::info!(event_id = %event.event_id, "Checkout already recorded");
            return Ok(false);
        }

        client
            .fluent()
            .update()
            .in_col(collections::SUBSCRIPTIONS)
            .document_id(&subscription.subscription_id)
            .object(subscription)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add subscription to transaction: {}", e))
            })?;

        if let Some(payment) = payment {
            client
                .fluent()
                .update()
                .in_col(collections::PAYMENTS)
                .document_id(&payment.payment_intent)
                .object(payment)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add payment to transaction: {}", e))
                })?;
        }

        client
            .fluent()
            .update()
            .in_col(collections::WEBHOOK_EVENTS)
            .document_id(&event.event_id)
            .object(event)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add event to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            event_id = %event.event_id,
            subscription_id = %subscription.subscription_id,
            has_payment = payment.is_some(),
            "Checkout recorded"
        );
        Ok(true)
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    // ─── Account Deletion ──────────────────────────────────────────

    /// Delete a user and everything keyed to them.
    ///
    /// Deletes:
    /// - `refresh_tokens` (query by user_id)
    /// - `daily_meal_plans` (query by user_id)
    /// - `profiles/{user_id}`
    /// - `users/{user_id}`
    ///
    /// Subscription and payment records mirror provider state and are kept.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, user_id: &str) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        let (tokens, plans): (Vec<RefreshTokenRecord>, Vec<DailyMealPlan>) = try_join!(
            self.query_eq(collections::REFRESH_TOKENS, "user_id", user_id),
            self.query_eq(collections::DAILY_MEAL_PLANS, "user_id", user_id),
        )?;

        self.batch_delete(&tokens, collections::REFRESH_TOKENS, |t| {
            t.token_hash.clone()
        })
        .await?;
        deleted_count += tokens.len();
        tracing::debug!(user_id, count = tokens.len(), "Deleted refresh tokens");

        self.batch_delete(&plans, collections::DAILY_MEAL_PLANS, |p| {
            DailyMealPlan::doc_id(&p.user_id, &p.date)
        })
        .await?;
        deleted_count += plans.len();
        tracing::debug!(user_id, count = plans.len(), "Deleted daily meal plans");

        self.delete_doc(collections::PROFILES, user_id).await?;
        self.delete_doc(collections::USERS, user_id).await?;
        deleted_count += 2;

        tracing::info!(user_id, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}
