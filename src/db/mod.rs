//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Preference profiles (keyed by user_id)
    pub const PROFILES: &str = "profiles";
    /// Refresh tokens (keyed by SHA-256 of the raw token)
    pub const REFRESH_TOKENS: &str = "refresh_tokens";
    /// Daily meal plans (keyed by `{user_id}_{date}`)
    pub const DAILY_MEAL_PLANS: &str = "daily_meal_plans";
    pub const SUBSCRIPTIONS: &str = "subscriptions";
    pub const PAYMENTS: &str = "payments";
    /// Processed payment provider events (keyed by event ID)
    pub const WEBHOOK_EVENTS: &str = "webhook_events";
}
