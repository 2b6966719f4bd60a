// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User account model for storage and API.

use serde::{Deserialize, Serialize};

/// User account stored in Firestore (document ID = `user_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// UUID v4
    pub user_id: String,
    pub username: String,
    pub email: String,
    /// argon2id PHC string
    pub password_hash: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Name of the plan chosen at the last checkout
    #[serde(default)]
    pub selected_plan: Option<String>,
    /// Payment provider customer ID
    #[serde(default)]
    pub customer_id: Option<String>,
    /// When the account was created (RFC 3339)
    pub created_at: String,
}

/// Refresh token record (document ID = SHA-256 hex of the raw token).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: String,
    /// RFC 3339
    pub expires_at: String,
    pub created_at: String,
}
