// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account read, update and deletion.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::User;
use crate::services::credentials::hash_password;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// User routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/users/{id}",
        get(get_user).put(update_user).delete(delete_user),
    )
}

/// Public view of an account (no credentials).
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub selected_plan: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            selected_plan: user.selected_plan,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(min = 3, max = 150, message = "must be 3-150 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    #[validate(length(min = 8, max = 128, message = "must be 8-128 characters"))]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Callers may only address their own account.
fn ensure_self(caller: &AuthUser, id: &str) -> Result<()> {
    if caller.user_id != id {
        tracing::warn!(caller = %caller.user_id, target_id = %id, "Cross-account access denied");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

async fn load_user(state: &AppState, id: &str) -> Result<User> {
    state
        .db
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    ensure_self(&caller, &id)?;
    Ok(Json(load_user(&state, &id).await?.into()))
}

/// Partial account update.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<UserUpdate>, AppError>,
) -> Result<Json<MessageResponse>> {
    ensure_self(&caller, &id)?;
    body.validate()?;

    let mut user = load_user(&state, &id).await?;

    if let Some(username) = body.username.map(|u| u.trim().to_string()) {
        if username != user.username {
            if state.db.find_user_by_username(&username).await?.is_some() {
                return Err(AppError::BadRequest("Username already taken".to_string()));
            }
            user.username = username;
        }
    }
    if let Some(email) = body.email.map(|e| e.trim().to_lowercase()) {
        if email != user.email {
            if state.db.find_user_by_email(&email).await?.is_some() {
                return Err(AppError::BadRequest(
                    "User with this email already exists".to_string(),
                ));
            }
            user.email = email;
        }
    }
    if let Some(phone) = body.phone_number {
        user.phone_number = Some(phone);
    }
    if let Some(password) = body.password {
        user.password_hash = hash_password(&password)?;
    }

    state.db.upsert_user(&user).await?;
    tracing::info!(user_id = %user.user_id, "User updated");

    Ok(Json(MessageResponse {
        message: "User updated successfully".to_string(),
    }))
}

/// Delete the account with its profile, plans and tokens.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    ensure_self(&caller, &id)?;
    load_user(&state, &id).await?;

    let deleted = state.db.delete_user_data(&id).await?;
    tracing::info!(user_id = %id, deleted, "User-initiated account deletion");

    Ok(StatusCode::NO_CONTENT)
}
