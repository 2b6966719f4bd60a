// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account signup, login and token refresh.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, ACCESS_TOKEN_TTL_SECS, AUTH_COOKIE};
use crate::models::{Profile, RefreshTokenRecord, User};
use crate::services::credentials::{
    generate_refresh_token, hash_password, hash_refresh_token, verify_password,
    REFRESH_TOKEN_DAYS,
};
use crate::time_utils::{format_utc_rfc3339, now_rfc3339};
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Auth routes (public).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 150, message = "must be 3-150 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "must be 8-128 characters"))]
    pub password: String,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Issued credentials.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TokenResponse {
    pub message: String,
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: usize,
}

/// Browser session cookie holding the access token.
fn session_cookie(access_token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, access_token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ACCESS_TOKEN_TTL_SECS as i64))
        .build()
}

/// Mint an access token plus a stored refresh token for `user_id`.
async fn issue_tokens(
    state: &AppState,
    user_id: &str,
    message: &str,
) -> Result<(CookieJar, TokenResponse)> {
    let access_token = create_jwt(user_id, &state.config.jwt_signing_key)?;
    let (refresh_token, token_hash) = generate_refresh_token()?;

    let now = chrono::Utc::now();
    state
        .db
        .store_refresh_token(&RefreshTokenRecord {
            token_hash,
            user_id: user_id.to_string(),
            expires_at: format_utc_rfc3339(now + chrono::Duration::days(REFRESH_TOKEN_DAYS)),
            created_at: format_utc_rfc3339(now),
        })
        .await?;

    Ok((
        CookieJar::new().add(session_cookie(access_token.clone())),
        TokenResponse {
            message: message.to_string(),
            user_id: user_id.to_string(),
            access_token,
            refresh_token,
            expires_in: ACCESS_TOKEN_TTL_SECS,
        },
    ))
}

/// Create an account and its empty profile.
async fn signup(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<SignupRequest>, AppError>,
) -> Result<(StatusCode, CookieJar, Json<TokenResponse>)> {
    body.validate()?;

    let username = body.username.trim().to_string();
    let email = body.email.trim().to_lowercase();

    if state.db.find_user_by_username(&username).await?.is_some() {
        return Err(AppError::BadRequest("Username already taken".to_string()));
    }
    if state.db.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest(
            "User with this email already exists".to_string(),
        ));
    }

    let now = now_rfc3339();
    let user = User {
        user_id: uuid::Uuid::new_v4().to_string(),
        username,
        email,
        password_hash: hash_password(&body.password)?,
        phone_number: body.phone_number,
        selected_plan: None,
        customer_id: None,
        created_at: now.clone(),
    };
    let profile = Profile::new(&user.user_id, &now);

    state.db.create_user_with_profile(&user, &profile).await?;

    let (jar, tokens) = issue_tokens(&state, &user.user_id, "Signup successful").await?;
    Ok((StatusCode::CREATED, jar, Json(tokens)))
}

/// Exchange username and password for tokens.
async fn login(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<TokenResponse>)> {
    body.validate()?;

    let user = state
        .db
        .find_user_by_username(body.username.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password_hash)? {
        tracing::info!(user_id = %user.user_id, "Failed login attempt");
        return Err(AppError::InvalidCredentials);
    }

    let (jar, tokens) = issue_tokens(&state, &user.user_id, "Login successful").await?;
    tracing::info!(user_id = %user.user_id, "User logged in");
    Ok((jar, Json(tokens)))
}

/// Rotate a refresh token and issue a new access token.
async fn refresh(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(body), _): WithRejection<Json<RefreshRequest>, AppError>,
) -> Result<(CookieJar, Json<TokenResponse>)> {
    let token_hash = hash_refresh_token(body.refresh_token.trim());
    let record = state
        .db
        .get_refresh_token(&token_hash)
        .await?
        .ok_or(AppError::InvalidToken)?;

    // Single use: the presented token is revoked either way
    state.db.delete_refresh_token(&token_hash).await?;

    if is_expired(&record.expires_at, chrono::Utc::now()) {
        return Err(AppError::InvalidToken);
    }

    let (jar, tokens) = issue_tokens(&state, &record.user_id, "Token refreshed").await?;
    Ok((jar, Json(tokens)))
}

/// Unparseable expiry timestamps count as expired.
fn is_expired(expires_at: &str, now: chrono::DateTime<chrono::Utc>) -> bool {
    chrono::DateTime::parse_from_rfc3339(expires_at)
        .map(|t| t.with_timezone(&chrono::Utc) <= now)
        .unwrap_or(true)
}
