// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Preference profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::choices::{parse_choice, Equipment, ExerciseDifficulty, PainArea};
use crate::models::{Profile, ProfileUpdate};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Profile routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/profile",
            get(get_profile).post(update_profile).patch(update_profile),
        )
        .route("/api/profile/exercise-difficulty", post(set_difficulty))
        .route("/api/profile/equipment", post(set_equipment))
        .route("/api/profile/stretching", post(set_stretching))
        .route("/api/profile/injuries", post(set_injuries))
}

/// Profile as returned to its owner.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub struct ProfileMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DifficultyRequest {
    /// Parsed by hand so missing and invalid values get distinct errors.
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EquipmentRequest {
    #[validate(length(max = 10, message = "at most 10 equipment items"))]
    pub equipment: Vec<Equipment>,
}

#[derive(Debug, Deserialize)]
pub struct StretchingRequest {
    pub stretching_preference: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InjuriesRequest {
    #[validate(length(max = 8, message = "at most 8 pain areas"))]
    pub pain_and_injury: Vec<PainArea>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InjuriesResponse {
    pub message: String,
    pub restricted_exercises: Vec<String>,
}

async fn require_profile(state: &AppState, user_id: &str) -> Result<Profile> {
    state
        .db
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

async fn profile_or_new(state: &AppState, user_id: &str) -> Result<Profile> {
    Ok(state
        .db
        .get_profile(user_id)
        .await?
        .unwrap_or_else(|| Profile::new(user_id, &now_rfc3339())))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let profile = require_profile(&state, &user.user_id).await?;
    let account = state
        .db
        .get_user(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        username: account.username,
        profile,
    }))
}

/// Partial profile update; a missing profile is created.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(body), _): WithRejection<Json<ProfileUpdate>, AppError>,
) -> Result<Json<ProfileMessage>> {
    body.validate()?;

    let mut profile = profile_or_new(&state, &user.user_id).await?;
    profile.apply(body, &now_rfc3339());
    state.db.upsert_profile(&profile).await?;

    tracing::info!(user_id = %user.user_id, "Profile updated");
    Ok(Json(ProfileMessage {
        message: "Profile updated successfully".to_string(),
    }))
}

async fn set_difficulty(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(body), _): WithRejection<Json<DifficultyRequest>, AppError>,
) -> Result<Json<ProfileMessage>> {
    let mut profile = require_profile(&state, &user.user_id).await?;

    let raw = body
        .difficulty
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Difficulty level is required".to_string()))?;
    let difficulty = parse_choice::<ExerciseDifficulty>(&raw)
        .ok_or_else(|| AppError::BadRequest("Invalid difficulty level".to_string()))?;

    profile.exercise_difficulty = Some(difficulty);
    profile.updated_at = now_rfc3339();
    state.db.upsert_profile(&profile).await?;

    Ok(Json(ProfileMessage {
        message: "Exercise difficulty updated successfully".to_string(),
    }))
}

/// Replace the owned equipment list.
async fn set_equipment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(body), _): WithRejection<Json<EquipmentRequest>, AppError>,
) -> Result<(StatusCode, Json<ProfileMessage>)> {
    body.validate()?;

    let mut profile = profile_or_new(&state, &user.user_id).await?;
    profile.apply(
        ProfileUpdate {
            equipment: Some(body.equipment),
            ..Default::default()
        },
        &now_rfc3339(),
    );
    state.db.upsert_profile(&profile).await?;

    Ok((
        StatusCode::CREATED,
        Json(ProfileMessage {
            message: "Equipment saved successfully".to_string(),
        }),
    ))
}

async fn set_stretching(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(body), _): WithRejection<Json<StretchingRequest>, AppError>,
) -> Result<Json<ProfileMessage>> {
    let mut profile = profile_or_new(&state, &user.user_id).await?;
    profile.stretching_preference = body.stretching_preference;
    profile.updated_at = now_rfc3339();
    state.db.upsert_profile(&profile).await?;

    Ok(Json(ProfileMessage {
        message: "Stretching preference updated successfully".to_string(),
    }))
}

/// Store pain areas and report which exercises they rule out.
async fn set_injuries(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(body), _): WithRejection<Json<InjuriesRequest>, AppError>,
) -> Result<Json<InjuriesResponse>> {
    body.validate()?;

    let mut profile = profile_or_new(&state, &user.user_id).await?;
    let restricted = profile.set_pain_areas(body.pain_and_injury);
    profile.updated_at = now_rfc3339();
    state.db.upsert_profile(&profile).await?;

    tracing::info!(
        user_id = %user.user_id,
        restricted = restricted.len(),
        "Pain areas updated"
    );

    Ok(Json(InjuriesResponse {
        message: "Exercise routine updated successfully".to_string(),
        restricted_exercises: restricted.into_iter().map(str::to_string).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_response_is_flat() {
        let response = ProfileResponse {
            username: "alex".to_string(),
            profile: Profile::new("u1", "2026-01-01T00:00:00Z"),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["username"], "alex");
        assert_eq!(json["user_id"], "u1");
        assert!(json["diet_selection"].is_null());
    }

    #[test]
    fn test_equipment_list_is_capped() {
        let body = EquipmentRequest {
            equipment: vec![Equipment::YogaMat; 11],
        };
        assert!(body.validate().is_err());
    }
}
