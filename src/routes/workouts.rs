// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise library and workout routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::catalog::{ExerciseEntry, MasterWorkout};
use crate::models::choices::{parse_choice, PainArea};
use crate::services::matching::{match_workout, AppliedFilter};
use crate::services::restrictions::{is_restricted, restricted_exercises};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use axum_extra::extract::{Query, WithRejection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Workout routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/exercises", get(list_exercises))
        .route("/api/master-workouts", get(list_master_workouts))
        .route("/api/workout", get(get_workout))
}

/// Pain areas may repeat: `?pain_and_injury=knees&pain_and_injury=back`.
#[derive(Debug, Default, Deserialize)]
pub struct PainQuery {
    #[serde(default)]
    pub pain_and_injury: Vec<String>,
}

impl PainQuery {
    fn areas(&self) -> Result<Vec<PainArea>> {
        self.pain_and_injury
            .iter()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                parse_choice::<PainArea>(raw)
                    .ok_or_else(|| AppError::BadRequest(format!("Invalid pain area: {}", raw)))
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutResponse {
    pub exercises: Vec<ExerciseEntry>,
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub filters_applied: Vec<AppliedFilter>,
    pub relaxed: bool,
    pub stretching_preference: bool,
}

/// Exercise catalog without exercises the given pain areas rule out.
async fn list_exercises(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<PainQuery>, AppError>,
) -> Result<Json<Vec<ExerciseEntry>>> {
    let restricted = restricted_exercises(&query.areas()?);
    let exercises = state
        .catalog
        .exercises()
        .iter()
        .filter(|e| !is_restricted(&e.name, &restricted))
        .cloned()
        .collect();
    Ok(Json(exercises))
}

async fn list_master_workouts(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<PainQuery>, AppError>,
) -> Result<Json<Vec<MasterWorkout>>> {
    let restricted = restricted_exercises(&query.areas()?);
    let workouts = state
        .catalog
        .master_workouts()
        .iter()
        .filter(|w| !is_restricted(&w.name, &restricted))
        .cloned()
        .collect();
    Ok(Json(workouts))
}

/// The caller's workout, matched against their profile.
async fn get_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<WorkoutResponse>> {
    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let outcome = match_workout(&state.catalog, &profile, state.config.match_selection);
    tracing::debug!(
        user_id = %user.user_id,
        count = outcome.items.len(),
        relaxed = outcome.relaxed,
        "Workout matched"
    );

    Ok(Json(WorkoutResponse {
        exercises: outcome.items.into_iter().cloned().collect(),
        filters_applied: outcome.filters_applied,
        relaxed: outcome.relaxed,
        stretching_preference: profile.stretching_preference,
    }))
}
