// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal catalog, matched meals and daily meal plans.

use crate::error::{AppError, Result};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::models::catalog::{CampusMeal, MealPlanEntry};
use crate::models::choices::{choice_label, parse_choice, MealType};
use crate::models::DailyMealPlan;
use crate::services::matching::{match_meals, AppliedFilter, ANONYMOUS_MEAL_LIMIT};
use crate::time_utils::{now_rfc3339, parse_plan_date, today};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Match route, served to anonymous and signed-in callers alike.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/meals/match", get(match_meals_for_caller))
}

/// Meal routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/meals", get(list_meals))
        .route("/api/meals/{id}", get(get_meal))
        .route("/api/meal-plan", get(get_meal_plan))
        .route("/api/campus-meals", get(list_campus_meals))
}

/// Matched meals for one meal type.
#[derive(Debug, Serialize)]
pub struct MatchedMeals {
    pub meals: Vec<MealPlanEntry>,
    pub filters_applied: Vec<AppliedFilter>,
    pub relaxed: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MatchResponse {
    /// First catalog rows, for callers without a profile
    Anonymous { meals: Vec<MealPlanEntry> },
    /// Keyed by meal type
    Matched(BTreeMap<String, MatchedMeals>),
}

#[derive(Debug, Deserialize)]
pub struct MealsQuery {
    pub meal_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MealPlanQuery {
    pub date: Option<String>,
}

/// Meal summary inside a daily plan.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlannedMeal {
    pub id: u32,
    pub name: String,
    pub calories: u32,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MealPlanResponse {
    pub date: String,
    pub breakfast: Vec<PlannedMeal>,
    pub lunch: Vec<PlannedMeal>,
    pub dinner: Vec<PlannedMeal>,
    pub snacks: Vec<PlannedMeal>,
}

async fn match_meals_for_caller(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<MaybeAuthUser>,
) -> Result<Json<MatchResponse>> {
    let Some(user) = caller.0 else {
        let meals = state
            .catalog
            .meals()
            .iter()
            .take(ANONYMOUS_MEAL_LIMIT)
            .cloned()
            .collect();
        return Ok(Json(MatchResponse::Anonymous { meals }));
    };

    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    let matched = match_meals(&state.catalog, &profile, state.config.match_selection)
        .into_iter()
        .map(|(meal_type, outcome)| {
            (
                choice_label(&meal_type),
                MatchedMeals {
                    meals: outcome.items.into_iter().cloned().collect(),
                    filters_applied: outcome.filters_applied,
                    relaxed: outcome.relaxed,
                },
            )
        })
        .collect();

    Ok(Json(MatchResponse::Matched(matched)))
}

/// Meal catalog, optionally filtered by meal type.
async fn list_meals(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(query), _): WithRejection<Query<MealsQuery>, AppError>,
) -> Result<Json<Vec<MealPlanEntry>>> {
    let meals = match query.meal_type.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(raw) => {
            let meal_type = parse_choice::<MealType>(raw)
                .ok_or_else(|| AppError::BadRequest(format!("Invalid meal type: {}", raw)))?;
            state.catalog.meals_of_type(meal_type).cloned().collect()
        }
        None => state.catalog.meals().to_vec(),
    };
    Ok(Json(meals))
}

async fn get_meal(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<u32>, AppError>,
) -> Result<Json<MealPlanEntry>> {
    state
        .catalog
        .meal(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Meal not found".to_string()))
}

/// The caller's plan for a date, built from matched meals on first request.
async fn get_meal_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): WithRejection<Query<MealPlanQuery>, AppError>,
) -> Result<Json<MealPlanResponse>> {
    let date = match query.date.as_deref() {
        Some(raw) => parse_plan_date(raw).ok_or_else(|| {
            AppError::BadRequest("Invalid date format, expected YYYY-MM-DD".to_string())
        })?,
        None => today(),
    };

    let plan = match state.db.get_daily_plan(&user.user_id, &date).await? {
        Some(plan) => plan,
        None => {
            let profile = state
                .db
                .get_profile(&user.user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

            let mut plan = DailyMealPlan {
                user_id: user.user_id.clone(),
                date: date.clone(),
                created_at: now_rfc3339(),
                ..Default::default()
            };
            for (meal_type, outcome) in
                match_meals(&state.catalog, &profile, state.config.match_selection)
            {
                plan.set_meals(meal_type, outcome.items.iter().map(|m| m.id).collect());
            }

            state.db.set_daily_plan(&plan).await?;
            tracing::info!(user_id = %user.user_id, date = %date, "Daily meal plan created");
            plan
        }
    };

    let resolve = |meal_type: MealType| -> Vec<PlannedMeal> {
        plan.meals_for(meal_type)
            .iter()
            .filter_map(|id| state.catalog.meal(*id))
            .map(|m| PlannedMeal {
                id: m.id,
                name: m.name.clone(),
                calories: m.calories,
            })
            .collect()
    };

    Ok(Json(MealPlanResponse {
        breakfast: resolve(MealType::Breakfast),
        lunch: resolve(MealType::Lunch),
        dinner: resolve(MealType::Dinner),
        snacks: resolve(MealType::Snacks),
        date,
    }))
}

async fn list_campus_meals(State(state): State<Arc<AppState>>) -> Json<Vec<CampusMeal>> {
    Json(state.catalog.campus_meals().to_vec())
}
