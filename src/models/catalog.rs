// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catalog reference rows (meals, exercises, workouts, campus meals).

use crate::models::choices::{
    BodyPart, CookingTime, DietPreference, DietSelection, Equipment, ExerciseDifficulty,
    ExerciseType, Goal, ImpactLevel, MealType,
};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A meal that can be assigned to a daily plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MealPlanEntry {
    pub id: u32,
    pub name: String,
    pub meal_type: MealType,
    pub diet_selection: DietSelection,
    #[serde(default)]
    pub diet_preference: Option<DietPreference>,
    #[serde(default)]
    pub goal_selection: Option<Goal>,
    pub cooking_time: CookingTime,
    #[serde(default)]
    pub calories: u32,
    /// Grams
    #[serde(default)]
    pub protein: f64,
    /// Grams
    #[serde(default)]
    pub carbs: f64,
    /// Grams
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub recipe_link: Option<String>,
    #[serde(default)]
    pub instructions: String,
}

/// An exercise from the exercise library.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ExerciseEntry {
    pub id: u32,
    pub name: String,
    pub body_part: BodyPart,
    #[serde(default)]
    pub description: String,
    pub exercise_type: ExerciseType,
    pub difficulty: ExerciseDifficulty,
    pub impact_level: ImpactLevel,
    #[serde(default)]
    pub instructions: String,
    pub duration_minutes: u32,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub video_link: Option<String>,
    /// Equipment required; empty means bodyweight.
    #[serde(default)]
    pub equipment: Vec<Equipment>,
}

impl ExerciseEntry {
    /// Whether a user owning `owned` can perform this exercise.
    pub fn is_doable_with(&self, owned: &[Equipment]) -> bool {
        self.equipment
            .iter()
            .all(|e| *e == Equipment::None || owned.contains(e))
    }
}

/// Guided workout video shown on the master workout page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MasterWorkout {
    pub id: u32,
    pub name: String,
    pub instructions: String,
    pub video_url: String,
}

/// A meal sold around campus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CampusMeal {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub price_cents: u32,
    #[serde(default)]
    pub url: Option<String>,
}
