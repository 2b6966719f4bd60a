// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user preference profile.

use crate::models::choices::{
    ActivityLevel, CookingTime, DietPreference, DietSelection, Equipment, ExerciseDifficulty,
    Goal, ImpactLevel, PainArea,
};
use crate::services::restrictions::restricted_exercises;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Preference profile stored in Firestore (document ID = user ID).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    #[serde(default)]
    pub diet_selection: Option<DietSelection>,
    #[serde(default)]
    pub diet_preference: Option<DietPreference>,
    #[serde(default)]
    pub goal_selection: Option<Goal>,
    #[serde(default)]
    pub cooking_time_preference: Option<CookingTime>,
    #[serde(default)]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default)]
    pub exercise_difficulty: Option<ExerciseDifficulty>,
    #[serde(default)]
    pub pain_and_injury: Vec<PainArea>,
    /// Restricted exercises derived from `pain_and_injury` (comma separated)
    #[serde(default)]
    pub exercise_routine: Option<String>,
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    #[serde(default)]
    pub stretching_preference: bool,
    #[serde(default)]
    pub meal_plan_selection: Option<String>,
    #[serde(default)]
    pub rest_days: Vec<String>,
    #[serde(default)]
    pub bmi: Option<f64>,
    #[serde(default)]
    pub updated_at: String,
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileUpdate {
    pub diet_selection: Option<DietSelection>,
    pub diet_preference: Option<DietPreference>,
    pub goal_selection: Option<Goal>,
    pub cooking_time_preference: Option<CookingTime>,
    pub activity_level: Option<ActivityLevel>,
    pub exercise_difficulty: Option<ExerciseDifficulty>,
    #[validate(length(max = 8, message = "at most 8 pain areas"))]
    pub pain_and_injury: Option<Vec<PainArea>>,
    #[validate(length(max = 10, message = "at most 10 equipment items"))]
    pub equipment: Option<Vec<Equipment>>,
    pub stretching_preference: Option<bool>,
    #[validate(length(max = 50))]
    pub meal_plan_selection: Option<String>,
    #[validate(length(max = 7, message = "at most 7 rest days"))]
    pub rest_days: Option<Vec<String>>,
    #[validate(range(exclusive_min = 0.0, exclusive_max = 100.0, message = "bmi out of range"))]
    pub bmi: Option<f64>,
}

impl Profile {
    /// Empty profile for a freshly created user.
    pub fn new(user_id: &str, now: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            updated_at: now.to_string(),
            ..Default::default()
        }
    }

    /// Apply a partial update (last write wins per field).
    pub fn apply(&mut self, update: ProfileUpdate, now: &str) {
        if let Some(v) = update.diet_selection {
            self.diet_selection = Some(v);
        }
        if let Some(v) = update.diet_preference {
            self.diet_preference = Some(v);
        }
        if let Some(v) = update.goal_selection {
            self.goal_selection = Some(v);
        }
        if let Some(v) = update.cooking_time_preference {
            self.cooking_time_preference = Some(v);
        }
        if let Some(v) = update.activity_level {
            self.activity_level = Some(v);
        }
        if let Some(v) = update.exercise_difficulty {
            self.exercise_difficulty = Some(v);
        }
        if let Some(areas) = update.pain_and_injury {
            self.set_pain_areas(areas);
        }
        if let Some(equipment) = update.equipment {
            self.equipment = dedup(equipment);
        }
        if let Some(v) = update.stretching_preference {
            self.stretching_preference = v;
        }
        if let Some(v) = update.meal_plan_selection {
            self.meal_plan_selection = Some(v);
        }
        if let Some(days) = update.rest_days {
            self.rest_days = dedup(days);
        }
        if let Some(v) = update.bmi {
            self.bmi = Some(v);
        }
        self.updated_at = now.to_string();
    }

    /// Replace pain areas and refresh the restricted exercise summary.
    ///
    /// Returns the restricted exercise names.
    pub fn set_pain_areas(&mut self, areas: Vec<PainArea>) -> Vec<&'static str> {
        self.pain_and_injury = dedup(areas);
        let restricted = restricted_exercises(&self.pain_and_injury);
        self.exercise_routine = if restricted.is_empty() {
            None
        } else {
            Some(restricted.join(", "))
        };
        restricted
    }

    /// Impact level workouts should target.
    ///
    /// Any reported pain caps the impact at low; otherwise it follows the
    /// activity level.
    pub fn target_impact_level(&self) -> Option<ImpactLevel> {
        if !self.pain_and_injury.is_empty() {
            return Some(ImpactLevel::Low);
        }
        self.activity_level.map(|level| match level {
            ActivityLevel::Sedentary | ActivityLevel::LightlyActive => ImpactLevel::Low,
            ActivityLevel::ModeratelyActive => ImpactLevel::Medium,
            ActivityLevel::VeryActive | ActivityLevel::ExtraActive => ImpactLevel::High,
        })
    }
}

/// Remove duplicates, keeping the first occurrence.
fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
