// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily meal plan assignments.

use crate::models::choices::MealType;
use serde::{Deserialize, Serialize};

/// Meals assigned to a user for one calendar date.
///
/// Stored at `daily_meal_plans/{user_id}_{date}`. Holds catalog meal IDs only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyMealPlan {
    pub user_id: String,
    /// "YYYY-MM-DD"
    pub date: String,
    #[serde(default)]
    pub breakfast: Vec<u32>,
    #[serde(default)]
    pub lunch: Vec<u32>,
    #[serde(default)]
    pub dinner: Vec<u32>,
    #[serde(default)]
    pub snacks: Vec<u32>,
    pub created_at: String,
}

impl DailyMealPlan {
    /// Document ID for a user's plan on a date.
    pub fn doc_id(user_id: &str, date: &str) -> String {
        format!("{}_{}", user_id, date)
    }

    pub fn meals_for(&self, meal_type: MealType) -> &[u32] {
        match meal_type {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
            MealType::Snacks => &self.snacks,
        }
    }

    pub fn set_meals(&mut self, meal_type: MealType, ids: Vec<u32>) {
        match meal_type {
            MealType::Breakfast => self.breakfast = ids,
            MealType::Lunch => self.lunch = ids,
            MealType::Dinner => self.dinner = ids,
            MealType::Snacks => self.snacks = ids,
        }
    }
}
