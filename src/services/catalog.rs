// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Immutable content catalog loaded once at startup.

use crate::models::catalog::{CampusMeal, ExerciseEntry, MasterWorkout, MealPlanEntry};
use crate::models::choices::MealType;
use crate::models::Plan;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// On-disk catalog layout.
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    meals: Vec<MealPlanEntry>,
    #[serde(default)]
    exercises: Vec<ExerciseEntry>,
    #[serde(default)]
    master_workouts: Vec<MasterWorkout>,
    #[serde(default)]
    campus_meals: Vec<CampusMeal>,
    #[serde(default)]
    plans: Vec<Plan>,
}

/// Read-only reference tables (meals, exercises, workouts, plans).
#[derive(Debug, Default, Clone)]
pub struct CatalogService {
    meals: Vec<MealPlanEntry>,
    exercises: Vec<ExerciseEntry>,
    master_workouts: Vec<MasterWorkout>,
    campus_meals: Vec<CampusMeal>,
    plans: Vec<Plan>,
}

impl CatalogService {
    /// Load the catalog from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the catalog from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_json::from_str(json_data).map_err(|e| CatalogError::ParseError(e.to_string()))?;

        check_unique("meals", file.meals.iter().map(|m| m.id.to_string()))?;
        check_unique("exercises", file.exercises.iter().map(|e| e.id.to_string()))?;
        check_unique(
            "master_workouts",
            file.master_workouts.iter().map(|w| w.id.to_string()),
        )?;
        check_unique(
            "campus_meals",
            file.campus_meals.iter().map(|m| m.id.to_string()),
        )?;
        check_unique("plans", file.plans.iter().map(|p| p.name.clone()))?;
        check_unique("plans", file.plans.iter().map(|p| p.price_id.clone()))?;

        tracing::info!(
            meals = file.meals.len(),
            exercises = file.exercises.len(),
            master_workouts = file.master_workouts.len(),
            campus_meals = file.campus_meals.len(),
            plans = file.plans.len(),
            "Loaded catalog"
        );

        Ok(Self {
            meals: file.meals,
            exercises: file.exercises,
            master_workouts: file.master_workouts,
            campus_meals: file.campus_meals,
            plans: file.plans,
        })
    }

    pub fn meals(&self) -> &[MealPlanEntry] {
        &self.meals
    }

    pub fn meal(&self, id: u32) -> Option<&MealPlanEntry> {
        self.meals.iter().find(|m| m.id == id)
    }

    /// Meals of one type, in catalog order.
    pub fn meals_of_type(&self, meal_type: MealType) -> impl Iterator<Item = &MealPlanEntry> {
        self.meals.iter().filter(move |m| m.meal_type == meal_type)
    }

    pub fn exercises(&self) -> &[ExerciseEntry] {
        &self.exercises
    }

    pub fn master_workouts(&self) -> &[MasterWorkout] {
        &self.master_workouts
    }

    pub fn campus_meals(&self) -> &[CampusMeal] {
        &self.campus_meals
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn plan_by_name(&self, name: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.name == name)
    }

    pub fn plan_by_price_id(&self, price_id: &str) -> Option<&Plan> {
        self.plans.iter().find(|p| p.price_id == price_id)
    }
}

fn check_unique(
    table: &'static str,
    keys: impl Iterator<Item = String>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key.clone()) {
            return Err(CatalogError::DuplicateKey { table, key });
        }
    }
    Ok(())
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse catalog: {0}")]
    ParseError(String),

    #[error("Duplicate key {key} in {table}")]
    DuplicateKey { table: &'static str, key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "meals": [
            {"id": 1, "name": "Avocado Eggs", "meal_type": "breakfast",
             "diet_selection": "keto", "cooking_time": "<10", "calories": 320},
            {"id": 2, "name": "Grilled Salmon", "meal_type": "dinner",
             "diet_selection": "keto", "goal_selection": "weight-loss",
             "cooking_time": "20-30", "calories": 450}
        ],
        "plans": [
            {"name": "Premium", "price_cents": 999, "product_id": "prod_1", "price_id": "price_1"}
        ]
    }"#;

    #[test]
    fn test_load_sample() {
        let catalog = CatalogService::load_from_json(SAMPLE).unwrap();
        assert_eq!(catalog.meals().len(), 2);
        assert!(catalog.exercises().is_empty());
        assert_eq!(catalog.meal(2).map(|m| m.name.as_str()), Some("Grilled Salmon"));
        assert_eq!(catalog.meals_of_type(MealType::Breakfast).count(), 1);

        let plan = catalog.plan_by_price_id("price_1").unwrap();
        assert_eq!(plan.name, "Premium");
        assert_eq!(plan.currency, "usd");
        assert!(catalog.plan_by_name("Basic").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{"master_workouts": [
            {"id": 1, "name": "A", "instructions": "", "video_url": ""},
            {"id": 1, "name": "B", "instructions": "", "video_url": ""}
        ]}"#;
        let err = CatalogService::load_from_json(json).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateKey {
                table: "master_workouts",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_tag_is_parse_error() {
        let json = r#"{"meals": [{"id": 1, "name": "X", "meal_type": "brunch",
            "diet_selection": "keto", "cooking_time": "<10"}]}"#;
        assert!(matches!(
            CatalogService::load_from_json(json),
            Err(CatalogError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CatalogService::load_from_file("/nonexistent/catalog.json"),
            Err(CatalogError::IoError(_))
        ));
    }
}
