// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile-driven catalog matching with predicate relaxation.
//!
//! Predicates are ordered from least to most specific. Matching first tries
//! every predicate together, then drops the most specific one at a time
//! until some tier yields rows. Hard constraints (meal type, injuries,
//! equipment) are applied to the candidate set before any tier runs and
//! are never relaxed.

use crate::models::catalog::{ExerciseEntry, MealPlanEntry};
use crate::models::choices::{
    choice_label, CookingTime, DietPreference, DietSelection, ExerciseDifficulty, Goal,
    ImpactLevel, MealType,
};
use crate::models::Profile;
use crate::services::catalog::CatalogService;
use crate::services::restrictions::{is_restricted, restricted_exercises};
use rand::seq::SliceRandom;
use serde::Serialize;
use std::str::FromStr;

/// Meals per meal type in a matched plan.
pub const MEALS_PER_TYPE: usize = 3;
/// Exercises in a matched workout.
pub const WORKOUT_SIZE: usize = 5;
/// Meals returned to callers without a profile.
pub const ANONYMOUS_MEAL_LIMIT: usize = 5;

/// An equality test against one catalog attribute.
pub trait Predicate<T> {
    /// Attribute name reported in `filters_applied`.
    fn field(&self) -> &'static str;
    /// Wire value being compared against.
    fn value(&self) -> String;
    fn matches(&self, row: &T) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealPredicate {
    Diet(DietSelection),
    Goal(Goal),
    Preference(DietPreference),
    CookingTime(CookingTime),
}

impl Predicate<MealPlanEntry> for MealPredicate {
    fn field(&self) -> &'static str {
        match self {
            MealPredicate::Diet(_) => "diet_selection",
            MealPredicate::Goal(_) => "goal_selection",
            MealPredicate::Preference(_) => "diet_preference",
            MealPredicate::CookingTime(_) => "cooking_time",
        }
    }

    fn value(&self) -> String {
        match self {
            MealPredicate::Diet(v) => choice_label(v),
            MealPredicate::Goal(v) => choice_label(v),
            MealPredicate::Preference(v) => choice_label(v),
            MealPredicate::CookingTime(v) => choice_label(v),
        }
    }

    fn matches(&self, meal: &MealPlanEntry) -> bool {
        match self {
            MealPredicate::Diet(v) => meal.diet_selection == *v,
            MealPredicate::Goal(v) => meal.goal_selection == Some(*v),
            MealPredicate::Preference(v) => meal.diet_preference == Some(*v),
            MealPredicate::CookingTime(v) => meal.cooking_time == *v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExercisePredicate {
    Difficulty(ExerciseDifficulty),
    Impact(ImpactLevel),
}

impl Predicate<ExerciseEntry> for ExercisePredicate {
    fn field(&self) -> &'static str {
        match self {
            ExercisePredicate::Difficulty(_) => "difficulty",
            ExercisePredicate::Impact(_) => "impact_level",
        }
    }

    fn value(&self) -> String {
        match self {
            ExercisePredicate::Difficulty(v) => choice_label(v),
            ExercisePredicate::Impact(v) => choice_label(v),
        }
    }

    fn matches(&self, exercise: &ExerciseEntry) -> bool {
        match self {
            ExercisePredicate::Difficulty(v) => exercise.difficulty == *v,
            ExercisePredicate::Impact(v) => exercise.impact_level == *v,
        }
    }
}

/// Meal predicates for a profile, least specific first.
pub fn meal_predicates(profile: &Profile) -> Vec<MealPredicate> {
    let mut predicates = Vec::new();
    if let Some(v) = profile.diet_selection {
        predicates.push(MealPredicate::Diet(v));
    }
    if let Some(v) = profile.goal_selection {
        predicates.push(MealPredicate::Goal(v));
    }
    if let Some(v) = profile.diet_preference {
        predicates.push(MealPredicate::Preference(v));
    }
    if let Some(v) = profile.cooking_time_preference {
        predicates.push(MealPredicate::CookingTime(v));
    }
    predicates
}

/// Exercise predicates for a profile, least specific first.
pub fn exercise_predicates(profile: &Profile) -> Vec<ExercisePredicate> {
    let mut predicates = Vec::new();
    if let Some(v) = profile.exercise_difficulty {
        predicates.push(ExercisePredicate::Difficulty(v));
    }
    if let Some(v) = profile.target_impact_level() {
        predicates.push(ExercisePredicate::Impact(v));
    }
    predicates
}

/// How rows are picked from a matching tier when it exceeds the cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    /// Catalog order
    #[default]
    First,
    Random,
}

impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Selection::First),
            "random" => Ok(Selection::Random),
            other => Err(format!("unknown selection mode: {}", other)),
        }
    }
}

/// A predicate that was part of the winning tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedFilter {
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct MatchOutcome<'a, T> {
    pub items: Vec<&'a T>,
    /// Predicates of the tier that produced `items` (empty if none did)
    pub filters_applied: Vec<AppliedFilter>,
    /// Whether tiers beyond the full predicate set were tried
    pub relaxed: bool,
}

/// Run tiers from all predicates down to the first one and return the
/// first non-empty tier, capped at `limit`.
pub fn relax<'a, T, P: Predicate<T>>(
    candidates: &[&'a T],
    predicates: &[P],
    limit: usize,
    selection: Selection,
) -> MatchOutcome<'a, T> {
    if predicates.is_empty() {
        return MatchOutcome {
            items: pick(candidates.to_vec(), limit, selection),
            filters_applied: Vec::new(),
            relaxed: false,
        };
    }

    for len in (1..=predicates.len()).rev() {
        let tier = &predicates[..len];
        let rows: Vec<&'a T> = candidates
            .iter()
            .copied()
            .filter(|row| tier.iter().all(|p| p.matches(row)))
            .collect();

        if !rows.is_empty() {
            if len < predicates.len() {
                tracing::debug!(
                    tier = len,
                    predicates = predicates.len(),
                    "Relaxed match predicates"
                );
            }
            return MatchOutcome {
                items: pick(rows, limit, selection),
                filters_applied: tier
                    .iter()
                    .map(|p| AppliedFilter {
                        field: p.field(),
                        value: p.value(),
                    })
                    .collect(),
                relaxed: len < predicates.len(),
            };
        }
    }

    MatchOutcome {
        items: Vec::new(),
        filters_applied: Vec::new(),
        relaxed: predicates.len() > 1,
    }
}

fn pick<T>(mut rows: Vec<&T>, limit: usize, selection: Selection) -> Vec<&T> {
    if selection == Selection::Random {
        rows.shuffle(&mut rand::rng());
    }
    rows.truncate(limit);
    rows
}

/// Matched meals for one meal type.
pub fn match_meals_of_type<'a>(
    catalog: &'a CatalogService,
    profile: &Profile,
    meal_type: MealType,
    limit: usize,
    selection: Selection,
) -> MatchOutcome<'a, MealPlanEntry> {
    let candidates: Vec<&MealPlanEntry> = catalog.meals_of_type(meal_type).collect();
    relax(&candidates, &meal_predicates(profile), limit, selection)
}

/// Matched meals across every meal type, keyed by type.
pub fn match_meals<'a>(
    catalog: &'a CatalogService,
    profile: &Profile,
    selection: Selection,
) -> Vec<(MealType, MatchOutcome<'a, MealPlanEntry>)> {
    MealType::ALL
        .iter()
        .map(|t| {
            (
                *t,
                match_meals_of_type(catalog, profile, *t, MEALS_PER_TYPE, selection),
            )
        })
        .collect()
}

/// Matched workout honoring injuries and owned equipment.
pub fn match_workout<'a>(
    catalog: &'a CatalogService,
    profile: &Profile,
    selection: Selection,
) -> MatchOutcome<'a, ExerciseEntry> {
    let restricted = restricted_exercises(&profile.pain_and_injury);
    let candidates: Vec<&ExerciseEntry> = catalog
        .exercises()
        .iter()
        .filter(|e| !is_restricted(&e.name, &restricted))
        .filter(|e| profile.equipment.is_empty() || e.is_doable_with(&profile.equipment))
        .collect();

    relax(
        &candidates,
        &exercise_predicates(profile),
        WORKOUT_SIZE,
        selection,
    )
}
