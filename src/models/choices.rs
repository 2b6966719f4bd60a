// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Categorical tags shared by profiles and catalog rows.
//!
//! Wire values are the lowercase slugs the frontend sends, so every enum
//! round-trips through serde as a plain JSON string.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Parse a loosely formatted choice (any case, surrounding whitespace).
///
/// Used for values that come from free text, such as LLM tool arguments
/// and query strings.
pub fn parse_choice<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let normalized = raw.trim().to_lowercase();
    serde_json::from_value(serde_json::Value::String(normalized)).ok()
}

/// Wire value of a choice (e.g. `DietSelection::GlutenFree` -> `"gluten-free"`).
pub fn choice_label<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum DietSelection {
    NoDiet,
    Keto,
    Fasting,
    GlutenFree,
    RawFood,
    Bulking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum DietPreference {
    Veg,
    NonVeg,
    Eggitarian,
    Mediterranean,
    Vegan,
    Detox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    WeightLoss,
    MuscleGain,
    GetLean,
    Maintain,
    Strength,
    Endurance,
    Flexibility,
    Sports,
    BodyRecomp,
    Powerlifting,
    Calisthenics,
    GeneralHealth,
}

/// Cooking time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum CookingTime {
    #[serde(rename = "<10")]
    Under10,
    #[serde(rename = "10-20")]
    From10To20,
    #[serde(rename = "20-30")]
    From20To30,
    #[serde(rename = "30-45")]
    From30To45,
    #[serde(rename = ">45")]
    Over45,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealType {
    /// All meal types in the order a day is served.
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snacks,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseDifficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

/// Body area a user reports pain or injury in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum PainArea {
    Knees,
    Back,
    Shoulders,
    Ankles,
    Hips,
    Neck,
    Wrists,
    Elbows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum Equipment {
    Dumbbells,
    Barbell,
    ResistanceBands,
    Kettlebell,
    YogaMat,
    PullUpBar,
    JumpRope,
    Treadmill,
    ExerciseBike,
    /// Bodyweight only.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum BodyPart {
    FullBody,
    Chest,
    Back,
    Legs,
    Arms,
    Shoulders,
    Core,
    Glutes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseType {
    WarmUp,
    MainExercise,
    CoolDown,
    Strength,
    Cardio,
    Core,
    Power,
    Plyometric,
    Yoga,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice_is_case_insensitive() {
        assert_eq!(
            parse_choice::<ExerciseDifficulty>(" Beginner "),
            Some(ExerciseDifficulty::Beginner)
        );
        assert_eq!(parse_choice::<ImpactLevel>("LOW"), Some(ImpactLevel::Low));
        assert_eq!(
            parse_choice::<DietSelection>("Gluten-Free"),
            Some(DietSelection::GlutenFree)
        );
        assert_eq!(parse_choice::<Goal>("couch-potato"), None);
    }

    #[test]
    fn test_cooking_time_wire_values() {
        assert_eq!(choice_label(&CookingTime::Under10), "<10");
        assert_eq!(choice_label(&CookingTime::Over45), ">45");
        assert_eq!(
            parse_choice::<CookingTime>("20-30"),
            Some(CookingTime::From20To30)
        );
    }

    #[test]
    fn test_activity_level_uses_snake_case() {
        assert_eq!(choice_label(&ActivityLevel::LightlyActive), "lightly_active");
        assert_eq!(
            parse_choice::<ActivityLevel>("very_active"),
            Some(ActivityLevel::VeryActive)
        );
    }
}
