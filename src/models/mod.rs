// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod billing;
pub mod catalog;
pub mod choices;
pub mod meal_plan;
pub mod profile;
pub mod user;

pub use billing::{Payment, Plan, Subscription, WebhookEventRecord};
pub use catalog::{CampusMeal, ExerciseEntry, MasterWorkout, MealPlanEntry};
pub use meal_plan::DailyMealPlan;
pub use profile::{Profile, ProfileUpdate};
pub use user::{RefreshTokenRecord, User};
