// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercises to avoid for each reported pain area.

use crate::models::choices::PainArea;

/// Exercise names to avoid for a single pain area.
pub fn exercises_for(area: PainArea) -> &'static [&'static str] {
    match area {
        PainArea::Knees => &[
            "Squats",
            "Lunges",
            "Jumping",
            "Box Jumps",
            "Leg Press",
            "Step-Ups",
            "Running",
            "Jump Squats",
            "Plyometric Training",
            "Wall Sits",
            "High Knees",
            "Burpees",
        ],
        PainArea::Back => &[
            "Deadlifts",
            "Bent-over Rows",
            "Superman Exercise",
            "Good Mornings",
            "Barbell Rows",
            "Pull-ups",
            "Heavy Back Extensions",
            "Romanian Deadlifts",
            "Kettlebell Swings",
            "Cable Rows",
            "T-Bar Rows",
            "Lat Pulldowns",
        ],
        PainArea::Shoulders => &[
            "Overhead Press",
            "Lateral Raises",
            "Upright Rows",
            "Dips",
            "Arnold Press",
            "Handstand Push-ups",
            "Behind-the-Neck Press",
            "Military Press",
            "Kettlebell Press",
            "Front Raises",
            "Cable Lateral Raises",
        ],
        PainArea::Ankles => &[
            "Jump Rope",
            "Calf Raises",
            "Sprint Training",
            "Plyometrics",
            "Basketball Drills",
            "Explosive Jumps",
            "Box Jumps",
            "Hill Running",
            "Single-Leg Hops",
        ],
        PainArea::Hips => &[
            "Deep Squats",
            "Hip Thrusts",
            "Leg Press",
            "Side Lunges",
            "Deadlifts",
            "Sumo Squats",
            "Bulgarian Split Squats",
            "Romanian Deadlifts",
            "Cossack Squats",
            "Box Step-Ups",
            "Glute Bridges",
            "Cable Kickbacks",
        ],
        PainArea::Neck => &[
            "Neck Bridges",
            "Shrugs",
            "Overhead Press",
            "Weighted Neck Exercises",
            "Behind-the-Neck Press",
            "Barbell Shrugs",
            "Trap Bar Deadlifts",
        ],
        PainArea::Wrists => &[
            "Push-ups",
            "Bench Press",
            "Front Squats",
            "Kettlebell Swings",
            "Pull-ups",
            "Planks",
            "Farmer's Walk",
            "Handstands",
        ],
        PainArea::Elbows => &[
            "Triceps Dips",
            "Close-Grip Bench Press",
            "Skull Crushers",
            "Overhead Triceps Extension",
            "EZ Bar Curls",
            "Hammer Curls",
            "Wrist Curls",
        ],
    }
}

/// Union of restricted exercises for `areas`, sorted and deduplicated.
pub fn restricted_exercises(areas: &[PainArea]) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = areas
        .iter()
        .flat_map(|area| exercises_for(*area).iter().copied())
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}

/// Whether an exercise name appears in a restriction list (case-insensitive).
pub fn is_restricted(name: &str, restricted: &[&str]) -> bool {
    restricted.iter().any(|r| r.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_areas_no_restrictions() {
        assert!(restricted_exercises(&[]).is_empty());
    }

    #[test]
    fn test_union_is_sorted_and_deduplicated() {
        // Knees and Ankles both list Box Jumps
        let names = restricted_exercises(&[PainArea::Knees, PainArea::Ankles]);
        assert_eq!(names.iter().filter(|n| **n == "Box Jumps").count(), 1);

        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"Squats"));
        assert!(names.contains(&"Jump Rope"));
    }

    #[test]
    fn test_is_restricted_ignores_case() {
        let names = restricted_exercises(&[PainArea::Back]);
        assert!(is_restricted("deadlifts", &names));
        assert!(is_restricted("  PULL-UPS", &names));
        assert!(!is_restricted("Bicep Curls", &names));
    }
}
