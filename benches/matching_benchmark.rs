use criterion::{criterion_group, criterion_main, Criterion};
use cufit::models::choices::{
    ActivityLevel, CookingTime, DietPreference, DietSelection, Equipment, ExerciseDifficulty,
    Goal, PainArea,
};
use cufit::models::Profile;
use cufit::services::matching::{match_meals, match_workout, Selection};
use cufit::services::CatalogService;
use std::hint::black_box;

fn benchmark_matching(c: &mut Criterion) {
    let catalog = CatalogService::load_from_file("data/catalog.json").expect("Failed to load catalog");

    // Every predicate set; most tiers come up empty and relax
    let specific = Profile {
        diet_selection: Some(DietSelection::RawFood),
        goal_selection: Some(Goal::Powerlifting),
        diet_preference: Some(DietPreference::Detox),
        cooking_time_preference: Some(CookingTime::Over45),
        activity_level: Some(ActivityLevel::VeryActive),
        exercise_difficulty: Some(ExerciseDifficulty::Advanced),
        pain_and_injury: vec![PainArea::Knees, PainArea::Back],
        equipment: vec![Equipment::Dumbbells, Equipment::YogaMat],
        ..Default::default()
    };
    let empty = Profile::default();

    let mut group = c.benchmark_group("matching");

    group.bench_function("meals_specific_profile", |b| {
        b.iter(|| match_meals(&catalog, black_box(&specific), Selection::First))
    });

    group.bench_function("meals_empty_profile", |b| {
        b.iter(|| match_meals(&catalog, black_box(&empty), Selection::First))
    });

    group.bench_function("workout_random_selection", |b| {
        b.iter(|| match_workout(&catalog, black_box(&specific), Selection::Random))
    });

    group.finish();
}

criterion_group!(benches, benchmark_matching);
criterion_main!(benches);
