// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with FIRESTORE_EMULATOR_HOST pointing at a local emulator.
//!
//! The emulator provides a clean state for each test run.

use cufit::models::choices::{DietSelection, MealType, PainArea};
use cufit::models::{
    DailyMealPlan, Payment, Profile, ProfileUpdate, RefreshTokenRecord, Subscription, User,
    WebhookEventRecord,
};
use cufit::time_utils::now_rfc3339;

mod common;
use common::{test_db, unique_suffix};

/// Helper to create a basic test user
fn test_user(suffix: &str) -> User {
    User {
        user_id: format!("user_{}", suffix),
        username: format!("tester_{}", suffix),
        email: format!("tester_{}@example.com", suffix),
        password_hash: "$argon2id$placeholder".to_string(),
        phone_number: None,
        selected_plan: None,
        customer_id: None,
        created_at: now_rfc3339(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_created_with_profile() {
    require_emulator!();

    let db = test_db().await;
    let user = test_user(&unique_suffix());

    // Initially, user should not exist
    assert!(db.get_user(&user.user_id).await.unwrap().is_none());

    let profile = Profile::new(&user.user_id, &user.created_at);
    db.create_user_with_profile(&user, &profile).await.unwrap();

    let fetched = db.get_user(&user.user_id).await.unwrap().unwrap();
    assert_eq!(fetched.username, user.username);
    assert_eq!(fetched.email, user.email);

    let fetched_profile = db.get_profile(&user.user_id).await.unwrap().unwrap();
    assert_eq!(fetched_profile.user_id, user.user_id);
    assert!(fetched_profile.diet_selection.is_none());
}

#[tokio::test]
async fn test_find_user_by_username_and_email() {
    require_emulator!();

    let db = test_db().await;
    let user = test_user(&unique_suffix());
    db.upsert_user(&user).await.unwrap();

    let by_name = db.find_user_by_username(&user.username).await.unwrap();
    assert_eq!(by_name.map(|u| u.user_id), Some(user.user_id.clone()));

    let by_email = db.find_user_by_email(&user.email).await.unwrap();
    assert_eq!(by_email.map(|u| u.user_id), Some(user.user_id.clone()));

    let missing = db
        .find_user_by_username(&format!("nobody_{}", unique_suffix()))
        .await
        .unwrap();
    assert!(missing.is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// PROFILE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_profile_partial_update_persists() {
    require_emulator!();

    let db = test_db().await;
    let user = test_user(&unique_suffix());
    let mut profile = Profile::new(&user.user_id, &user.created_at);
    db.create_user_with_profile(&user, &profile).await.unwrap();

    profile.apply(
        ProfileUpdate {
            diet_selection: Some(DietSelection::Keto),
            pain_and_injury: Some(vec![PainArea::Knees, PainArea::Knees]),
            ..Default::default()
        },
        &now_rfc3339(),
    );
    db.upsert_profile(&profile).await.unwrap();

    let fetched = db.get_profile(&user.user_id).await.unwrap().unwrap();
    assert_eq!(fetched.diet_selection, Some(DietSelection::Keto));
    assert_eq!(fetched.pain_and_injury, vec![PainArea::Knees]);
    assert!(fetched
        .exercise_routine
        .as_deref()
        .is_some_and(|r| r.contains("Squats")));
}

// ═══════════════════════════════════════════════════════════════════════════
// REFRESH TOKEN TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_refresh_token_lifecycle() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let record = RefreshTokenRecord {
        token_hash: format!("hash_{}", suffix),
        user_id: format!("user_{}", suffix),
        expires_at: "2099-01-01T00:00:00Z".to_string(),
        created_at: now_rfc3339(),
    };

    db.store_refresh_token(&record).await.unwrap();
    let fetched = db.get_refresh_token(&record.token_hash).await.unwrap();
    assert_eq!(fetched.map(|r| r.user_id), Some(record.user_id.clone()));

    db.delete_refresh_token(&record.token_hash).await.unwrap();
    assert!(db
        .get_refresh_token(&record.token_hash)
        .await
        .unwrap()
        .is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// MEAL PLAN TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_daily_plan_keyed_by_user_and_date() {
    require_emulator!();

    let db = test_db().await;
    let user_id = format!("user_{}", unique_suffix());
    let mut plan = DailyMealPlan {
        user_id: user_id.clone(),
        date: "2026-03-01".to_string(),
        created_at: now_rfc3339(),
        ..Default::default()
    };
    plan.set_meals(MealType::Breakfast, vec![1, 2]);
    plan.set_meals(MealType::Snacks, vec![7]);
    db.set_daily_plan(&plan).await.unwrap();

    let fetched = db
        .get_daily_plan(&user_id, "2026-03-01")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.meals_for(MealType::Breakfast), &[1, 2]);
    assert_eq!(fetched.meals_for(MealType::Snacks), &[7]);
    assert!(fetched.meals_for(MealType::Lunch).is_empty());

    // A different date is a different plan
    assert!(db
        .get_daily_plan(&user_id, "2026-03-02")
        .await
        .unwrap()
        .is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// BILLING TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_record_checkout_once_per_event() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let event = WebhookEventRecord {
        event_id: format!("evt_{}", suffix),
        event_type: "checkout.session.completed".to_string(),
        received_at: now_rfc3339(),
    };
    let mut subscription = Subscription {
        subscription_id: format!("sub_{}", suffix),
        status: "active".to_string(),
        plan_name: "Basic".to_string(),
        user_id: Some(format!("user_{}", suffix)),
        customer_id: Some("cus_test".to_string()),
        created_at: now_rfc3339(),
    };
    let payment = Payment {
        payment_intent: format!("pi_{}", suffix),
        subscription_id: subscription.subscription_id.clone(),
        amount: 499,
        status: "succeeded".to_string(),
        currency: "usd".to_string(),
        created_at: now_rfc3339(),
    };

    assert!(db
        .record_checkout(&event, &subscription, Some(&payment))
        .await
        .unwrap());

    // A second delivery of the same event writes nothing
    subscription.status = "canceled".to_string();
    assert!(!db
        .record_checkout(&event, &subscription, None)
        .await
        .unwrap());

    let stored = db
        .get_subscriptions_for_user(&format!("user_{}", suffix))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, "active");

    let stored_payment = db.get_payment(&payment.payment_intent).await.unwrap();
    assert_eq!(stored_payment.map(|p| p.amount), Some(499));
    assert!(db.webhook_event_seen(&event.event_id).await.unwrap());
}

// ═══════════════════════════════════════════════════════════════════════════
// DELETION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_delete_user_data() {
    require_emulator!();

    let db = test_db().await;
    let suffix = unique_suffix();
    let user = test_user(&suffix);
    db.create_user_with_profile(&user, &Profile::new(&user.user_id, &user.created_at))
        .await
        .unwrap();

    let token = RefreshTokenRecord {
        token_hash: format!("hash_{}", suffix),
        user_id: user.user_id.clone(),
        expires_at: "2099-01-01T00:00:00Z".to_string(),
        created_at: now_rfc3339(),
    };
    db.store_refresh_token(&token).await.unwrap();
    db.set_daily_plan(&DailyMealPlan {
        user_id: user.user_id.clone(),
        date: "2026-03-01".to_string(),
        created_at: now_rfc3339(),
        ..Default::default()
    })
    .await
    .unwrap();

    let deleted = db.delete_user_data(&user.user_id).await.unwrap();
    assert_eq!(deleted, 4);

    assert!(db.get_user(&user.user_id).await.unwrap().is_none());
    assert!(db.get_profile(&user.user_id).await.unwrap().is_none());
    assert!(db
        .get_refresh_token(&token.token_hash)
        .await
        .unwrap()
        .is_none());
    assert!(db
        .get_daily_plan(&user.user_id, "2026-03-01")
        .await
        .unwrap()
        .is_none());
}
