// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use cufit::error::AppError;
use cufit::services::AssistantError;
use serde_json::Value;

async fn render(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_database_details_not_leaked() {
    let (status, body) = render(AppError::Database("connection refused at 10.0.0.3".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_internal_details_not_leaked() {
    let (status, body) = render(AppError::Internal(anyhow::anyhow!("secret path"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("secret path"));
}

#[tokio::test]
async fn test_assistant_failures_are_bad_gateway() {
    let err: AppError = AssistantError::TooManyToolRounds(4).into();
    let (status, body) = render(err).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "assistant_error");

    let err: AppError = AssistantError::Transport("timeout".into()).into();
    assert_eq!(render(err).await.0, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_not_found_carries_message() {
    let (status, body) = render(AppError::NotFound("Profile not found".into())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["details"], "Profile not found");
}
