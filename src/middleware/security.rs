// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security and cache headers applied to every response.

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};

/// Headers set on every API response. The API never serves HTML, so the
/// content policy denies everything.
const SECURITY_HEADERS: [(&str, &str); 6] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'none'",
    ),
    ("referrer-policy", "no-referrer"),
    (
        "permissions-policy",
        "camera=(), geolocation=(), microphone=(), payment=(), usb=()",
    ),
];

/// Public responses identical for every caller.
const SHARED_CACHE_PATHS: [&str; 1] = ["/billing/plans"];

/// Cache policy for a request. Anything that may carry profile or account
/// data must not be stored.
fn cache_policy(method: &Method, path: &str) -> &'static str {
    if method == Method::GET && SHARED_CACHE_PATHS.contains(&path) {
        "public, max-age=300"
    } else {
        "no-store"
    }
}

/// Add security headers to all responses.
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let cache = cache_policy(req.method(), req.uri().path());
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache));

    response
}
