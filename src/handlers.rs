// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the contact intake service.
//!
//! Each form endpoint runs a linear pipeline with early exits:
//! rate limit → validation → (challenge) → notification fan-out →
//! response. Rejections carry field-level detail and rate-limit headers;
//! a primary notification failure maps to a 500 with fallback contact
//! instructions and never escapes the handler.

use crate::config::Config;
use crate::limiter::{RateLimitDecision, RateLimiter};
use crate::models::{ContactSubmission, PartnerInquiry};
use crate::notify::Notifier;
use crate::validator;
use crate::verifier::{ChallengeOutcome, ChallengeVerifier};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub verifier: ChallengeVerifier,
    pub notifier: Notifier,
    pub config: Config,
}

/// Response body for the form endpoints.
#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl FormResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: None,
            retry_after: None,
            error: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
            retry_after: None,
            error: None,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "contact-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Best-effort client identifier from proxy-supplied forwarding headers.
///
/// Trusts `X-Forwarded-For` (first hop), then `X-Real-IP`. Clients behind
/// a proxy that reports neither all share the "unknown" bucket — a known
/// limitation of this identity scheme.
pub fn client_identifier(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    "unknown".to_string()
}

fn rate_limit_headers(decision: &RateLimitDecision) -> [(&'static str, String); 3] {
    [
        ("X-RateLimit-Limit", decision.limit.to_string()),
        ("X-RateLimit-Remaining", decision.remaining.to_string()),
        ("X-RateLimit-Reset", decision.reset_at.timestamp().to_string()),
    ]
}

fn too_many_requests(decision: &RateLimitDecision) -> Response {
    let wait_ms = (decision.reset_at - Utc::now()).num_milliseconds().max(0);
    let minutes = (wait_ms + 59_999) / 60_000;
    let retry_secs = (wait_ms + 999) / 1000;

    (
        StatusCode::TOO_MANY_REQUESTS,
        [
            ("Retry-After", retry_secs.to_string()),
            ("X-RateLimit-Limit", decision.limit.to_string()),
            ("X-RateLimit-Remaining", "0".to_string()),
            ("X-RateLimit-Reset", decision.reset_at.timestamp().to_string()),
        ],
        Json(FormResponse {
            success: false,
            message: format!("Too many requests. Please try again in {minutes} minutes."),
            errors: None,
            retry_after: Some(decision.reset_at.to_rfc3339()),
            error: None,
        }),
    )
        .into_response()
}

fn validation_failure(errors: validator::FieldErrors) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(FormResponse {
            success: false,
            message: "Please check your form and try again.".to_string(),
            errors: Some(errors.errors),
            retry_after: None,
            error: None,
        }),
    )
        .into_response()
}

fn malformed_body(client_id: &str, rejection: &JsonRejection) -> Response {
    warn!(client = %client_id, error = %rejection, "Malformed submission body");
    (
        StatusCode::BAD_REQUEST,
        Json(FormResponse::failure("Please check your form and try again.")),
    )
        .into_response()
}

fn notification_failure(fallback_email: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FormResponse {
            success: false,
            message: format!(
                "We couldn't send your message. Please email us directly at {fallback_email} \
                 or call our 24/7 hotline."
            ),
            errors: None,
            retry_after: None,
            error: Some("email_failed"),
        }),
    )
        .into_response()
}

/// `POST /contact-submission` — the contact form pipeline.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<ContactSubmission>, JsonRejection>,
) -> Response {
    let client_id = client_identifier(&headers);

    let decision = state.limiter.check(&client_id).await;
    if !decision.allowed {
        info!(client = %client_id, reset_at = %decision.reset_at, "Submission rate limited");
        return too_many_requests(&decision);
    }

    let Json(raw) = match body {
        Ok(json) => json,
        Err(rejection) => return malformed_body(&client_id, &rejection),
    };

    let submission = match validator::validate_contact(&raw) {
        Ok(submission) => submission,
        Err(errors) => {
            info!(client = %client_id, fields = errors.errors.len(), "Submission failed validation");
            return validation_failure(errors);
        }
    };

    match state
        .verifier
        .verify(raw.challenge_token.as_deref(), &client_id)
        .await
    {
        ChallengeOutcome::Rejected => {
            info!(client = %client_id, "Submission failed challenge verification");
            return (
                StatusCode::BAD_REQUEST,
                Json(FormResponse::failure(format!(
                    "Spam verification failed. Please try again or contact us directly at {}.",
                    state.config.contact.fallback_email
                ))),
            )
                .into_response();
        }
        ChallengeOutcome::Passed | ChallengeOutcome::Skipped => {}
    }

    info!(
        client = %client_id,
        topic = submission.topic.as_str(),
        email = %submission.email,
        company = %submission.company,
        user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(""),
        remaining = decision.remaining,
        "Contact form submission accepted"
    );

    if let Err(e) = state.notifier.dispatch(&submission).await {
        warn!(client = %client_id, error = %e, "Primary notification failed");
        return notification_failure(&state.config.contact.fallback_email);
    }

    let message = if submission.topic.is_high_priority() {
        format!(
            "Thank you for contacting us. For urgent incidents, please also call our 24/7 \
             hotline at {} for immediate assistance.",
            state.config.contact.hotline
        )
    } else {
        "Thank you for your message! We will respond within 1 business day. Check your email \
         for confirmation."
            .to_string()
    };

    (
        StatusCode::OK,
        rate_limit_headers(&decision),
        Json(FormResponse::success(message)),
    )
        .into_response()
}

/// `POST /partner-inquiry` — the partner inquiry pipeline.
pub async fn submit_partner(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<PartnerInquiry>, JsonRejection>,
) -> Response {
    let client_id = client_identifier(&headers);

    let decision = state.limiter.check(&client_id).await;
    if !decision.allowed {
        info!(client = %client_id, reset_at = %decision.reset_at, "Partner inquiry rate limited");
        return too_many_requests(&decision);
    }

    let Json(raw) = match body {
        Ok(json) => json,
        Err(rejection) => return malformed_body(&client_id, &rejection),
    };

    let inquiry = match validator::validate_partner(&raw) {
        Ok(inquiry) => inquiry,
        Err(errors) => {
            info!(client = %client_id, fields = errors.errors.len(), "Partner inquiry failed validation");
            return validation_failure(errors);
        }
    };

    info!(
        client = %client_id,
        organization = %inquiry.organization_name,
        partner_type = inquiry.partner_type.label(),
        remaining = decision.remaining,
        "Partner inquiry accepted"
    );

    if let Err(e) = state.notifier.dispatch_partner(&inquiry).await {
        warn!(client = %client_id, error = %e, "Partner inquiry notification failed");
        return notification_failure(&state.config.contact.fallback_email);
    }

    (
        StatusCode::OK,
        rate_limit_headers(&decision),
        Json(FormResponse::success(
            "Thank you for your inquiry! Our partnerships team will respond within 2 business days.",
        )),
    )
        .into_response()
}

/// `GET` on the form endpoints is not supported.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(FormResponse::failure(
            "Method not allowed. Use POST to submit the contact form.",
        )),
    )
        .into_response()
}

/// Build the service router with security headers, tracing and CORS.
pub fn router(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .split(',')
        .filter_map(|o| o.trim().parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/contact-submission",
            post(submit_contact).get(method_not_allowed),
        )
        .route(
            "/partner-inquiry",
            post(submit_partner).get(method_not_allowed),
        )
        .route("/health", get(health))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=63072000; includeSubDomains; preload"),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
