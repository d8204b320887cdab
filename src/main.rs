// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake Service
//!
//! The form-submission pipeline behind the CyberGlobal Law website:
//!
//! - Fixed-window rate limiting per client identifier (5/hour default)
//! - Wholesale field validation with field-level error maps
//! - Optional Turnstile challenge verification (fail-open)
//! - Notification fan-out: operator email (blocking), submitter
//!   confirmation email and Slack webhook (fire-and-forget)
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honored):
//!
//! - `BIND_ADDR`: server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_MAX`: submissions per window per client (default: 5)
//! - `RATE_LIMIT_WINDOW_MS`: window length in milliseconds (default: 3600000)
//! - `CLEANUP_INTERVAL_SECS`: limiter sweep interval (default: 300)
//! - `RESEND_API_KEY`: transactional email API key (unset: sends fail)
//! - `FROM_EMAIL` / `TO_EMAIL` / `ARCHIVE_EMAIL`: delivery addresses
//! - `SLACK_WEBHOOK_URL`: chat notifications (unset: disabled)
//! - `TURNSTILE_SECRET_KEY`: challenge verification (unset: skipped)
//! - `ALLOWED_ORIGINS`: comma-separated CORS origins

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_intake::{
    config::{ChallengeConfig, ChatConfig, Config, ContactInfo, MailConfig, RateLimitConfig},
    handlers::{router, AppState},
    limiter::RateLimiter,
    mail::Mailer,
    notify::Notifier,
    slack::ChatNotifier,
    verifier::ChallengeVerifier,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = load_config();
    info!(
        bind_addr = %config.bind_addr,
        limit = config.rate_limit.max_submissions,
        window_ms = config.rate_limit.window_ms,
        chat_configured = config.chat.webhook_url.is_some(),
        challenge_configured = config.challenge.secret_key.is_some(),
        "Starting contact intake service"
    );

    // Create application state
    let limiter = RateLimiter::new(config.rate_limit.clone());
    let verifier = ChallengeVerifier::new(config.challenge.clone());
    let mailer = Mailer::new(config.mail.clone(), config.contact.clone());
    let chat = ChatNotifier::new(config.chat.clone());
    let notifier = Notifier::new(mailer, chat);

    let state = Arc::new(AppState {
        limiter,
        verifier,
        notifier,
        config: config.clone(),
    });

    // Sweep expired rate-limit windows for the life of the process.
    let sweep_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_state.config.rate_limit.cleanup_interval());
        loop {
            interval.tick().await;
            sweep_state.limiter.cleanup().await;
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        allowed_origins: std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "https://cybergloballaw.com".to_string()),
        rate_limit: RateLimitConfig {
            max_submissions: std::env::var("RATE_LIMIT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            window_ms: std::env::var("RATE_LIMIT_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3_600_000),
            cleanup_interval_secs: std::env::var("CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
        },
        mail: MailConfig {
            api_key: std::env::var("RESEND_API_KEY").ok(),
            from: std::env::var("FROM_EMAIL").unwrap_or_else(|_| MailConfig::default().from),
            to: std::env::var("TO_EMAIL").unwrap_or_else(|_| MailConfig::default().to),
            archive: std::env::var("ARCHIVE_EMAIL").ok(),
            ..Default::default()
        },
        chat: ChatConfig {
            webhook_url: std::env::var("SLACK_WEBHOOK_URL").ok(),
            ..Default::default()
        },
        challenge: ChallengeConfig {
            secret_key: std::env::var("TURNSTILE_SECRET_KEY").ok(),
            ..Default::default()
        },
        contact: ContactInfo::default(),
    }
}
