// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact intake service.
//!
//! Defaults match the production deployment of the CyberGlobal Law site:
//! 5 submissions per hour per client, Resend for email delivery, Turnstile
//! for challenge verification.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the contact intake service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Comma-separated list of allowed CORS origins
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Email delivery configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Team chat webhook configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Challenge verification configuration
    #[serde(default)]
    pub challenge: ChallengeConfig,

    /// Firm contact details surfaced in responses and emails
    #[serde(default)]
    pub contact: ContactInfo,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per window per client identifier (default: 5)
    #[serde(default = "default_max_submissions")]
    pub max_submissions: u32,

    /// Window length in milliseconds (default: 3600000, one hour)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Interval between sweeps of expired windows in seconds (default: 300)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

/// Transactional email delivery configuration (Resend REST API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Base URL of the email API (default: https://api.resend.com)
    #[serde(default = "default_mail_api_url")]
    pub api_url: String,

    /// API key. Unset means every send fails with a configuration error.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sender address
    #[serde(default = "default_operator_email")]
    pub from: String,

    /// Operator recipient address
    #[serde(default = "default_operator_email")]
    pub to: String,

    /// Optional archive mailbox receiving a best-effort duplicate
    #[serde(default)]
    pub archive: Option<String>,
}

/// Team chat webhook configuration (Slack incoming webhook).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Webhook URL. Unset disables chat notifications entirely.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Maximum characters of the free-text message included in the
    /// notification (default: 500)
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

/// Challenge verification configuration (Cloudflare Turnstile).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeConfig {
    /// Shared secret. Unset skips verification for every submission.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Verification endpoint
    #[serde(default = "default_verify_url")]
    pub verify_url: String,
}

/// Firm contact details used in user-facing copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Firm display name
    #[serde(default = "default_firm_name")]
    pub firm_name: String,

    /// Direct address offered when the pipeline cannot deliver
    #[serde(default = "default_operator_email")]
    pub fallback_email: String,

    /// 24/7 incident hotline number
    #[serde(default = "default_hotline")]
    pub hotline: String,

    /// Public site URL for links in confirmation emails
    #[serde(default = "default_site_url")]
    pub site_url: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_allowed_origins() -> String {
    "https://cybergloballaw.com".to_string()
}

fn default_max_submissions() -> u32 {
    5
}

fn default_window_ms() -> u64 {
    3_600_000 // one hour
}

fn default_cleanup_interval_secs() -> u64 {
    300
}

fn default_mail_api_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_operator_email() -> String {
    "nader.bakri@cybergl.com".to_string()
}

fn default_preview_chars() -> usize {
    500
}

fn default_verify_url() -> String {
    "https://challenges.cloudflare.com/turnstile/v0/siteverify".to_string()
}

fn default_firm_name() -> String {
    "CyberGlobal Law".to_string()
}

fn default_hotline() -> String {
    "+40 745 304 772".to_string()
}

fn default_site_url() -> String {
    "https://cybergloballaw.com".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            allowed_origins: default_allowed_origins(),
            rate_limit: RateLimitConfig::default(),
            mail: MailConfig::default(),
            chat: ChatConfig::default(),
            challenge: ChallengeConfig::default(),
            contact: ContactInfo::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: default_max_submissions(),
            window_ms: default_window_ms(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: default_mail_api_url(),
            api_key: None,
            from: default_operator_email(),
            to: default_operator_email(),
            archive: None,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            preview_chars: default_preview_chars(),
        }
    }
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            verify_url: default_verify_url(),
        }
    }
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            firm_name: default_firm_name(),
            fallback_email: default_operator_email(),
            hotline: default_hotline(),
            site_url: default_site_url(),
        }
    }
}

impl RateLimitConfig {
    /// Get the window duration
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.window_ms as i64)
    }

    /// Get the sweep interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}
