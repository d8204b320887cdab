// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for form submission endpoints.
//!
//! One counter per client identifier, held in process memory. The counter
//! resets entirely at the window boundary (no sliding behavior). Windows
//! are wall-clock based so decisions can be surfaced directly in
//! `X-RateLimit-Reset` and `Retry-After` headers.
//!
//! Each deployment instance enforces its own independent budget; there is
//! no cross-process coordination.

use crate::config::RateLimitConfig;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Configured window limit
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the current window resets
    pub reset_at: DateTime<Utc>,
}

/// Per-identifier window state.
#[derive(Debug)]
struct FixedWindow {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Thread-safe fixed-window rate limiter.
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: RwLock<HashMap<String, FixedWindow>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Check and record a request for an identifier.
    ///
    /// Holds the write lock for the whole read-modify-write, so concurrent
    /// requests on the same identifier serialize. Cannot fail.
    pub async fn check(&self, identifier: &str) -> RateLimitDecision {
        let now = Utc::now();
        let limit = self.config.max_submissions;
        let mut windows = self.windows.write().await;

        match windows.get_mut(identifier) {
            // Within the current window
            Some(window) if now <= window.reset_at => {
                if window.count < limit {
                    window.count += 1;
                    debug!(identifier, count = window.count, "Submission counted");
                    RateLimitDecision {
                        allowed: true,
                        limit,
                        remaining: limit - window.count,
                        reset_at: window.reset_at,
                    }
                } else {
                    debug!(identifier, reset_at = %window.reset_at, "Rate limit exceeded");
                    RateLimitDecision {
                        allowed: false,
                        limit,
                        remaining: 0,
                        reset_at: window.reset_at,
                    }
                }
            }
            // First sight, or the stored window has expired
            _ => {
                let reset_at = now + self.config.window();
                windows.insert(
                    identifier.to_string(),
                    FixedWindow { count: 1, reset_at },
                );
                RateLimitDecision {
                    allowed: true,
                    limit,
                    remaining: limit.saturating_sub(1),
                    reset_at,
                }
            }
        }
    }

    /// Drop windows that have expired (called periodically by the sweep
    /// task for the life of the process).
    pub async fn cleanup(&self) {
        let now = Utc::now();
        let mut windows = self.windows.write().await;
        windows.retain(|_, window| now <= window.reset_at);
    }

    /// Number of tracked identifiers, for observability.
    pub async fn tracked_identifiers(&self) -> usize {
        self.windows.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_submissions: u32, window_ms: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_submissions,
            window_ms,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_window_exhaustion() {
        let limiter = limiter(5, 3_600_000);

        for i in 0..5 {
            let decision = limiter.check("203.0.113.7").await;
            assert!(decision.allowed, "request {} should be allowed", i + 1);
            assert_eq!(decision.remaining, 4 - i);
        }

        let decision = limiter.check("203.0.113.7").await;
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test]
    async fn test_rejection_keeps_reset_unchanged() {
        let limiter = limiter(1, 3_600_000);

        let first = limiter.check("203.0.113.7").await;
        let second = limiter.check("203.0.113.7").await;
        let third = limiter.check("203.0.113.7").await;

        assert!(first.allowed);
        assert!(!second.allowed);
        assert!(!third.allowed);
        assert_eq!(second.reset_at, first.reset_at);
        assert_eq!(third.reset_at, first.reset_at);
    }

    #[tokio::test]
    async fn test_window_reset_starts_fresh() {
        let limiter = limiter(2, 50);

        assert!(limiter.check("203.0.113.7").await.allowed);
        assert!(limiter.check("203.0.113.7").await.allowed);
        assert!(!limiter.check("203.0.113.7").await.allowed);

        tokio::time::sleep(std::time::Duration::from_millis(80)).await;

        let decision = limiter.check("203.0.113.7").await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1, "fresh window starts at count 1");
    }

    #[tokio::test]
    async fn test_identifiers_independent() {
        let limiter = limiter(1, 3_600_000);

        assert!(limiter.check("203.0.113.7").await.allowed);
        assert!(!limiter.check("203.0.113.7").await.allowed);
        assert!(limiter.check("198.51.100.23").await.allowed);
    }

    #[tokio::test]
    async fn test_cleanup_drops_expired_windows() {
        let limiter = limiter(5, 40);

        limiter.check("203.0.113.7").await;
        limiter.check("198.51.100.23").await;
        assert_eq!(limiter.tracked_identifiers().await, 2);

        tokio::time::sleep(std::time::Duration::from_millis(60)).await;
        limiter.cleanup().await;
        assert_eq!(limiter.tracked_identifiers().await, 0);
    }
}
