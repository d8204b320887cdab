// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Challenge verification against the Cloudflare Turnstile service.
//!
//! Abuse mitigation is optional infrastructure here, not a correctness
//! requirement: with no secret configured the check is skipped, and when
//! the verification service itself is unreachable the submission proceeds
//! (fail-open, keeping the contact channel available). Only an explicit
//! negative answer from the service rejects a submission.

use crate::config::ChallengeConfig;
use serde::Deserialize;
use tracing::{debug, warn};

/// Outcome of the challenge check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Not configured, no token supplied, or the service was unreachable
    Skipped,
    /// The service confirmed the token
    Passed,
    /// The service reported the token invalid
    Rejected,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Client for the Turnstile `siteverify` endpoint.
pub struct ChallengeVerifier {
    config: ChallengeConfig,
    client: reqwest::Client,
}

impl ChallengeVerifier {
    pub fn new(config: ChallengeConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Verify a challenge token for a client identifier.
    pub async fn verify(&self, token: Option<&str>, client_id: &str) -> ChallengeOutcome {
        let Some(secret) = self.config.secret_key.as_deref() else {
            debug!("Challenge secret not configured, skipping verification");
            return ChallengeOutcome::Skipped;
        };
        let Some(token) = token else {
            debug!("No challenge token supplied, skipping verification");
            return ChallengeOutcome::Skipped;
        };

        let payload = serde_json::json!({
            "secret": secret,
            "response": token,
            "remoteip": client_id,
        });

        let response = match self
            .client
            .post(&self.config.verify_url)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Challenge service unreachable, allowing submission");
                return ChallengeOutcome::Skipped;
            }
        };

        if !response.status().is_success() {
            warn!(
                status = response.status().as_u16(),
                "Challenge service returned an error, allowing submission"
            );
            return ChallengeOutcome::Skipped;
        }

        let verdict: VerifyResponse = match response.json().await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, "Unexpected challenge service response, allowing submission");
                return ChallengeOutcome::Skipped;
            }
        };

        if verdict.success {
            debug!(client = %client_id, "Challenge token verified");
            ChallengeOutcome::Passed
        } else {
            warn!(client = %client_id, error_codes = ?verdict.error_codes, "Challenge verification failed");
            ChallengeOutcome::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_skipped_without_secret() {
        let verifier = ChallengeVerifier::new(ChallengeConfig::default());
        let outcome = verifier.verify(Some("tok_1"), "203.0.113.7").await;
        assert_eq!(outcome, ChallengeOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_skipped_without_token() {
        let verifier = ChallengeVerifier::new(ChallengeConfig {
            secret_key: Some("secret_1".to_string()),
            ..Default::default()
        });
        let outcome = verifier.verify(None, "203.0.113.7").await;
        assert_eq!(outcome, ChallengeOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_unreachable_service_fails_open() {
        // Nothing listens on this port; the transport error must not block
        // the submission.
        let verifier = ChallengeVerifier::new(ChallengeConfig {
            secret_key: Some("secret_1".to_string()),
            verify_url: "http://127.0.0.1:9/siteverify".to_string(),
        });
        let outcome = verifier.verify(Some("tok_1"), "203.0.113.7").await;
        assert_eq!(outcome, ChallengeOutcome::Skipped);
    }
}
