// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Team chat notification via a Slack incoming webhook.
//!
//! Secondary channel: an unset webhook URL makes every send a silent
//! no-op, and failures are only logged by the caller. The free-text
//! message is truncated to a bounded preview before posting.

use crate::config::ChatConfig;
use crate::models::ValidatedSubmission;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// Errors from the chat webhook.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned status {0}")]
    Status(u16),
}

/// Slack incoming-webhook client.
pub struct ChatNotifier {
    config: ChatConfig,
    client: reqwest::Client,
}

impl ChatNotifier {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.webhook_url.is_some()
    }

    /// Post a submission summary to the configured webhook.
    pub async fn notify_submission(
        &self,
        submission: &ValidatedSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<(), ChatError> {
        let Some(url) = self.config.webhook_url.as_deref() else {
            debug!("Chat webhook not configured, skipping notification");
            return Ok(());
        };

        let payload = build_payload(submission, submitted_at, self.config.preview_chars);
        let response = self.client.post(url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(ChatError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Truncate the free-text message to a bounded preview.
fn preview(message: &str, max_chars: usize) -> String {
    if message.chars().count() <= max_chars {
        message.to_string()
    } else {
        let truncated: String = message.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

fn build_payload(
    submission: &ValidatedSubmission,
    submitted_at: DateTime<Utc>,
    preview_chars: usize,
) -> Value {
    let priority = if submission.topic.is_high_priority() {
        "\u{1F534} HIGH PRIORITY"
    } else {
        "\u{1F7E2} Normal"
    };

    let mut fields = vec![
        json!({"type": "mrkdwn", "text": format!("*Name:*\n{}", submission.name)}),
        json!({"type": "mrkdwn", "text": format!("*Email:*\n<mailto:{0}|{0}>", submission.email)}),
        json!({"type": "mrkdwn", "text": format!("*Company:*\n{}", submission.company)}),
    ];
    if let Some(role) = &submission.role {
        fields.push(json!({"type": "mrkdwn", "text": format!("*Role:*\n{role}")}));
    }
    if let Some(phone) = &submission.phone {
        fields.push(json!({"type": "mrkdwn", "text": format!("*Phone:*\n<tel:{0}|{0}>", phone)}));
    }
    if let Some(jurisdiction) = &submission.jurisdiction {
        fields.push(json!({"type": "mrkdwn", "text": format!("*Jurisdiction:*\n{jurisdiction}")}));
    }

    json!({
        "blocks": [
            {
                "type": "header",
                "text": {
                    "type": "plain_text",
                    "text": format!("{} New Contact Form Submission", submission.topic.emoji()),
                    "emoji": true,
                },
            },
            {
                "type": "section",
                "fields": [
                    {"type": "mrkdwn", "text": format!("*Topic:*\n{}", submission.topic.label())},
                    {"type": "mrkdwn", "text": format!("*Priority:*\n{priority}")},
                ],
            },
            {"type": "divider"},
            {
                "type": "section",
                "fields": fields,
            },
            {
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!("*Message:*\n{}", preview(&submission.message, preview_chars)),
                },
            },
            {
                "type": "context",
                "elements": [
                    {
                        "type": "mrkdwn",
                        "text": format!(
                            "Submitted: <!date^{}^{{date_long_pretty}} at {{time}}|{}>",
                            submitted_at.timestamp(),
                            submitted_at.to_rfc3339(),
                        ),
                    },
                ],
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Topic;

    fn submission(message: &str) -> ValidatedSubmission {
        ValidatedSubmission {
            name: "Ana Ionescu".to_string(),
            company: "Acme Logistics".to_string(),
            email: "ana@acme.example".to_string(),
            message: message.to_string(),
            topic: Topic::Incident,
            phone: None,
            role: None,
            jurisdiction: Some("Romania".to_string()),
        }
    }

    #[test]
    fn test_preview_truncation() {
        assert_eq!(preview("short", 500), "short");
        let long = "x".repeat(600);
        let truncated = preview(&long, 500);
        assert_eq!(truncated.chars().count(), 503);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_payload_structure() {
        let payload = build_payload(&submission("Help needed."), Utc::now(), 500);
        let blocks = payload["blocks"].as_array().unwrap();
        assert_eq!(blocks[0]["type"], "header");
        assert!(blocks[0]["text"]["text"]
            .as_str()
            .unwrap()
            .contains("New Contact Form Submission"));

        let rendered = payload.to_string();
        assert!(rendered.contains("HIGH PRIORITY"));
        assert!(rendered.contains("*Jurisdiction:*"));
        assert!(!rendered.contains("*Role:*"), "absent fields are omitted");
    }

    #[test]
    fn test_payload_truncates_long_message() {
        let long = "y".repeat(800);
        let payload = build_payload(&submission(&long), Utc::now(), 500);
        let rendered = payload.to_string();
        assert!(!rendered.contains(&long));
        assert!(rendered.contains(&format!("{}...", "y".repeat(500))));
    }

    #[tokio::test]
    async fn test_unconfigured_webhook_is_noop() {
        let notifier = ChatNotifier::new(ChatConfig::default());
        assert!(!notifier.is_configured());
        let result = notifier.notify_submission(&submission("Help needed."), Utc::now()).await;
        assert!(result.is_ok());
    }
}
