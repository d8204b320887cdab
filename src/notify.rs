// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Notification fan-out.
//!
//! The operator email is the primary channel and is awaited; its failure
//! fails the request. The submitter confirmation and the chat webhook are
//! dispatched on background tasks: the handler does not wait for them, and
//! their errors are caught and logged here, never propagated.

use crate::mail::{MailError, Mailer};
use crate::models::{ValidatedPartnerInquiry, ValidatedSubmission};
use crate::slack::ChatNotifier;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Notification channel, for per-channel outcome logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    PrimaryEmail,
    ConfirmationEmail,
    ChatWebhook,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrimaryEmail => write!(f, "primary-email"),
            Self::ConfirmationEmail => write!(f, "confirmation-email"),
            Self::ChatWebhook => write!(f, "chat-webhook"),
        }
    }
}

/// Multi-channel notification dispatcher.
pub struct Notifier {
    mailer: Arc<Mailer>,
    chat: Arc<ChatNotifier>,
}

impl Notifier {
    pub fn new(mailer: Mailer, chat: ChatNotifier) -> Self {
        Self {
            mailer: Arc::new(mailer),
            chat: Arc::new(chat),
        }
    }

    /// Fan out notifications for an accepted contact submission.
    ///
    /// Returns the provider id of the primary email. Secondary sends are
    /// spawned and not awaited.
    pub async fn dispatch(&self, submission: &ValidatedSubmission) -> Result<String, MailError> {
        let submitted_at = Utc::now();

        let message_id = self
            .mailer
            .send_contact_email(submission, submitted_at)
            .await?;
        info!(channel = %Channel::PrimaryEmail, message_id = %message_id, "Notification sent");

        // Fire-and-forget: acknowledgment to the submitter.
        let mailer = self.mailer.clone();
        let sub = submission.clone();
        tokio::spawn(async move {
            match mailer
                .send_confirmation_email(&sub.email, &sub.name, sub.topic)
                .await
            {
                Ok(()) => {
                    info!(channel = %Channel::ConfirmationEmail, to = %sub.email, "Notification sent")
                }
                Err(e) => {
                    warn!(channel = %Channel::ConfirmationEmail, error = %e, "Notification failed")
                }
            }
        });

        // Fire-and-forget: team chat summary. Absence of configuration is a
        // silent no-op.
        if self.chat.is_configured() {
            let chat = self.chat.clone();
            let sub = submission.clone();
            tokio::spawn(async move {
                match chat.notify_submission(&sub, submitted_at).await {
                    Ok(()) => info!(channel = %Channel::ChatWebhook, "Notification sent"),
                    Err(e) => warn!(channel = %Channel::ChatWebhook, error = %e, "Notification failed"),
                }
            });
        }

        Ok(message_id)
    }

    /// Send the primary email for a partner inquiry. No secondary channels.
    pub async fn dispatch_partner(
        &self,
        inquiry: &ValidatedPartnerInquiry,
    ) -> Result<String, MailError> {
        let message_id = self.mailer.send_partner_email(inquiry).await?;
        info!(channel = %Channel::PrimaryEmail, message_id = %message_id, "Partner inquiry sent");
        Ok(message_id)
    }
}
