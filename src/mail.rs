// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Transactional email delivery through the Resend REST API.
//!
//! Three messages are sent from here: the operator-facing submission email
//! (the primary notification channel), the submitter confirmation, and the
//! partner-inquiry email. The operator email optionally gets a best-effort
//! duplicate to an archive mailbox.

use crate::config::{ContactInfo, MailConfig};
use crate::models::{Topic, ValidatedPartnerInquiry, ValidatedSubmission};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Errors from the email delivery provider.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("email provider not configured (missing API key)")]
    NotConfigured,

    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("email provider returned {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

/// Resend API client.
pub struct Mailer {
    config: MailConfig,
    contact: ContactInfo,
    client: reqwest::Client,
}

impl Mailer {
    pub fn new(config: MailConfig, contact: ContactInfo) -> Self {
        Self {
            config,
            contact,
            client: reqwest::Client::new(),
        }
    }

    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: &str,
        text: Option<&str>,
        reply_to: Option<&str>,
    ) -> Result<String, MailError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(MailError::NotConfigured);
        };

        let mut payload = serde_json::json!({
            "from": self.config.from,
            "to": [to],
            "subject": subject,
            "html": html,
        });
        if let Some(text) = text {
            payload["text"] = text.into();
        }
        if let Some(reply_to) = reply_to {
            payload["reply_to"] = reply_to.into();
        }

        let response = self
            .client
            .post(format!("{}/emails", self.config.api_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let sent: SendResponse = response.json().await?;
        Ok(sent.id)
    }

    /// Send the operator-facing submission email.
    ///
    /// This is the primary channel: the caller treats failure as fatal to
    /// the request. The submitter's address is set as reply-to. If an
    /// archive mailbox is configured, a duplicate follows; its failure is
    /// logged and does not affect the primary result.
    pub async fn send_contact_email(
        &self,
        submission: &ValidatedSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<String, MailError> {
        let subject = format!(
            "{} {}: {} - {}",
            submission.topic.emoji(),
            submission.topic.label(),
            submission.name,
            submission.company
        );
        let html = render_contact_html(submission, submitted_at);
        let text = render_contact_text(submission, submitted_at);

        let id = self
            .send(
                &self.config.to,
                &subject,
                &html,
                Some(&text),
                Some(&submission.email),
            )
            .await?;

        if let Some(archive) = self.config.archive.as_deref() {
            let archive_subject = format!("[ARCHIVE] {subject}");
            if let Err(e) = self.send(archive, &archive_subject, &html, Some(&text), None).await {
                warn!(archive, error = %e, "Archive copy failed");
            }
        }

        Ok(id)
    }

    /// Send the short acknowledgment to the submitter. Secondary channel;
    /// callers log failures and move on.
    pub async fn send_confirmation_email(
        &self,
        to: &str,
        name: &str,
        topic: Topic,
    ) -> Result<(), MailError> {
        let subject = format!("Thank you for contacting {}", self.contact.firm_name);
        let html = render_confirmation_html(name, topic, &self.contact);
        self.send(to, &subject, &html, None, None).await?;
        Ok(())
    }

    /// Send the operator-facing partner inquiry email (primary channel for
    /// the partner pipeline).
    pub async fn send_partner_email(
        &self,
        inquiry: &ValidatedPartnerInquiry,
    ) -> Result<String, MailError> {
        let subject = format!(
            "\u{1F91D} Partner Inquiry: {} ({})",
            inquiry.organization_name,
            inquiry.partner_type.label()
        );
        let html = render_partner_html(inquiry);
        self.send(&self.config.to, &subject, &html, None, Some(&inquiry.email))
            .await
    }
}

fn field_row(label: &str, value: &str) -> String {
    format!("<p><strong>{label}:</strong> {value}</p>\n")
}

fn render_contact_html(submission: &ValidatedSubmission, submitted_at: DateTime<Utc>) -> String {
    let mut html = String::new();
    html.push_str("<h2>New Contact Form Submission</h2>\n");
    html.push_str(&format!(
        "<p>{} {}</p>\n",
        submission.topic.emoji(),
        submission.topic.label()
    ));
    html.push_str(&field_row("Name", &submission.name));
    if let Some(role) = &submission.role {
        html.push_str(&field_row("Role", role));
    }
    html.push_str(&field_row("Company", &submission.company));
    html.push_str(&field_row(
        "Email",
        &format!("<a href=\"mailto:{0}\">{0}</a>", submission.email),
    ));
    if let Some(phone) = &submission.phone {
        html.push_str(&field_row(
            "Phone",
            &format!("<a href=\"tel:{0}\">{0}</a>", phone),
        ));
    }
    if let Some(jurisdiction) = &submission.jurisdiction {
        html.push_str(&field_row("Jurisdiction", jurisdiction));
    }
    html.push_str("<p><strong>Message:</strong></p>\n");
    html.push_str(&format!(
        "<blockquote style=\"white-space: pre-wrap;\">{}</blockquote>\n",
        submission.message
    ));
    html.push_str("<hr>\n");
    html.push_str(&format!(
        "<p>Submitted: {}<br>Priority: {}</p>\n",
        submitted_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        submission.topic.priority_label()
    ));
    html
}

fn render_contact_text(submission: &ValidatedSubmission, submitted_at: DateTime<Utc>) -> String {
    let mut text = String::new();
    text.push_str("New Contact Form Submission\n");
    text.push_str(submission.topic.label());
    text.push_str("\n\n");
    text.push_str(&format!("Name: {}\n", submission.name));
    if let Some(role) = &submission.role {
        text.push_str(&format!("Role: {role}\n"));
    }
    text.push_str(&format!("Company: {}\n", submission.company));
    text.push_str(&format!("Email: {}\n", submission.email));
    if let Some(phone) = &submission.phone {
        text.push_str(&format!("Phone: {phone}\n"));
    }
    if let Some(jurisdiction) = &submission.jurisdiction {
        text.push_str(&format!("Jurisdiction: {jurisdiction}\n"));
    }
    text.push_str(&format!("\nMessage:\n{}\n", submission.message));
    text.push_str("\n---\n");
    text.push_str(&format!(
        "Submitted: {}\n",
        submitted_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    text.push_str(&format!("Priority: {}\n", submission.topic.priority_label()));
    text
}

fn render_confirmation_html(name: &str, topic: Topic, contact: &ContactInfo) -> String {
    let mut html = String::new();
    html.push_str(&format!("<h1>{}</h1>\n", contact.firm_name));
    html.push_str(&format!("<p>Dear {name},</p>\n"));
    html.push_str(&format!(
        "<p>Thank you for contacting {}. We have received your inquiry and will \
         respond within <strong>1 business day</strong>.</p>\n",
        contact.firm_name
    ));
    if topic.is_high_priority() {
        html.push_str(&format!(
            "<p><strong>\u{26A0}\u{FE0F} CYBER INCIDENT IN PROGRESS?</strong><br>\
             Call our 24/7 Incident Hotline for immediate assistance: \
             <strong>{}</strong><br>Response within 30 minutes, 24/7/365</p>\n",
            contact.hotline
        ));
    }
    html.push_str("<p>In the meantime, you may find these resources helpful:</p>\n<ul>\n");
    html.push_str(&format!(
        "<li><a href=\"{0}/services\">Our Services</a></li>\n\
         <li><a href=\"{0}/cybersecurity\">EU Cyber Regulations Overview</a></li>\n\
         <li><a href=\"{0}/about\">About {1}</a></li>\n</ul>\n",
        contact.site_url, contact.firm_name
    ));
    html.push_str("<hr>\n");
    html.push_str(&format!(
        "<p><strong>{}</strong><br>Email: <a href=\"mailto:{1}\">{1}</a><br>\
         Phone: {2}<br>24/7 Hotline: {2}</p>\n",
        contact.firm_name, contact.fallback_email, contact.hotline
    ));
    html.push_str(
        "<p>This is an automated confirmation. Please do not reply to this email. \
         We will respond to your inquiry from a personal email address.</p>\n",
    );
    html
}

fn render_partner_html(inquiry: &ValidatedPartnerInquiry) -> String {
    let mut html = String::new();
    html.push_str("<h2>New Partner Inquiry</h2>\n");
    html.push_str(&format!("<p>{}</p>\n", inquiry.partner_type.label()));
    html.push_str(&field_row("Organization", &inquiry.organization_name));
    html.push_str(&field_row("Contact Name", &inquiry.contact_name));
    html.push_str(&field_row(
        "Email",
        &format!("<a href=\"mailto:{0}\">{0}</a>", inquiry.email),
    ));
    if let Some(phone) = &inquiry.phone {
        html.push_str(&field_row(
            "Phone",
            &format!("<a href=\"tel:{0}\">{0}</a>", phone),
        ));
    }
    if let Some(website) = &inquiry.website {
        html.push_str(&field_row(
            "Website",
            &format!("<a href=\"{0}\">{0}</a>", website),
        ));
    }
    html.push_str(&field_row("Partner Type", inquiry.partner_type.label()));
    html.push_str("<p><strong>Regions:</strong></p>\n");
    html.push_str(&format!(
        "<blockquote style=\"white-space: pre-wrap;\">{}</blockquote>\n",
        inquiry.regions
    ));
    html.push_str("<p><strong>Capabilities:</strong></p>\n");
    html.push_str(&format!(
        "<blockquote style=\"white-space: pre-wrap;\">{}</blockquote>\n",
        inquiry.capabilities
    ));
    if let Some(message) = &inquiry.message {
        html.push_str("<p><strong>Additional Message:</strong></p>\n");
        html.push_str(&format!(
            "<blockquote style=\"white-space: pre-wrap;\">{}</blockquote>\n",
            message
        ));
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(topic: Topic) -> ValidatedSubmission {
        ValidatedSubmission {
            name: "Ana Ionescu".to_string(),
            company: "Acme Logistics".to_string(),
            email: "ana@acme.example".to_string(),
            message: "We suspect unauthorized access to our fleet portal.".to_string(),
            topic,
            phone: Some("+40 700 000 000".to_string()),
            role: None,
            jurisdiction: Some("Romania".to_string()),
        }
    }

    #[test]
    fn test_contact_text_includes_all_fields() {
        let text = render_contact_text(&submission(Topic::Incident), Utc::now());
        assert!(text.contains("Name: Ana Ionescu"));
        assert!(text.contains("Company: Acme Logistics"));
        assert!(text.contains("Email: ana@acme.example"));
        assert!(text.contains("Phone: +40 700 000 000"));
        assert!(text.contains("Jurisdiction: Romania"));
        assert!(text.contains("Priority: HIGH - Incident Response"));
        assert!(!text.contains("Role:"), "absent fields are omitted");
    }

    #[test]
    fn test_contact_html_priority_marker() {
        let html = render_contact_html(&submission(Topic::Compliance), Utc::now());
        assert!(html.contains("Priority: Normal"));
        assert!(html.contains("mailto:ana@acme.example"));
    }

    #[test]
    fn test_confirmation_hotline_only_for_incidents() {
        let contact = ContactInfo::default();
        let incident = render_confirmation_html("Ana", Topic::Incident, &contact);
        assert!(incident.contains(&contact.hotline));
        assert!(incident.contains("CYBER INCIDENT IN PROGRESS?"));

        let routine = render_confirmation_html("Ana", Topic::Contracts, &contact);
        assert!(!routine.contains("CYBER INCIDENT IN PROGRESS?"));
    }

    #[test]
    fn test_not_configured_send_fails() {
        let mailer = Mailer::new(MailConfig::default(), ContactInfo::default());
        let result = tokio_test::block_on(
            mailer.send_contact_email(&submission(Topic::Other), Utc::now()),
        );
        assert!(matches!(result, Err(MailError::NotConfigured)));
    }

    #[test]
    fn test_partner_html_conditional_fields() {
        let inquiry = ValidatedPartnerInquiry {
            organization_name: "Shield Forensics".to_string(),
            contact_name: "Radu Pop".to_string(),
            email: "radu@shield.example".to_string(),
            phone: None,
            partner_type: crate::models::PartnerType::Forensics,
            regions: "Romania, Bulgaria".to_string(),
            capabilities: "Disk and memory forensics, incident triage.".to_string(),
            website: Some("https://shield.example".to_string()),
            message: None,
        };
        let html = render_partner_html(&inquiry);
        assert!(html.contains("Shield Forensics"));
        assert!(html.contains("https://shield.example"));
        assert!(!html.contains("Phone:"));
        assert!(!html.contains("Additional Message:"));
    }
}
