// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Domain types for contact-form and partner-inquiry submissions.

use serde::{Deserialize, Serialize};

/// Inquiry category selected on the contact form.
///
/// This is a closed set: the validator rejects unrecognized values rather
/// than coercing them. A missing topic normalizes to [`Topic::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Incident,
    Compliance,
    Contracts,
    Disputes,
    Forensics,
    Readiness,
    Partnership,
    Other,
}

impl Topic {
    /// Parse a form value. Returns `None` for anything outside the set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "incident" => Some(Self::Incident),
            "compliance" => Some(Self::Compliance),
            "contracts" => Some(Self::Contracts),
            "disputes" => Some(Self::Disputes),
            "forensics" => Some(Self::Forensics),
            "readiness" => Some(Self::Readiness),
            "partnership" => Some(Self::Partnership),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incident => "incident",
            Self::Compliance => "compliance",
            Self::Contracts => "contracts",
            Self::Disputes => "disputes",
            Self::Forensics => "forensics",
            Self::Readiness => "readiness",
            Self::Partnership => "partnership",
            Self::Other => "other",
        }
    }

    /// Human label used in email subjects and chat notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Incident => "Incident Response",
            Self::Compliance => "Compliance",
            Self::Contracts => "Contracts",
            Self::Disputes => "Disputes",
            Self::Forensics => "Forensics",
            Self::Readiness => "Readiness Assessment",
            Self::Partnership => "Partnership",
            Self::Other => "General Inquiry",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Incident => "\u{1F6A8}",
            Self::Compliance => "\u{2713}",
            Self::Contracts => "\u{1F4C4}",
            Self::Disputes => "\u{2696}\u{FE0F}",
            Self::Forensics => "\u{1F50D}",
            Self::Readiness => "\u{1F6E1}\u{FE0F}",
            Self::Partnership => "\u{1F91D}",
            Self::Other => "\u{1F4AC}",
        }
    }

    /// Incident submissions are flagged high priority in every channel.
    pub fn is_high_priority(&self) -> bool {
        matches!(self, Self::Incident)
    }

    /// Priority marker for notification footers.
    pub fn priority_label(&self) -> &'static str {
        if self.is_high_priority() {
            "HIGH - Incident Response"
        } else {
            "Normal"
        }
    }
}

/// Raw contact-form payload as posted by the site.
///
/// Immutable once received; discarded at the end of the request. Topic and
/// challenge token arrive as free strings and are interpreted during
/// validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub challenge_token: Option<String>,
}

/// Contact submission that passed validation.
///
/// Field constraints are guaranteed to hold; empty optional fields are
/// normalized to `None` and the topic to the closed enumeration.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub name: String,
    pub company: String,
    pub email: String,
    pub message: String,
    pub topic: Topic,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub jurisdiction: Option<String>,
}

/// Partner organization category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerType {
    Mssp,
    Forensics,
    Insurance,
    Other,
}

impl PartnerType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "mssp" => Some(Self::Mssp),
            "forensics" => Some(Self::Forensics),
            "insurance" => Some(Self::Insurance),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Mssp => "MSSP",
            Self::Forensics => "Forensics Firm",
            Self::Insurance => "Insurance Carrier/Broker",
            Self::Other => "Other",
        }
    }
}

/// Raw partner-inquiry payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerInquiry {
    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub partner_type: Option<String>,
    #[serde(default)]
    pub regions: String,
    #[serde(default)]
    pub capabilities: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Partner inquiry that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedPartnerInquiry {
    pub organization_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub partner_type: PartnerType,
    pub regions: String,
    pub capabilities: String,
    pub website: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_closed_set() {
        assert_eq!(Topic::parse("incident"), Some(Topic::Incident));
        assert_eq!(Topic::parse("readiness"), Some(Topic::Readiness));
        assert_eq!(Topic::parse("Incident"), None);
        assert_eq!(Topic::parse("spam"), None);
        assert_eq!(Topic::parse(""), None);
    }

    #[test]
    fn test_topic_priority() {
        assert!(Topic::Incident.is_high_priority());
        assert!(!Topic::Compliance.is_high_priority());
        assert_eq!(Topic::Incident.priority_label(), "HIGH - Incident Response");
        assert_eq!(Topic::Other.priority_label(), "Normal");
    }

    #[test]
    fn test_submission_field_names() {
        let raw: ContactSubmission = serde_json::from_str(
            r#"{"name":"Ana","company":"Acme","email":"ana@acme.example",
                "message":"We need help with a contract review.",
                "topic":"contracts","challengeToken":"tok_1"}"#,
        )
        .unwrap();
        assert_eq!(raw.topic.as_deref(), Some("contracts"));
        assert_eq!(raw.challenge_token.as_deref(), Some("tok_1"));
        assert!(raw.phone.is_none());
    }

    #[test]
    fn test_partner_type_labels() {
        assert_eq!(PartnerType::parse("insurance"), Some(PartnerType::Insurance));
        assert_eq!(PartnerType::parse("MSSP"), None);
        assert_eq!(PartnerType::Insurance.label(), "Insurance Carrier/Broker");
    }
}
