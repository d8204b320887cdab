// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission validators.
//!
//! Validation is wholesale: every rule is checked and all violations are
//! returned together, keyed by field, so the form can show each problem at
//! once. Empty optional fields are normalized to `None`.

use crate::models::{
    ContactSubmission, PartnerInquiry, PartnerType, Topic, ValidatedPartnerInquiry,
    ValidatedSubmission,
};
use email_address::EmailAddress;
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// Field-keyed validation errors, collected wholesale.
#[derive(Debug, Clone, Default, Error)]
#[error("validation failed on {} field(s)", .errors.len())]
pub struct FieldErrors {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }
}

/// Validate a raw contact submission.
pub fn validate_contact(raw: &ContactSubmission) -> Result<ValidatedSubmission, FieldErrors> {
    let mut errors = FieldErrors::default();

    check_bounded(&mut errors, "name", "Name", &raw.name, 2, 100);
    check_bounded(&mut errors, "company", "Company", &raw.company, 2, 100);
    check_email(&mut errors, &raw.email);
    check_bounded(&mut errors, "message", "Message", &raw.message, 10, 5000);
    check_optional_max(&mut errors, "phone", "Phone number", raw.phone.as_deref(), 50);
    check_optional_max(&mut errors, "role", "Role", raw.role.as_deref(), 100);
    check_optional_max(
        &mut errors,
        "jurisdiction",
        "Jurisdiction",
        raw.jurisdiction.as_deref(),
        100,
    );

    // Unrecognized topics are rejected, not coerced; absence means "other".
    let topic = match raw.topic.as_deref() {
        None => Topic::Other,
        Some(value) => Topic::parse(value).unwrap_or_else(|| {
            errors.push("topic", "Please select a valid inquiry topic");
            Topic::Other
        }),
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedSubmission {
        name: raw.name.clone(),
        company: raw.company.clone(),
        email: raw.email.clone(),
        message: raw.message.clone(),
        topic,
        phone: non_empty(raw.phone.as_deref()),
        role: non_empty(raw.role.as_deref()),
        jurisdiction: non_empty(raw.jurisdiction.as_deref()),
    })
}

/// Validate a raw partner inquiry.
pub fn validate_partner(raw: &PartnerInquiry) -> Result<ValidatedPartnerInquiry, FieldErrors> {
    let mut errors = FieldErrors::default();

    check_bounded(
        &mut errors,
        "organizationName",
        "Organization name",
        &raw.organization_name,
        2,
        200,
    );
    check_bounded(&mut errors, "contactName", "Contact name", &raw.contact_name, 2, 100);
    check_email(&mut errors, &raw.email);
    check_optional_max(&mut errors, "phone", "Phone number", raw.phone.as_deref(), 50);

    let partner_type = match raw.partner_type.as_deref() {
        None => {
            errors.push("partnerType", "Please select a partner type");
            PartnerType::Other
        }
        Some(value) => PartnerType::parse(value).unwrap_or_else(|| {
            errors.push("partnerType", "Please select a valid partner type");
            PartnerType::Other
        }),
    };

    if raw.regions.chars().count() < 2 {
        errors.push("regions", "Please specify regions of operation");
    } else if raw.regions.chars().count() > 500 {
        errors.push("regions", "Regions must be less than 500 characters");
    }

    if raw.capabilities.chars().count() < 10 {
        errors.push("capabilities", "Please describe your capabilities");
    } else if raw.capabilities.chars().count() > 2000 {
        errors.push("capabilities", "Capabilities must be less than 2000 characters");
    }

    if let Some(site) = raw.website.as_deref().filter(|s| !s.is_empty()) {
        if Url::parse(site).is_err() {
            errors.push("website", "Please enter a valid URL");
        }
    }

    check_optional_max(&mut errors, "message", "Message", raw.message.as_deref(), 3000);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedPartnerInquiry {
        organization_name: raw.organization_name.clone(),
        contact_name: raw.contact_name.clone(),
        email: raw.email.clone(),
        phone: non_empty(raw.phone.as_deref()),
        partner_type,
        regions: raw.regions.clone(),
        capabilities: raw.capabilities.clone(),
        website: non_empty(raw.website.as_deref()),
        message: non_empty(raw.message.as_deref()),
    })
}

fn check_bounded(
    errors: &mut FieldErrors,
    field: &'static str,
    label: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min {
        errors.push(field, format!("{label} must be at least {min} characters"));
    } else if len > max {
        errors.push(field, format!("{label} must be less than {max} characters"));
    }
}

fn check_email(errors: &mut FieldErrors, value: &str) {
    if !EmailAddress::is_valid(value) {
        errors.push("email", "Please enter a valid email address");
    }
    if value.chars().count() > 255 {
        errors.push("email", "Email must be less than 255 characters");
    }
}

fn check_optional_max(
    errors: &mut FieldErrors,
    field: &'static str,
    label: &str,
    value: Option<&str>,
    max: usize,
) {
    if let Some(value) = value {
        if value.chars().count() > max {
            errors.push(field, format!("{label} must be less than {max} characters"));
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_submission() -> ContactSubmission {
        ContactSubmission {
            name: "Ana Ionescu".to_string(),
            company: "Acme Logistics".to_string(),
            email: "ana@acme.example".to_string(),
            message: "We suspect unauthorized access to our fleet portal.".to_string(),
            topic: Some("incident".to_string()),
            phone: None,
            role: None,
            jurisdiction: None,
            challenge_token: None,
        }
    }

    #[test]
    fn test_valid_submission_passes() {
        let validated = validate_contact(&valid_submission()).unwrap();
        assert_eq!(validated.topic, Topic::Incident);
        assert_eq!(validated.name, "Ana Ionescu");
    }

    #[test]
    fn test_all_violations_collected() {
        let raw = ContactSubmission {
            name: "A".to_string(),
            email: "not-an-email".to_string(),
            message: "too short".to_string(),
            ..valid_submission()
        };
        let errors = validate_contact(&raw).unwrap_err();
        assert_eq!(errors.errors.len(), 3);
        assert!(errors.errors.contains_key("name"));
        assert!(errors.errors.contains_key("email"));
        assert!(errors.errors.contains_key("message"));
    }

    #[test]
    fn test_message_bounds() {
        let raw = ContactSubmission {
            message: "x".repeat(9),
            ..valid_submission()
        };
        let errors = validate_contact(&raw).unwrap_err();
        assert_eq!(
            errors.errors["message"],
            vec!["Message must be at least 10 characters".to_string()]
        );

        let raw = ContactSubmission {
            message: "x".repeat(5001),
            ..valid_submission()
        };
        let errors = validate_contact(&raw).unwrap_err();
        assert_eq!(
            errors.errors["message"],
            vec!["Message must be less than 5000 characters".to_string()]
        );

        let raw = ContactSubmission {
            message: "x".repeat(5000),
            ..valid_submission()
        };
        assert!(validate_contact(&raw).is_ok());
    }

    #[test]
    fn test_unrecognized_topic_rejected() {
        let raw = ContactSubmission {
            topic: Some("urgent".to_string()),
            ..valid_submission()
        };
        let errors = validate_contact(&raw).unwrap_err();
        assert!(errors.errors.contains_key("topic"));
    }

    #[test]
    fn test_missing_topic_normalizes_to_other() {
        let raw = ContactSubmission {
            topic: None,
            ..valid_submission()
        };
        let validated = validate_contact(&raw).unwrap();
        assert_eq!(validated.topic, Topic::Other);
    }

    #[test]
    fn test_empty_optional_fields_become_none() {
        let raw = ContactSubmission {
            phone: Some(String::new()),
            role: Some("  ".to_string()),
            ..valid_submission()
        };
        let validated = validate_contact(&raw).unwrap();
        assert!(validated.phone.is_none());
        assert!(validated.role.is_none());
    }

    #[test]
    fn test_optional_upper_bounds() {
        let raw = ContactSubmission {
            phone: Some("1".repeat(51)),
            ..valid_submission()
        };
        let errors = validate_contact(&raw).unwrap_err();
        assert_eq!(
            errors.errors["phone"],
            vec!["Phone number must be less than 50 characters".to_string()]
        );
    }

    #[test]
    fn test_email_rules() {
        for bad in ["", "plain", "missing@tld@twice", "@example.com"] {
            let raw = ContactSubmission {
                email: bad.to_string(),
                ..valid_submission()
            };
            let errors = validate_contact(&raw).unwrap_err();
            assert!(errors.errors.contains_key("email"), "{bad:?} should fail");
        }

        let raw = ContactSubmission {
            email: format!("{}@example.com", "a".repeat(250)),
            ..valid_submission()
        };
        let errors = validate_contact(&raw).unwrap_err();
        assert!(errors.errors["email"]
            .iter()
            .any(|m| m.contains("less than 255")));
    }

    fn valid_partner() -> PartnerInquiry {
        PartnerInquiry {
            organization_name: "Shield Forensics".to_string(),
            contact_name: "Radu Pop".to_string(),
            email: "radu@shield.example".to_string(),
            phone: None,
            partner_type: Some("forensics".to_string()),
            regions: "Romania, Bulgaria".to_string(),
            capabilities: "Disk and memory forensics, incident triage.".to_string(),
            website: None,
            message: None,
        }
    }

    #[test]
    fn test_valid_partner_passes() {
        let validated = validate_partner(&valid_partner()).unwrap();
        assert_eq!(validated.partner_type, PartnerType::Forensics);
    }

    #[test]
    fn test_partner_type_required() {
        let raw = PartnerInquiry {
            partner_type: None,
            ..valid_partner()
        };
        let errors = validate_partner(&raw).unwrap_err();
        assert!(errors.errors.contains_key("partnerType"));
    }

    #[test]
    fn test_partner_website_checked_when_present() {
        let raw = PartnerInquiry {
            website: Some("not a url".to_string()),
            ..valid_partner()
        };
        let errors = validate_partner(&raw).unwrap_err();
        assert_eq!(errors.errors["website"], vec!["Please enter a valid URL".to_string()]);

        let raw = PartnerInquiry {
            website: Some(String::new()),
            ..valid_partner()
        };
        assert!(validate_partner(&raw).is_ok());
    }

    #[test]
    fn test_partner_violations_collected() {
        let raw = PartnerInquiry {
            organization_name: "S".to_string(),
            regions: "R".to_string(),
            capabilities: "short".to_string(),
            ..valid_partner()
        };
        let errors = validate_partner(&raw).unwrap_err();
        assert_eq!(errors.errors.len(), 3);
    }
}
