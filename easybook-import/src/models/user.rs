//! Internal user schema for imported customers

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Annual Maintenance Contract membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmcStatus {
    Active,
    Expired,
    Pending,
    Inactive,
}

/// Schema violations for a transformed record
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("First name is required")]
    MissingFirstName,

    #[error("Last name is required")]
    MissingLastName,

    #[error("Email is required")]
    MissingEmail,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
}

/// Record assembled from an external customer, not yet validated
#[derive(Debug, Clone, Default)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub service_report: Option<String>,
    pub amc_status: Option<AmcStatus>,
}

/// Validated user record posted to the internal import endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_report: Option<String>,
    pub amc_status: AmcStatus,
}

/// Email has the `local@domain.tld` shape with no whitespace
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

impl ImportedUser {
    /// Validate a draft against the user schema
    ///
    /// Names and email are trimmed before checking. A missing AMC status
    /// defaults to `inactive`.
    pub fn validate(draft: UserDraft) -> Result<Self, ValidationError> {
        let first_name = draft.first_name.trim().to_string();
        if first_name.is_empty() {
            return Err(ValidationError::MissingFirstName);
        }

        let last_name = draft.last_name.trim().to_string();
        if last_name.is_empty() {
            return Err(ValidationError::MissingLastName);
        }

        let email = draft.email.trim().to_string();
        if email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail(email));
        }

        Ok(Self {
            first_name,
            last_name,
            email,
            phone: non_blank(draft.phone),
            address: non_blank(draft.address),
            service_report: draft.service_report,
            amc_status: draft.amc_status.unwrap_or(AmcStatus::Inactive),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> UserDraft {
        UserDraft {
            first_name: "Siti".to_string(),
            last_name: "Rahman".to_string(),
            email: "siti@example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_draft() {
        let user = ImportedUser::validate(UserDraft {
            phone: Some("  ".to_string()),
            address: Some(" 1 Jurong West ".to_string()),
            ..draft()
        })
        .unwrap();

        assert_eq!(user.amc_status, AmcStatus::Inactive);
        assert_eq!(user.phone, None);
        assert_eq!(user.address.as_deref(), Some("1 Jurong West"));
    }

    #[test]
    fn test_required_fields() {
        let err = ImportedUser::validate(UserDraft {
            first_name: " ".to_string(),
            ..draft()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingFirstName);

        let err = ImportedUser::validate(UserDraft {
            last_name: String::new(),
            ..draft()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingLastName);

        let err = ImportedUser::validate(UserDraft {
            email: String::new(),
            ..draft()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingEmail);
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("a.b@mail.example.sg"));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("two words@example.com"));

        let err = ImportedUser::validate(UserDraft {
            email: "broken@".to_string(),
            ..draft()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::InvalidEmail("broken@".to_string()));
    }

    #[test]
    fn test_amc_status_enum() {
        assert_eq!(
            serde_json::to_value(AmcStatus::Expired).unwrap(),
            serde_json::json!("expired")
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let user = ImportedUser::validate(UserDraft {
            service_report: Some("Gas top-up".to_string()),
            amc_status: Some(AmcStatus::Active),
            ..draft()
        })
        .unwrap();

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["firstName"], "Siti");
        assert_eq!(json["serviceReport"], "Gas top-up");
        assert_eq!(json["amcStatus"], "active");
        assert!(json.get("phone").is_none());
    }
}
