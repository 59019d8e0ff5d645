use std::fmt;

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

/// Membership request as received at the HTTP boundary, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipApplication {
    pub email: String,
}

impl MembershipApplication {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Applicant identity once the submitted email has been checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ApplicantEmail(String);

impl ApplicantEmail {
    pub fn parse(raw: &str) -> Result<Self, ApplicationError> {
        let candidate = raw.trim().to_string();
        if candidate.is_empty() {
            return Err(ApplicationError::MissingEmail);
        }
        if !candidate.validate_email() {
            return Err(ApplicationError::MalformedEmail(candidate));
        }
        Ok(Self(candidate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ApplicantEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicantEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejection raised before any provider lookup takes place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplicationError {
    #[error("email is required")]
    MissingEmail,
    #[error("'{0}' is not a valid email address")]
    MalformedEmail(String),
}

/// Binary outcome of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum MembershipVerdict {
    Approved,
    Denied { reason: DenialReason },
}

impl MembershipVerdict {
    pub const fn label(&self) -> &'static str {
        match self {
            MembershipVerdict::Approved => "approved",
            MembershipVerdict::Denied { .. } => "denied",
        }
    }

    pub const fn is_approved(&self) -> bool {
        matches!(self, MembershipVerdict::Approved)
    }

    pub fn summary(&self) -> String {
        match self {
            MembershipVerdict::Approved => "special membership approved".to_string(),
            MembershipVerdict::Denied { reason } => reason.summary(),
        }
    }
}

/// Why an applicant was denied, kept for adverse action notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum DenialReason {
    BelowThreshold { minimum: u16, actual: u16 },
    NoCreditHistory,
}

impl DenialReason {
    pub fn summary(&self) -> String {
        match self {
            DenialReason::BelowThreshold { minimum, actual } => {
                format!("denied: credit score {actual} is below the required {minimum}")
            }
            DenialReason::NoCreditHistory => {
                "denied: provider has no credit history for the applicant".to_string()
            }
        }
    }
}
