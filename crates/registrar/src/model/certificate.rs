//! Certificates submitted by students for verification.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::require_field;
use crate::error::Result;
use crate::store::{Collection, Record};

/// Review state of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    /// Awaiting review.
    Pending,
    /// Accepted by staff.
    Verified,
    /// Refused by staff.
    Rejected,
}

impl std::fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.pad("pending"),
            Self::Verified => f.pad("verified"),
            Self::Rejected => f.pad("rejected"),
        }
    }
}

impl std::str::FromStr for CertificateStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("{s:?} is not a valid certificate status")),
        }
    }
}

/// Who issued a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    /// Issuing organization.
    pub organization: String,
    /// Date on the certificate.
    pub issue_date: NaiveDate,
    /// Where the credential can be checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_url: Option<String>,
}

/// A certificate and its review outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Certificate id.
    pub id: String,
    /// Submitting student.
    pub student_id: String,
    /// Certificate title.
    pub title: String,
    /// Issuer details.
    pub issuer: Issuer,
    /// Path of the uploaded scan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    /// Review state.
    pub status: CertificateStatus,
    /// Staff member who reviewed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    /// When it was reviewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer's note, e.g. a rejection reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_note: Option<String>,
    /// When it was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl Record for Certificate {
    const COLLECTION: Collection = Collection::Certificates;

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<()> {
        require_field(&self.title, "certificate title")?;
        require_field(&self.issuer.organization, "issuing organization")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certificate() -> Certificate {
        Certificate {
            id: "S1-CERT1".to_string(),
            student_id: "S1".to_string(),
            title: "Rust Fundamentals".to_string(),
            issuer: Issuer {
                organization: "Open University".to_string(),
                issue_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
                credential_url: None,
            },
            attachment: None,
            status: CertificateStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_note: None,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&certificate()).unwrap();
        assert!(json.contains("\"status\":\"pending\""));
        assert!(!json.contains("reviewed_by"));
    }

    #[test]
    fn test_validate_requires_organization() {
        let mut cert = certificate();
        assert!(cert.validate().is_ok());
        cert.issuer.organization = String::new();
        assert!(cert.validate().unwrap_err().is_validation());
    }
}
