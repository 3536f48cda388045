//! Certificate submission and review.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{non_blank, referenced_user};
use crate::error::{Error, Result};
use crate::model::{Certificate, CertificateStatus, Issuer, Role};
use crate::session::Session;
use crate::store::RecordStore;

/// Fields of a certificate submission.
#[derive(Debug, Clone)]
pub struct NewCertificate {
    /// Certificate title.
    pub title: String,
    /// Issuing organization.
    pub organization: String,
    /// Date of issue.
    pub issue_date: NaiveDate,
    /// Online verification link.
    pub credential_url: Option<String>,
    /// Path of the uploaded scan.
    pub attachment: Option<String>,
}

/// Outcome of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Review {
    /// Accept the certificate.
    Verify,
    /// Refuse the certificate.
    Reject,
}

impl Review {
    const fn status(self) -> CertificateStatus {
        match self {
            Self::Verify => CertificateStatus::Verified,
            Self::Reject => CertificateStatus::Rejected,
        }
    }
}

/// Submit a certificate as the session's student. It starts pending.
///
/// # Errors
///
/// Returns a validation error if the session is not a stored student or the
/// title or organization is blank.
pub fn submit_certificate(
    store: &mut RecordStore,
    session: &Session,
    new: NewCertificate,
) -> Result<Certificate> {
    session.require(&[Role::Student], "submit certificates")?;
    referenced_user(store, &session.user_id, &[Role::Student], "student")?;

    let certificate = Certificate {
        id: store.allocate_id::<Certificate>(&format!("{}-CERT", session.user_id))?,
        student_id: session.user_id.clone(),
        title: new.title.trim().to_string(),
        issuer: Issuer {
            organization: new.organization.trim().to_string(),
            issue_date: new.issue_date,
            credential_url: non_blank(new.credential_url),
        },
        attachment: non_blank(new.attachment),
        status: CertificateStatus::Pending,
        reviewed_by: None,
        reviewed_at: None,
        review_note: None,
        submitted_at: Utc::now(),
    };

    store.insert(certificate.clone())?;
    info!("{} submitted certificate {}", session.user_id, certificate.id);
    Ok(certificate)
}

/// Verify or reject a pending certificate. Admins and teachers only.
///
/// # Errors
///
/// Returns a validation error if the reviewer is not staff or the
/// certificate was already reviewed, and not-found for an unknown id.
pub fn review_certificate(
    store: &mut RecordStore,
    session: &Session,
    certificate_id: &str,
    review: Review,
    note: Option<String>,
) -> Result<Certificate> {
    session.require(&[Role::Admin, Role::Teacher], "verify certificates")?;
    referenced_user(store, &session.user_id, &[Role::Admin, Role::Teacher], "reviewer")?;

    let mut certificate = store.get::<Certificate>(certificate_id)?;
    if certificate.status != CertificateStatus::Pending {
        return Err(Error::validation(format!(
            "certificate {certificate_id} is already {}",
            certificate.status
        )));
    }

    certificate.status = review.status();
    certificate.reviewed_by = Some(session.user_id.clone());
    certificate.reviewed_at = Some(Utc::now());
    certificate.review_note = non_blank(note);

    store.upsert(certificate.clone())?;
    info!("Certificate {} {} by {}", certificate_id, certificate.status, session.user_id);
    Ok(certificate)
}

/// A student's certificates.
///
/// # Errors
///
/// Returns an error if the certificates collection cannot be read.
pub fn student_certificates(store: &RecordStore, student_id: &str) -> Result<Vec<Certificate>> {
    store.list(|c: &Certificate| c.student_id == student_id)
}

/// Certificates in a review state, oldest submission first.
///
/// # Errors
///
/// Returns an error if the certificates collection cannot be read.
pub fn certificates_with_status(store: &RecordStore, status: CertificateStatus) -> Result<Vec<Certificate>> {
    let mut certificates = store.list(|c: &Certificate| c.status == status)?;
    certificates.sort_by_key(|c| c.submitted_at);
    Ok(certificates)
}
