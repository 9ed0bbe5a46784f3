//! Complaint intake
//!
//! Turns a citizen submission into a stored record: validation, case id and
//! the initial `Pending` timeline entry.

use uuid::Uuid;

use crate::db::{ComplaintDoc, NewComplaint};
use crate::services::{severity::estimate_severity, validation::validate_complaint};
use crate::types::KavachError;

/// Prefix of every case identifier
pub const CASE_ID_PREFIX: &str = "CASE";

/// Generate a new case identifier
///
/// Random UUIDv4 body, so concurrent submissions cannot collide on a clock tick.
/// The unique index on `caseId` backs this up at the store.
pub fn generate_case_id() -> String {
    format!(
        "{}{}",
        CASE_ID_PREFIX,
        Uuid::new_v4().simple().to_string().to_uppercase()
    )
}

/// Validate a submission and build the record to persist
///
/// A missing priority is filled from the description's keyword severity.
pub fn prepare_complaint(submission: NewComplaint) -> Result<ComplaintDoc, KavachError> {
    let submission = submission.trimmed();
    validate_complaint(&submission).map_err(KavachError::Validation)?;

    let priority = submission
        .priority
        .unwrap_or_else(|| estimate_severity(&submission.description));

    Ok(ComplaintDoc::file(generate_case_id(), submission, priority))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ComplaintStatus, Priority};
    use std::collections::HashSet;

    fn submission() -> NewComplaint {
        NewComplaint {
            aadhar_number: " 123456789012 ".into(),
            complaint_type: "Theft".into(),
            location: "X".into(),
            description: "wallet stolen".into(),
            full_name: "A".into(),
            evidence_files: vec!["receipt.jpg".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_case_id_format() {
        let id = generate_case_id();
        assert!(id.starts_with(CASE_ID_PREFIX));
        assert_eq!(id.len(), CASE_ID_PREFIX.len() + 32);
        assert!(id[CASE_ID_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_case_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_case_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_prepare_stamps_system_fields() {
        let doc = prepare_complaint(submission()).unwrap();
        assert_eq!(doc.status, ComplaintStatus::Pending);
        assert_eq!(doc.timeline.len(), 1);
        assert_eq!(doc.aadhar_number, "123456789012");
        assert_eq!(doc.evidence_files, vec!["receipt.jpg".to_string()]);
    }

    #[test]
    fn test_prepare_keeps_supplied_priority() {
        let mut s = submission();
        s.priority = Some(Priority::Urgent);
        assert_eq!(prepare_complaint(s).unwrap().priority, Priority::Urgent);
    }

    #[test]
    fn test_prepare_estimates_missing_priority() {
        let mut s = submission();
        s.description = "wallet stolen during a robbery".into();
        assert_eq!(prepare_complaint(s).unwrap().priority, Priority::High);
    }

    #[test]
    fn test_prepare_rejects_invalid_submission() {
        let mut s = submission();
        s.aadhar_number = "12345".into();
        match prepare_complaint(s) {
            Err(KavachError::Validation(problems)) => assert_eq!(problems.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
