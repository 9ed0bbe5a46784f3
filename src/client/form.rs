//! Complaint form preparation
//!
//! Raw form input becomes a `NewComplaint` only after it passes the same
//! validation the server applies. Evidence is recorded by file name; file
//! contents never leave the machine.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use super::ClientError;
use crate::db::{NewComplaint, Priority};
use crate::services::{estimate_severity, validate_complaint};

/// Date format accepted for the incident date
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Form input as typed by the citizen
#[derive(Debug, Clone, Default)]
pub struct ComplaintForm {
    pub aadhar_number: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub complaint_type: String,
    pub location: String,
    pub description: String,
    pub witnesses: String,
    /// Chosen priority; blank means "use the suggestion"
    pub priority: Option<String>,
    /// `YYYY-MM-DD`
    pub incident_date: Option<String>,
    pub anonymous: bool,
    pub sms_updates: bool,
    pub email_updates: bool,
    pub evidence: Vec<PathBuf>,
}

impl ComplaintForm {
    /// Severity suggested from the description
    pub fn suggested_priority(&self) -> Priority {
        estimate_severity(&self.description)
    }

    /// File names of the attached evidence, in attachment order
    pub fn evidence_names(&self) -> Vec<String> {
        self.evidence
            .iter()
            .filter_map(|path| file_name(path))
            .collect()
    }

    /// Build a submission, reporting every problem at once
    pub fn into_submission(self) -> Result<NewComplaint, ClientError> {
        let mut problems = Vec::new();

        let priority = match non_blank(self.priority.as_deref()) {
            Some(raw) => match raw.parse::<Priority>() {
                Ok(p) => p,
                Err(e) => {
                    problems.push(e);
                    self.suggested_priority()
                }
            },
            None => self.suggested_priority(),
        };

        let incident_date = match non_blank(self.incident_date.as_deref()) {
            Some(raw) => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    problems.push("incidentDate must be a date in YYYY-MM-DD form".to_string());
                    None
                }
            },
            None => None,
        };

        let evidence_files = self.evidence_names();

        let submission = NewComplaint {
            aadhar_number: self.aadhar_number,
            complaint_type: self.complaint_type,
            priority: Some(priority),
            incident_date,
            location: self.location,
            description: self.description,
            full_name: self.full_name,
            phone: self.phone,
            email: self.email,
            address: self.address,
            witnesses: self.witnesses,
            anonymous: self.anonymous,
            sms_updates: self.sms_updates,
            email_updates: self.email_updates,
            evidence_files,
        }
        .trimmed();

        if let Err(mut found) = validate_complaint(&submission) {
            found.append(&mut problems);
            problems = found;
        }

        if problems.is_empty() {
            Ok(submission)
        } else {
            Err(ClientError::Validation(problems))
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}
