//! Complaint document schema
//!
//! A complaint is filed once, looked up by case id, phone or Aadhaar number,
//! and moves through statuses by appending to its timeline. Records are never
//! deleted.

use bson::{doc, Document};
use chrono::{DateTime, NaiveDate, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::mongo::IntoIndexes;

/// Collection name for complaints
pub const COMPLAINT_COLLECTION: &str = "complaints";

/// Note recorded on the first timeline entry
pub const FILED_NOTE: &str = "Complaint filed";

/// Severity of a complaint
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

/// Case status
///
/// Any status may follow any other; the timeline is the only ordering.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum ComplaintStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "inprogress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!(
                "unknown status '{}' (expected Pending, In Progress, Resolved or Rejected)",
                s.trim()
            )),
        }
    }
}

impl TryFrom<String> for ComplaintStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ComplaintStatus> for String {
    fn from(status: ComplaintStatus) -> Self {
        status.as_str().to_string()
    }
}

/// One status transition in a complaint's history
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TimelineEntry {
    pub status: ComplaintStatus,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub note: String,
}

impl TimelineEntry {
    pub fn new(status: ComplaintStatus, note: impl Into<String>) -> Self {
        Self {
            status,
            date: Utc::now(),
            note: note.into(),
        }
    }
}

/// Complaint fields supplied by the citizen
///
/// Browser forms send empty strings for untouched inputs, so `priority` and
/// `incidentDate` treat `""` as absent.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewComplaint {
    #[serde(default)]
    pub aadhar_number: String,
    #[serde(default)]
    pub complaint_type: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Priority>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub incident_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub witnesses: String,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub sms_updates: bool,
    #[serde(default)]
    pub email_updates: bool,
    #[serde(default)]
    pub evidence_files: Vec<String>,
}

impl NewComplaint {
    /// Trim surrounding whitespace from every free-text field
    pub fn trimmed(mut self) -> Self {
        for field in [
            &mut self.aadhar_number,
            &mut self.complaint_type,
            &mut self.location,
            &mut self.description,
            &mut self.full_name,
            &mut self.phone,
            &mut self.email,
            &mut self.address,
            &mut self.witnesses,
        ] {
            let trimmed = field.trim();
            if trimmed.len() != field.len() {
                *field = trimmed.to_string();
            }
        }
        self
    }
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Complaint document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDoc {
    /// Public case identifier, unique and immutable
    pub case_id: String,

    #[serde(default)]
    pub aadhar_number: String,
    #[serde(default)]
    pub complaint_type: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub witnesses: String,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub sms_updates: bool,
    #[serde(default)]
    pub email_updates: bool,
    /// File names only; no evidence bytes are stored
    #[serde(default)]
    pub evidence_files: Vec<String>,

    /// Current status, always equal to the last timeline entry's status
    #[serde(default)]
    pub status: ComplaintStatus,
    /// Append-only status history
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ComplaintDoc {
    /// Build a freshly filed complaint: `Pending`, one timeline entry
    pub fn file(case_id: String, fields: NewComplaint, priority: Priority) -> Self {
        let filed = TimelineEntry::new(ComplaintStatus::Pending, FILED_NOTE);
        let now = filed.date;

        Self {
            case_id,
            aadhar_number: fields.aadhar_number,
            complaint_type: fields.complaint_type,
            priority,
            incident_date: fields.incident_date,
            location: fields.location,
            description: fields.description,
            full_name: fields.full_name,
            phone: fields.phone,
            email: fields.email,
            address: fields.address,
            witnesses: fields.witnesses,
            anonymous: fields.anonymous,
            sms_updates: fields.sms_updates,
            email_updates: fields.email_updates,
            evidence_files: fields.evidence_files,
            status: ComplaintStatus::Pending,
            timeline: vec![filed],
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a status transition
    pub fn push_status(&mut self, entry: TimelineEntry) {
        self.status = entry.status;
        self.updated_at = entry.date;
        self.timeline.push(entry);
    }

    /// Most recent timeline entry
    pub fn latest(&self) -> Option<&TimelineEntry> {
        self.timeline.last()
    }
}

impl IntoIndexes for ComplaintDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on caseId
            (
                doc! { "caseId": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("case_id_unique".to_string())
                        .build(),
                ),
            ),
            // Phone lookups from the tracking page
            (
                doc! { "phone": 1 },
                Some(
                    IndexOptions::builder()
                        .name("phone_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "aadharNumber": 1 },
                Some(
                    IndexOptions::builder()
                        .name("aadhar_number_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}
