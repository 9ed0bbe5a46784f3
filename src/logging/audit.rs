//! Complaint lifecycle audit events
//!
//! Emitted through `tracing` under the `audit` target so they can be routed
//! separately from request logs (e.g. `RUST_LOG=audit=info`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::{ComplaintDoc, ComplaintStatus};

/// Audit event types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A new complaint was stored
    ComplaintFiled,
    /// A status transition was appended to a timeline
    StatusChanged,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComplaintFiled => "complaint_filed",
            Self::StatusChanged => "status_changed",
        }
    }
}

/// Audit record for one lifecycle change
///
/// Carries no personal fields (name, phone, Aadhaar) so audit logs can be
/// retained longer than the records themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    pub case_id: String,
    pub status: ComplaintStatus,
    /// Timeline length after the change
    pub timeline_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_count: Option<usize>,
}

impl AuditEvent {
    fn from_doc(event_type: EventType, doc: &ComplaintDoc) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            case_id: doc.case_id.clone(),
            status: doc.status,
            timeline_len: doc.timeline.len(),
            priority: None,
            note: None,
            evidence_count: None,
        }
    }

    /// Event for a newly filed complaint
    pub fn filed(doc: &ComplaintDoc) -> Self {
        let mut event = Self::from_doc(EventType::ComplaintFiled, doc);
        event.priority = Some(doc.priority.to_string());
        event.evidence_count = Some(doc.evidence_files.len());
        event
    }

    /// Event for a status change, taken from the updated record
    pub fn status_changed(doc: &ComplaintDoc) -> Self {
        let mut event = Self::from_doc(EventType::StatusChanged, doc);
        event.note = doc
            .latest()
            .map(|entry| entry.note.clone())
            .filter(|note| !note.is_empty());
        event
    }

    /// Convert to a single JSON line
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write the event to the `audit` log target
    ///
    /// The JSONL form rides along as `record` for sinks that archive lines.
    pub fn emit(&self) {
        let record = match self.to_jsonl() {
            Ok(line) => line,
            Err(e) => {
                warn!(target: "audit", case_id = %self.case_id, "Failed to encode audit event: {}", e);
                return;
            }
        };

        info!(
            target: "audit",
            event = self.event_type.as_str(),
            case_id = %self.case_id,
            status = %self.status,
            timeline_len = self.timeline_len,
            record = %record,
            "complaint {}",
            self.event_type.as_str()
        );
    }
}
