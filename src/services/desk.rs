//! Complaint desk: the store API's operations
//!
//! Wraps a `ComplaintStore` with the rules that sit above storage: intake
//! validation, not-found mapping and audit events.

use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{ComplaintDoc, ComplaintStatus, NewComplaint, TimelineEntry};
use crate::logging::AuditEvent;
use crate::services::intake::prepare_complaint;
use crate::store::{CaseLookup, ComplaintStore};
use crate::types::{KavachError, Result};

/// Message returned when no record matches
pub const NOT_FOUND_MESSAGE: &str = "Complaint not found";

#[derive(Clone)]
pub struct ComplaintDesk {
    store: Arc<dyn ComplaintStore>,
}

impl ComplaintDesk {
    pub fn new(store: Arc<dyn ComplaintStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ComplaintStore> {
        &self.store
    }

    /// File a complaint and return its stored record
    pub async fn create_complaint(&self, submission: NewComplaint) -> Result<ComplaintDoc> {
        let doc = prepare_complaint(submission)?;
        self.store.insert(&doc).await?;

        info!(case_id = %doc.case_id, priority = %doc.priority, "Complaint filed");
        AuditEvent::filed(&doc).emit();

        Ok(doc)
    }

    /// Find a complaint by case id, Aadhaar number or phone
    pub async fn find_complaint(&self, lookup: &CaseLookup) -> Result<ComplaintDoc> {
        if lookup.value().trim().is_empty() {
            return Err(KavachError::BadRequest(format!(
                "{} must not be empty",
                lookup.field()
            )));
        }

        self.store
            .find(lookup)
            .await?
            .ok_or_else(|| KavachError::NotFound(NOT_FOUND_MESSAGE.to_string()))
    }

    /// Set a new status and append it to the timeline in one update
    pub async fn append_status(
        &self,
        case_id: &str,
        status: ComplaintStatus,
        note: Option<String>,
    ) -> Result<ComplaintDoc> {
        let entry = TimelineEntry::new(status, note.unwrap_or_default());

        match self.store.append_status(case_id, &entry).await? {
            Some(doc) => {
                info!(case_id = %case_id, status = %status, "Complaint status updated");
                AuditEvent::status_changed(&doc).emit();
                Ok(doc)
            }
            None => {
                warn!(case_id = %case_id, "Status update for unknown case");
                Err(KavachError::NotFound(NOT_FOUND_MESSAGE.to_string()))
            }
        }
    }
}
