//! In-memory complaint store
//!
//! Holds records in a `DashMap` keyed by case id. Nothing survives a restart.

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use tracing::warn;

use super::{CaseLookup, ComplaintStore};
use crate::db::{ComplaintDoc, TimelineEntry};
use crate::types::{KavachError, Result};

#[derive(Default)]
pub struct MemoryComplaintStore {
    records: DashMap<String, ComplaintDoc>,
}

impl MemoryComplaintStore {
    pub fn new() -> Self {
        warn!("Complaint store running in memory-only mode (no MongoDB)");
        Self::default()
    }
}

#[cfg(test)]
impl MemoryComplaintStore {
    fn len(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl ComplaintStore for MemoryComplaintStore {
    async fn insert(&self, doc: &ComplaintDoc) -> Result<()> {
        match self.records.entry(doc.case_id.clone()) {
            Entry::Occupied(_) => Err(KavachError::Database(format!(
                "duplicate caseId {}",
                doc.case_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(doc.clone());
                Ok(())
            }
        }
    }

    async fn find(&self, lookup: &CaseLookup) -> Result<Option<ComplaintDoc>> {
        if let CaseLookup::CaseId(case_id) = lookup {
            return Ok(self.records.get(case_id).map(|r| r.value().clone()));
        }

        Ok(self
            .records
            .iter()
            .filter(|r| lookup.matches(r.value()))
            .max_by_key(|r| r.value().created_at)
            .map(|r| r.value().clone()))
    }

    async fn append_status(
        &self,
        case_id: &str,
        entry: &TimelineEntry,
    ) -> Result<Option<ComplaintDoc>> {
        Ok(self.records.get_mut(case_id).map(|mut record| {
            record.push_status(entry.clone());
            record.clone()
        }))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
