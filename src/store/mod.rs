//! Complaint persistence
//!
//! `ComplaintStore` is the seam between the API and the document store.
//! MongoDB backs production; the in-memory store serves development mode and
//! tests.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use std::fmt;

use crate::db::{ComplaintDoc, TimelineEntry};
use crate::types::Result;

pub use memory::MemoryComplaintStore;
pub use mongo::MongoComplaintStore;

/// Exact-match key for finding a complaint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseLookup {
    CaseId(String),
    Aadhaar(String),
    Phone(String),
}

impl CaseLookup {
    /// Document field the key matches against
    pub fn field(&self) -> &'static str {
        match self {
            Self::CaseId(_) => "caseId",
            Self::Aadhaar(_) => "aadharNumber",
            Self::Phone(_) => "phone",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::CaseId(v) | Self::Aadhaar(v) | Self::Phone(v) => v,
        }
    }

    /// Whether a stored record matches this key
    pub fn matches(&self, doc: &ComplaintDoc) -> bool {
        match self {
            Self::CaseId(v) => doc.case_id == *v,
            Self::Aadhaar(v) => doc.aadhar_number == *v,
            Self::Phone(v) => doc.phone == *v,
        }
    }
}

impl fmt::Display for CaseLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field(), self.value())
    }
}

/// Storage operations for complaint records
///
/// Implementations never delete records and never rewrite existing timeline
/// entries.
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    /// Persist a new record. Fails if the case id already exists.
    async fn insert(&self, doc: &ComplaintDoc) -> Result<()>;

    /// Find a record by exact match; the most recently filed wins when several match
    async fn find(&self, lookup: &CaseLookup) -> Result<Option<ComplaintDoc>>;

    /// Atomically set the status and append the entry to the timeline.
    /// Returns the updated record, or `None` if the case does not exist.
    async fn append_status(
        &self,
        case_id: &str,
        entry: &TimelineEntry,
    ) -> Result<Option<ComplaintDoc>>;

    /// Short backend name for health reporting
    fn backend(&self) -> &'static str;
}
