//! Database schemas for Nyaya Kavach
//!
//! Defines the MongoDB document structure for complaints.

mod complaint;

pub use complaint::{
    ComplaintDoc, ComplaintStatus, NewComplaint, Priority, TimelineEntry, COMPLAINT_COLLECTION,
    FILED_NOTE,
};
