//! Database layer for Nyaya Kavach
//!
//! Provides MongoDB storage for complaint records.

pub mod mongo;
pub mod schemas;

pub use mongo::{MongoClient, MongoCollection};
pub use schemas::{ComplaintDoc, ComplaintStatus, NewComplaint, Priority, TimelineEntry};
