//! Complaint domain services
//!
//! Shared by the HTTP API and the command-line client so both sides apply
//! the same rules.

pub mod chatbot;
pub mod desk;
pub mod intake;
pub mod severity;
pub mod validation;

pub use chatbot::{route_message, ChatReply};
pub use desk::ComplaintDesk;
pub use intake::{generate_case_id, prepare_complaint};
pub use severity::estimate_severity;
pub use validation::{is_valid_aadhaar, is_valid_phone, validate_complaint};
