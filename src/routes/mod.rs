//! HTTP routes for the complaint API

pub mod chatbot;
pub mod complaints;
pub mod health;
pub mod response;

pub use chatbot::handle_chatbot;
pub use complaints::{
    handle_append_status, handle_create, handle_track, handle_update_status, TrackQuery,
};
pub use health::{health_check, readiness_check, root_banner, version_info};
