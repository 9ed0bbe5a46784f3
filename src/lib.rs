//! Nyaya Kavach - citizen complaint filing and case tracking
//!
//! Citizens file complaints through a web form and later look them up by case
//! id, Aadhaar number or phone. Officials move a case through its statuses;
//! every change is appended to the case timeline.
//!
//! ## Components
//!
//! - **API server**: hyper HTTP service over a MongoDB complaint store
//! - **Services**: validation, severity estimate and case ids shared by server and client
//! - **Client**: typed API client, form preparation and the polling case tracker

pub mod client;
pub mod config;
pub mod db;
pub mod logging;
pub mod routes;
pub mod server;
pub mod services;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{KavachError, Result};
