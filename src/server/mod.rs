//! HTTP server for the complaint API

pub mod http;

pub use http::{run, serve, shutdown_signal, AppState};
