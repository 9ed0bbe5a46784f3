//! Configuration for the complaint service
//!
//! CLI arguments and environment variable handling using clap. Variables
//! from a `.env` file are loaded before parsing.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

use crate::db::schemas::COMPLAINT_COLLECTION;
use crate::types::KavachError;

/// Nyaya Kavach - citizen complaint filing and case tracking API
#[derive(Parser, Debug, Clone)]
#[command(name = "nyaya-kavach")]
#[command(about = "Citizen complaint filing and case tracking API")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// Port override (keeps the LISTEN host)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// MongoDB connection URI
    #[arg(long, env = "MONGO_URL", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "DB_NAME", default_value = "nyaya_kavach")]
    pub mongodb_db: String,

    /// Collection holding complaint records
    #[arg(long, env = "COMPLAINT_COLLECTION", default_value = COMPLAINT_COLLECTION)]
    pub collection: String,

    /// Enable development mode (in-memory store when MongoDB is unreachable)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log line format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Args {
    /// Effective listen address after applying PORT
    pub fn listen_addr(&self) -> SocketAddr {
        let mut addr = self.listen;
        if let Some(port) = self.port {
            addr.set_port(port);
        }
        addr
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), KavachError> {
        if self.mongodb_db.trim().is_empty() {
            return Err(KavachError::Config("DB_NAME must not be empty".to_string()));
        }

        if self.collection.trim().is_empty() {
            return Err(KavachError::Config(
                "COMPLAINT_COLLECTION must not be empty".to_string(),
            ));
        }

        if !self.mongodb_uri.starts_with("mongodb://") && !self.mongodb_uri.starts_with("mongodb+srv://") {
            return Err(KavachError::Config(
                "MONGO_URL must start with mongodb:// or mongodb+srv://".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(KavachError::Config(format!(
                "LOG_LEVEL must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}
