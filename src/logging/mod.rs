//! Logging infrastructure for Nyaya Kavach
//!
//! Subscriber setup for the binaries and structured audit events for the
//! complaint lifecycle.

pub mod audit;

pub use audit::{AuditEvent, EventType};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `<crate>=<level>,info`.
pub fn init(crate_name: &str, level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{}={},info", crate_name, level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
