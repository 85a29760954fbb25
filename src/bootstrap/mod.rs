//! Composition root: configuration, logging and dependency wiring.

pub mod config;
pub mod init;
pub mod tracing;
pub mod wiring;

pub use config::load_config;
pub use init::{configured_language, configured_log_dir, resolve_config};
pub use self::tracing::init_tracing_subscriber;
pub use wiring::{wire_dependencies, WiringError, WiringResult};
