//! SafeCircle Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other SafeCircle crates:
//! - Application configuration (database, logging, location settings)
//! - Global error types covering all error categories
//! - Structured logging with tracing
//! - Platform detection utilities
//! - Common constants (storage keys, message templates, annotations)

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::{AppConfig, ConfigHandle};
pub use error::{AddPartnerError, LocationError, ScError, ScResult};
pub use logging::init_logging;
pub use platform::Platform;
