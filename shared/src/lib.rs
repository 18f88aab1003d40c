//! Shared library for the receipt scanner
//!
//! Common functionality used by the scanner crates:
//! - Error taxonomy
//! - Environment configuration
//! - HTTP service communication

pub mod config;
pub mod error;
pub mod service_client;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use service_client::ServiceClient;
