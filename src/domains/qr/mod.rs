pub mod service;

// Re-export main service for easier access
pub use service::*;
