//! # Codelens Shared
//!
//! Shared types, errors and configuration for Codelens.
//! Every analysis output lives here as plain serializable data.

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::*;
pub use error::*;
pub use types::*;

/// Version information for Codelens
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
