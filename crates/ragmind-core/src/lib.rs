//! # ragmind-core
//!
//! Core types, configuration, and utilities for ragmind.
//!
//! This crate provides shared functionality used across all ragmind crates:
//!
//! - **Configuration**: Loading, validation, and persistence of the JSON5 config file
//! - **Types**: User profiles, memory items, and conversation turns
//! - **Utilities**: Path resolution, ID generation, secrets, and environment handling

pub mod config;
pub mod types;
pub mod error;
pub mod paths;
pub mod env;
pub mod id;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
pub use secret::SecretString;
