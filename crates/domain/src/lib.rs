//! # Gapi Domain
//!
//! Domain types shared by the job engine and the service clients.
//!
//! This crate contains:
//! - The closed error taxonomy ([`ErrorCode`]) and the library error type
//! - The [`Account`] credential handle
//! - Configuration structures
//! - Plain service objects (events, tasks, drive files, account info)
//!
//! ## Architecture
//! - No dependencies on other gapi crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
