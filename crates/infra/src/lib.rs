//! # Gapi Infrastructure
//!
//! Concrete adapters around the job engine.
//!
//! This crate contains:
//! - The reqwest-backed [`HttpClient`] transport
//! - Configuration loading from files and the environment
//! - Tracing subscriber setup
//! - Service clients (Tasks, Calendar, Drive, account info)
//!
//! ## Architecture
//! - Implements the [`gapi_core::Transport`] port
//! - Depends on `gapi-domain` and `gapi-core`
//! - Contains all I/O

pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod services;

// Re-export commonly used items
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_tracing, init_tracing_json};
pub use services::{
    AccountInfoService, CalendarService, DriveService, ServiceContext, Services, TasksService,
};
