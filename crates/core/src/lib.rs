//! # Gapi Core
//!
//! The asynchronous job engine every service client is built on.
//!
//! This crate contains:
//! - The [`Transport`] port the engine dispatches HTTP calls through
//! - [`Job`], the state machine that paces, retries and classifies requests
//! - The [`FetchJob`], [`ModifyJob`] and [`DeleteJob`] specializations
//!
//! ## Architecture Principles
//! - Only depends on `gapi-domain`
//! - No HTTP library code; transports are injected as trait objects
//! - At most one request per job is ever in flight

pub mod job;
pub mod ports;

// Re-export specific items to avoid ambiguity
pub use job::{
    build_http_request, classify, parse_error_message, BackoffExhausted, Classification, ContentType, DeleteHandler,
    DeleteJob, FetchHandler, FetchJob, Job, JobContext, JobEvent, JobHandle, JobHandler,
    JobObserver, JobState, ModifyHandler, ModifyJob, ReplyAction, Request, RequestQueue,
    RetryPacer,
};
pub use ports::{HttpMethod, HttpRequest, Reply, Transport};
