//! Job dispatch engine

pub mod classifier;
pub mod delete;
pub mod engine;
pub mod fetch;
pub mod handler;
pub mod modify;
pub mod pacer;
pub mod queue;
pub mod request;

pub use classifier::{classify, parse_error_message, Classification, ReplyAction};
pub use delete::{DeleteHandler, DeleteJob};
pub use engine::{Job, JobContext, JobEvent, JobHandle, JobObserver, JobState};
pub use fetch::{FetchHandler, FetchJob};
pub use handler::{build_http_request, JobHandler};
pub use modify::{ModifyHandler, ModifyJob};
pub use pacer::{BackoffExhausted, RetryPacer};
pub use queue::RequestQueue;
pub use request::{ContentType, Request};
