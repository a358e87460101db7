//! Shared test helpers for `gapi-core` integration tests.
//!
//! [`MockTransport`] replays a script of replies and records every request it
//! was handed, together with the (virtual) time it arrived and how many
//! requests were in flight at once. The handlers below are minimal service
//! stand-ins for driving the three job kinds.

#![allow(dead_code)]

pub mod handlers;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gapi_core::{HttpRequest, JobEvent, Reply, Transport};
use gapi_domain::{Account, GapiError, Result as DomainResult};
use tokio::sync::broadcast;
use tokio::time::Instant;
use url::Url;

pub const BASE: &str = "https://api.test/v1/";

pub fn url(path: &str) -> Url {
    Url::parse(BASE).unwrap().join(path).unwrap()
}

pub fn account() -> Arc<Account> {
    Arc::new(Account::new("user@example.com", "test-token"))
}

/// One scripted transport outcome.
#[derive(Debug, Clone)]
enum Step {
    Reply { reply: Reply, delay: Duration },
    Fail(String),
}

/// Request as seen by the transport.
#[derive(Debug, Clone)]
pub struct Sent {
    pub request: HttpRequest,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    script: VecDeque<Step>,
    sent: Vec<Sent>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Scripted in-memory transport.
///
/// Replies are handed out in order; once the script runs dry every further
/// request gets a 500.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, reply: Reply) -> Self {
        self.reply_after(Duration::ZERO, reply)
    }

    /// Reply only after `delay` of (virtual) time.
    pub fn reply_after(self, delay: Duration, reply: Reply) -> Self {
        self.inner.lock().unwrap().script.push_back(Step::Reply { reply, delay });
        self
    }

    pub fn replies(self, replies: impl IntoIterator<Item = Reply>) -> Self {
        replies.into_iter().fold(self, Self::reply)
    }

    /// Fail at the transport level, as if the connection broke.
    pub fn fail(self, message: &str) -> Self {
        self.inner.lock().unwrap().script.push_back(Step::Fail(message.to_string()));
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.inner.lock().unwrap().sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.inner.lock().unwrap().sent.len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.inner.lock().unwrap().max_in_flight
    }

    pub fn shared(&self) -> Arc<dyn Transport> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> DomainResult<Reply> {
        let step = {
            let mut inner = self.inner.lock().unwrap();
            inner.in_flight += 1;
            inner.max_in_flight = inner.max_in_flight.max(inner.in_flight);
            inner.sent.push(Sent { request, at: Instant::now() });
            inner.script.pop_front()
        };

        let result = match step {
            Some(Step::Reply { reply, delay }) => {
                tokio::time::sleep(delay).await;
                Ok(reply)
            }
            Some(Step::Fail(message)) => Err(GapiError::Network(message)),
            None => Ok(Reply::json(500, r#"{"error":{"message":"script exhausted"}}"#)),
        };

        // Give other tasks a chance to run while "on the wire"
        tokio::task::yield_now().await;
        self.inner.lock().unwrap().in_flight -= 1;
        result
    }
}

/// Everything published so far on an event receiver.
pub fn drain(rx: &mut broadcast::Receiver<JobEvent>) -> Vec<JobEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

/// `(status, code)` of every `Replied` event.
pub fn replied(events: &[JobEvent]) -> Vec<(u16, gapi_domain::ErrorCode)> {
    events
        .iter()
        .filter_map(|event| match event {
            JobEvent::Replied { status, code, .. } => Some((*status, *code)),
            _ => None,
        })
        .collect()
}

pub fn finished_count(events: &[JobEvent]) -> usize {
    events.iter().filter(|event| matches!(event, JobEvent::Finished { .. })).count()
}

/// Formatted log lines at `WARN` and above, written while the returned guard
/// is alive on the current thread.
pub fn capture_warnings() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
