//! Transport port
//!
//! The engine never talks to an HTTP library directly. It hands a fully
//! built [`HttpRequest`] to a [`Transport`] and gets back the raw [`Reply`]:
//! status, headers and body bytes. Implementations are shared read-only
//! between any number of concurrently running jobs.

use std::borrow::Cow;
use std::fmt;

use async_trait::async_trait;
use gapi_domain::Result;
use url::Url;

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_LOCATION: &str = "Location";
pub const HEADER_IF_MATCH: &str = "If-Match";

/// HTTP verb of an outgoing call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete HTTP call handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self { method, url, headers: Vec::new(), body: None }
    }

    /// Set a header, replacing any previous value with the same name.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn bearer_auth(self, token: &str) -> Self {
        self.with_header(HEADER_AUTHORIZATION, format!("Bearer {token}"))
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Raw response as received from the transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Numeric status. 0 means the transport could not determine one.
    pub status: u16,
    /// Raw status line (`HTTP/1.1 401 Unauthorized`) when the transport had
    /// one but failed to turn it into `status`.
    pub status_line: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, status_line: None, headers: Vec::new(), body: body.into() }
    }

    /// Convenience constructor for a JSON reply.
    pub fn json(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, body).with_header(HEADER_CONTENT_TYPE, "application/json; charset=UTF-8")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_status_line(mut self, line: impl Into<String>) -> Self {
        self.status_line = Some(line.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Redirect target, if the server sent one.
    pub fn location(&self) -> Option<&str> {
        self.header(HEADER_LOCATION)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(HEADER_CONTENT_TYPE)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Port for sending HTTP calls
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return the server's reply, whatever its status.
    ///
    /// Only failures to obtain a reply at all (connection refused, timeout,
    /// TLS) are reported as `Err`.
    async fn send(&self, request: HttpRequest) -> Result<Reply>;
}
