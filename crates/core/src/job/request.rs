//! Queued request description

use gapi_domain::constants::CONTENT_TYPE_JSON;
use url::Url;

use crate::ports::HttpMethod;

/// One HTTP call a job wants to make.
///
/// Immutable once built: the builder methods consume the value. The job
/// keeps the in-flight request so it can resubmit it, possibly under a new
/// URL, after throttling or a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    url: Url,
    body: Option<Vec<u8>>,
    content_type: Option<String>,
    headers: Vec<(String, String)>,
}

impl Request {
    /// Request without a body.
    pub fn new(url: Url) -> Self {
        Self { url, body: None, content_type: None, headers: Vec::new() }
    }

    /// Request carrying `body` of type `content_type`.
    pub fn with_body(url: Url, body: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self { url, body: Some(body), content_type: Some(content_type.into()), headers: Vec::new() }
    }

    /// Request carrying a JSON body.
    pub fn json(url: Url, body: Vec<u8>) -> Self {
        Self::with_body(url, body, CONTENT_TYPE_JSON)
    }

    /// Add an extra header sent alongside the call.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Method implied by the shape of the request: a body means POST.
    pub fn method_hint(&self) -> HttpMethod {
        if self.body.is_some() {
            HttpMethod::Post
        } else {
            HttpMethod::Get
        }
    }

    /// Same request aimed at a different URL.
    #[must_use]
    pub fn redirected(&self, url: Url) -> Self {
        Self { url, ..self.clone() }
    }
}

/// Coarse payload format of a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Xml,
    Unknown,
}

impl ContentType {
    /// Classify a `Content-Type` header value.
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::Unknown;
        };
        let value = value.to_ascii_lowercase();

        if value.contains("json") || value.contains("javascript") || value.contains("text/plain") {
            Self::Json
        } else if value.contains("xml") {
            Self::Xml
        } else {
            Self::Unknown
        }
    }
}
