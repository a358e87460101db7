//! Generic handlers shared by the service clients

use std::marker::PhantomData;

use gapi_core::ports::HEADER_IF_MATCH;
use gapi_core::{
    DeleteHandler, FetchHandler, HttpMethod, JobContext, ModifyHandler, Reply, Request,
};
use gapi_domain::constants::CONTENT_TYPE_JSON;
use gapi_domain::{Feed, Result};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::from_json;

/// Return `url` with `pageToken` set to `token`.
pub fn with_page_token(url: &Url, token: &str) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "pageToken")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut next = url.clone();
    next.query_pairs_mut().clear().extend_pairs(pairs).append_pair("pageToken", token);
    next
}

/// Fetches a paged collection, following `nextPageToken` until exhausted.
pub struct FeedFetcher<T> {
    url: Url,
    next_sync_token: Option<String>,
    marker: PhantomData<fn() -> T>,
}

impl<T> FeedFetcher<T> {
    pub fn new(url: Url) -> Self {
        Self { url, next_sync_token: None, marker: PhantomData }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Sync token of the last page, for incremental fetches.
    pub fn next_sync_token(&self) -> Option<&str> {
        self.next_sync_token.as_deref()
    }
}

impl<T: DeserializeOwned + Send + 'static> FetchHandler for FeedFetcher<T> {
    type Item = T;

    fn about_to_start(&mut self) {
        self.next_sync_token = None;
    }

    fn start(&mut self, ctx: &mut JobContext<'_>) {
        ctx.enqueue(Request::new(self.url.clone()));
    }

    fn handle_reply_with_items(&mut self, ctx: &mut JobContext<'_>, reply: &Reply) -> Result<Vec<T>> {
        let feed: Feed<T> = from_json(&reply.body)?;
        let (items, data) = feed.into_parts();
        debug!(items = items.len(), next_page = data.next_page_token.is_some(), "Parsed feed page");

        if let Some(token) = data.next_page_token {
            ctx.enqueue(Request::new(with_page_token(&self.url, &token)));
        }
        if data.next_sync_token.is_some() {
            self.next_sync_token = data.next_sync_token;
        }
        Ok(items)
    }
}

/// Fetches individual objects, one request per URL.
pub struct ObjectFetcher<T> {
    urls: Vec<Url>,
    marker: PhantomData<fn() -> T>,
}

impl<T> ObjectFetcher<T> {
    pub fn new(urls: Vec<Url>) -> Self {
        Self { urls, marker: PhantomData }
    }
}

impl<T: DeserializeOwned + Send + 'static> FetchHandler for ObjectFetcher<T> {
    type Item = T;

    fn start(&mut self, ctx: &mut JobContext<'_>) {
        for url in &self.urls {
            ctx.enqueue(Request::new(url.clone()));
        }
    }

    fn handle_reply_with_items(&mut self, _ctx: &mut JobContext<'_>, reply: &Reply) -> Result<Vec<T>> {
        Ok(vec![from_json(&reply.body)?])
    }
}

/// One serialized object to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub url: Url,
    pub body: Vec<u8>,
    /// Sent as `If-Match` so stale writes are rejected with a conflict.
    pub etag: Option<String>,
}

impl PendingWrite {
    fn to_request(&self) -> Request {
        let request = Request::with_body(self.url.clone(), self.body.clone(), CONTENT_TYPE_JSON);
        match &self.etag {
            Some(etag) => request.header(HEADER_IF_MATCH, etag.clone()),
            None => request,
        }
    }
}

/// Writes objects and maps the server's copies back.
pub struct JsonWriter<T> {
    method: HttpMethod,
    writes: Vec<PendingWrite>,
    marker: PhantomData<fn() -> T>,
}

impl<T> JsonWriter<T> {
    pub fn new(method: HttpMethod, writes: Vec<PendingWrite>) -> Self {
        Self { method, writes, marker: PhantomData }
    }

    pub fn writes(&self) -> &[PendingWrite] {
        &self.writes
    }
}

impl<T: DeserializeOwned + Send + 'static> ModifyHandler for JsonWriter<T> {
    type Item = T;

    fn method(&self) -> HttpMethod {
        self.method
    }

    fn start(&mut self, ctx: &mut JobContext<'_>) {
        for write in &self.writes {
            ctx.enqueue(write.to_request());
        }
    }

    fn handle_reply_with_items(&mut self, _ctx: &mut JobContext<'_>, reply: &Reply) -> Result<Vec<T>> {
        Ok(vec![from_json(&reply.body)?])
    }
}

/// Deletes resources addressed by URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct UrlDeleter;

impl DeleteHandler for UrlDeleter {
    type Target = Url;

    fn delete_request(&self, target: &Url) -> Result<Request> {
        Ok(Request::new(target.clone()))
    }
}
