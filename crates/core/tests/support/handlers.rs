//! Minimal handlers for exercising the engine.

use gapi_core::{
    DeleteHandler, FetchHandler, HttpMethod, JobContext, JobHandler, ModifyHandler, Reply, Request,
};
use gapi_domain::{Feed, GapiError, Result as DomainResult};
use serde_json::Value;
use url::Url;

fn parse(reply: &Reply) -> DomainResult<Value> {
    serde_json::from_slice(&reply.body).map_err(|err| GapiError::Serialization(err.to_string()))
}

/// Fetches `{"items": [...], "nextPageToken": ...}` pages, following tokens.
pub struct PagedFetcher {
    pub url: Url,
}

impl FetchHandler for PagedFetcher {
    type Item = Value;

    fn start(&mut self, ctx: &mut JobContext<'_>) {
        ctx.enqueue(Request::new(self.url.clone()));
    }

    fn handle_reply_with_items(
        &mut self,
        ctx: &mut JobContext<'_>,
        reply: &Reply,
    ) -> DomainResult<Vec<Value>> {
        let feed: Feed<Value> = serde_json::from_value(parse(reply)?)
            .map_err(|err| GapiError::Serialization(err.to_string()))?;
        let (items, data) = feed.into_parts();

        if let Some(token) = data.next_page_token {
            let mut next = self.url.clone();
            next.query_pairs_mut().append_pair("pageToken", &token);
            ctx.enqueue(Request::new(next));
        }
        Ok(items)
    }
}

/// Writes one JSON document.
pub struct JsonWriter {
    pub url: Url,
    pub method: HttpMethod,
    pub body: Value,
}

impl ModifyHandler for JsonWriter {
    type Item = Value;

    fn method(&self) -> HttpMethod {
        self.method
    }

    fn start(&mut self, ctx: &mut JobContext<'_>) {
        let body = serde_json::to_vec(&self.body).unwrap();
        ctx.enqueue(Request::json(self.url.clone(), body).header("If-Match", "\"etag-1\""));
    }

    fn handle_reply_with_items(
        &mut self,
        _ctx: &mut JobContext<'_>,
        reply: &Reply,
    ) -> DomainResult<Vec<Value>> {
        Ok(vec![parse(reply)?])
    }
}

/// Deletes `<base>/<id>` for each id.
pub struct IdDeleter {
    pub base: Url,
}

impl DeleteHandler for IdDeleter {
    type Target = String;

    fn delete_request(&self, id: &String) -> DomainResult<Request> {
        let url = self.base.join(id).map_err(|err| GapiError::InvalidInput(err.to_string()))?;
        Ok(Request::new(url))
    }
}

/// Bare handler with switchable behavior that counts hook calls.
#[derive(Default)]
pub struct Recorder {
    /// Requests enqueued by `start`.
    pub initial: Vec<Request>,
    /// Finish from within `start` and then try to enqueue anyway.
    pub finish_then_enqueue: bool,
    pub needs_account: bool,
    pub replies_seen: usize,
    pub started: usize,
    pub finished: usize,
}

impl JobHandler for Recorder {
    fn about_to_start(&mut self) {
        self.started += 1;
    }

    fn start(&mut self, ctx: &mut JobContext<'_>) {
        if self.finish_then_enqueue {
            ctx.emit_finished();
        }
        for request in &self.initial {
            ctx.enqueue(request.clone());
        }
    }

    fn handle_reply(&mut self, _ctx: &mut JobContext<'_>, _reply: &Reply) {
        self.replies_seen += 1;
    }

    fn about_to_finish(&mut self) {
        self.finished += 1;
    }

    fn requires_account(&self) -> bool {
        self.needs_account
    }
}
