//! Read-only jobs

use gapi_domain::{Account, Result};

use super::classifier::{classify, ReplyAction};
use super::engine::JobContext;
use super::handler::{build_http_request, expect_json, fail_invalid_response, JobHandler};
use super::request::Request;
use crate::ports::{HttpMethod, HttpRequest, Reply};

/// Service specific half of a [`FetchJob`].
pub trait FetchHandler: Send + 'static {
    type Item: Send + 'static;

    fn about_to_start(&mut self) {}

    /// Enqueue the first page request.
    fn start(&mut self, ctx: &mut JobContext<'_>);

    /// Map one JSON page into items. May enqueue the next page.
    fn handle_reply_with_items(
        &mut self,
        ctx: &mut JobContext<'_>,
        reply: &Reply,
    ) -> Result<Vec<Self::Item>>;

    fn requires_account(&self) -> bool {
        true
    }
}

/// Accumulates the items of every page a [`FetchHandler`] parses.
#[derive(Debug)]
pub struct FetchJob<F: FetchHandler> {
    fetcher: F,
    items: Vec<F::Item>,
}

impl<F: FetchHandler> FetchJob<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher, items: Vec::new() }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Items gathered so far.
    pub fn items(&self) -> &[F::Item] {
        &self.items
    }

    pub fn take_items(&mut self) -> Vec<F::Item> {
        std::mem::take(&mut self.items)
    }

    pub fn into_items(self) -> Vec<F::Item> {
        self.items
    }
}

impl<F: FetchHandler> JobHandler for FetchJob<F> {
    fn about_to_start(&mut self) {
        self.items.clear();
        self.fetcher.about_to_start();
    }

    fn start(&mut self, ctx: &mut JobContext<'_>) {
        self.fetcher.start(ctx);
    }

    fn dispatch_request(&self, request: &Request, account: Option<&Account>) -> HttpRequest {
        build_http_request(request, account, HttpMethod::Get)
    }

    fn handle_reply(&mut self, ctx: &mut JobContext<'_>, reply: &Reply) {
        // A missing resource has nothing to parse
        if classify(reply).action == ReplyAction::SoftFail || !expect_json(ctx, reply) {
            return;
        }

        match self.fetcher.handle_reply_with_items(ctx, reply) {
            Ok(items) => self.items.extend(items),
            Err(err) => fail_invalid_response(ctx, &err),
        }
    }

    fn requires_account(&self) -> bool {
        self.fetcher.requires_account()
    }
}
