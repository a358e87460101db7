//! Create and update jobs

use gapi_domain::{Account, Result};

use super::classifier::{classify, ReplyAction};
use super::engine::JobContext;
use super::handler::{build_http_request, expect_json, fail_invalid_response, JobHandler};
use super::request::Request;
use crate::ports::{HttpMethod, HttpRequest, Reply};

/// Service specific half of a [`ModifyJob`].
pub trait ModifyHandler: Send + 'static {
    type Item: Send + 'static;

    /// POST creates, PUT replaces, PATCH updates in place.
    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn about_to_start(&mut self) {}

    /// Enqueue one request with a body per object to write.
    fn start(&mut self, ctx: &mut JobContext<'_>);

    /// Map the server's copy of the written object(s).
    fn handle_reply_with_items(
        &mut self,
        ctx: &mut JobContext<'_>,
        reply: &Reply,
    ) -> Result<Vec<Self::Item>>;

    fn requires_account(&self) -> bool {
        true
    }
}

/// Writes objects and collects what the server sent back.
#[derive(Debug)]
pub struct ModifyJob<M: ModifyHandler> {
    modifier: M,
    items: Vec<M::Item>,
}

impl<M: ModifyHandler> ModifyJob<M> {
    pub fn new(modifier: M) -> Self {
        Self { modifier, items: Vec::new() }
    }

    pub fn modifier(&self) -> &M {
        &self.modifier
    }

    pub fn items(&self) -> &[M::Item] {
        &self.items
    }

    pub fn take_items(&mut self) -> Vec<M::Item> {
        std::mem::take(&mut self.items)
    }

    pub fn into_items(self) -> Vec<M::Item> {
        self.items
    }
}

impl<M: ModifyHandler> JobHandler for ModifyJob<M> {
    fn about_to_start(&mut self) {
        self.items.clear();
        self.modifier.about_to_start();
    }

    fn start(&mut self, ctx: &mut JobContext<'_>) {
        self.modifier.start(ctx);
    }

    fn dispatch_request(&self, request: &Request, account: Option<&Account>) -> HttpRequest {
        build_http_request(request, account, self.modifier.method())
    }

    fn handle_reply(&mut self, ctx: &mut JobContext<'_>, reply: &Reply) {
        if classify(reply).action == ReplyAction::SoftFail
            || reply.body.is_empty()
            || !expect_json(ctx, reply)
        {
            return;
        }

        match self.modifier.handle_reply_with_items(ctx, reply) {
            Ok(items) => self.items.extend(items),
            Err(err) => fail_invalid_response(ctx, &err),
        }
    }

    fn requires_account(&self) -> bool {
        self.modifier.requires_account()
    }
}
