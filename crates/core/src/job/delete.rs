//! Delete jobs
//!
//! One DELETE per target, strictly in order. The next target is only picked
//! up once the previous reply has been handled.

use std::collections::VecDeque;

use gapi_domain::{Account, ErrorCode, Result};
use tracing::{debug, warn};

use super::engine::JobContext;
use super::handler::{build_http_request, JobHandler};
use super::request::Request;
use crate::ports::{HttpMethod, HttpRequest, Reply};

/// Service specific half of a [`DeleteJob`].
pub trait DeleteHandler: Send + 'static {
    type Target: Clone + Send + 'static;

    /// Request removing a single target.
    fn delete_request(&self, target: &Self::Target) -> Result<Request>;

    fn requires_account(&self) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct DeleteJob<D: DeleteHandler> {
    deleter: D,
    targets: Vec<D::Target>,
    pending: VecDeque<D::Target>,
    deleted: usize,
}

impl<D: DeleteHandler> DeleteJob<D> {
    pub fn new(deleter: D, targets: impl IntoIterator<Item = D::Target>) -> Self {
        Self { deleter, targets: targets.into_iter().collect(), pending: VecDeque::new(), deleted: 0 }
    }

    pub fn deleter(&self) -> &D {
        &self.deleter
    }

    pub fn targets(&self) -> &[D::Target] {
        &self.targets
    }

    /// Targets answered by the server in the last run.
    pub fn deleted(&self) -> usize {
        self.deleted
    }
}

impl<D: DeleteHandler> JobHandler for DeleteJob<D> {
    fn about_to_start(&mut self) {
        self.pending = self.targets.iter().cloned().collect();
        self.deleted = 0;
    }

    fn start(&mut self, ctx: &mut JobContext<'_>) {
        let Some(target) = self.pending.pop_front() else {
            debug!(deleted = self.deleted, "No more targets to delete");
            ctx.emit_finished();
            return;
        };

        match self.deleter.delete_request(&target) {
            Ok(request) => ctx.enqueue(request),
            Err(err) => {
                warn!(error = %err, "Failed to build delete request");
                ctx.set_error(
                    ErrorCode::UnknownError,
                    format!("{}.\n\n{err}", ErrorCode::UnknownError.description()),
                );
                ctx.emit_finished();
            }
        }
    }

    fn dispatch_request(&self, request: &Request, account: Option<&Account>) -> HttpRequest {
        build_http_request(request, account, HttpMethod::Delete)
    }

    fn handle_reply(&mut self, ctx: &mut JobContext<'_>, _reply: &Reply) {
        self.deleted += 1;
        ctx.emit_progress(self.deleted, self.targets.len());
        self.start(ctx);
    }

    fn requires_account(&self) -> bool {
        self.deleter.requires_account()
    }
}
