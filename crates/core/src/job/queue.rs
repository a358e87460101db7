//! FIFO of requests waiting for dispatch

use std::collections::VecDeque;

use super::request::Request;

/// Pending requests of a single job.
///
/// Owned exclusively by its job. The job pops the next entry only after the
/// previous reply has been classified, so entries leave the queue one at a
/// time and at most once.
#[derive(Debug, Default)]
pub struct RequestQueue {
    pending: VecDeque<Request>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, request: Request) {
        self.pending.push_back(request);
    }

    pub fn dequeue(&mut self) -> Option<Request> {
        self.pending.pop_front()
    }

    pub fn peek(&self) -> Option<&Request> {
        self.pending.front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
