//! Job state machine
//!
//! A [`Job`] drives one logical operation through its handler: it starts the
//! handler, dispatches queued requests strictly one at a time, classifies
//! every reply and finishes with a frozen `(ErrorCode, message)` outcome.
//!
//! Start and the completion notification are both deferred by one scheduler
//! turn. Observers obtained before the job runs therefore never miss the
//! start, and the code that triggered the finish unwinds before anyone is
//! notified. A run whose future is dropped halfway still ends: its outcome
//! becomes [`ErrorCode::UnknownError`] and observers see it finish.

use std::sync::Arc;
use std::time::Duration;

use gapi_domain::{Account, ErrorCode, GapiError, Result};
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::classifier::{classify, error_message, Classification, ReplyAction};
use super::handler::JobHandler;
use super::pacer::RetryPacer;
use super::queue::RequestQueue;
use super::request::Request;
use crate::ports::{Reply, Transport};

const EVENT_CAPACITY: usize = 256;

/// Lifecycle phase of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobState {
    /// Constructed, never run.
    #[default]
    Idle,
    /// Pre-start hook running, error state being reset.
    Starting,
    /// One request in flight.
    Dispatching,
    /// Paced wait before the next dispatch.
    AwaitingRetry,
    /// Pre-finish hook running.
    Finishing,
    /// Run over; error fields frozen.
    Finished,
}

/// Notification published to job observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Started,
    Progress { processed: usize, total: usize },
    /// A reply was classified.
    Replied { status: u16, code: ErrorCode, action: ReplyAction },
    /// Sent exactly once per run.
    Finished { error: ErrorCode },
}

#[derive(Debug, Default)]
struct Outcome {
    running: bool,
    error: ErrorCode,
    message: String,
    runs: u64,
}

#[derive(Debug)]
struct Shared {
    outcome: Mutex<Outcome>,
    events: broadcast::Sender<JobEvent>,
}

impl Shared {
    fn publish(&self, event: JobEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    fn is_running(&self) -> bool {
        self.outcome.lock().running
    }

    fn error(&self) -> ErrorCode {
        let outcome = self.outcome.lock();
        if outcome.running {
            warn!("Called error() on running job, returning nothing");
            return ErrorCode::NoError;
        }
        outcome.error
    }

    fn error_message(&self) -> String {
        let outcome = self.outcome.lock();
        if outcome.running {
            warn!("Called error_message() on running job, returning nothing");
            return String::new();
        }
        outcome.message.clone()
    }
}

struct JobCore {
    queue: RequestQueue,
    pacer: RetryPacer,
    current: Option<Request>,
    account: Option<Arc<Account>>,
    finish_requested: bool,
    shared: Arc<Shared>,
    state: Arc<watch::Sender<JobState>>,
}

impl JobCore {
    fn set_state(&self, state: JobState) {
        self.state.send_replace(state);
    }

    fn set_error(&self, code: ErrorCode, message: String) {
        let mut outcome = self.shared.outcome.lock();
        outcome.error = code;
        outcome.message = message;
    }

    fn fail(&mut self, code: ErrorCode, body: &[u8]) {
        self.set_error(code, error_message(code, body));
        self.finish_requested = true;
    }
}

/// Handler-facing view of a running job.
pub struct JobContext<'a> {
    core: &'a mut JobCore,
}

impl JobContext<'_> {
    /// Queue a request for dispatch.
    ///
    /// Ignored once the run is finishing or over, so requests never leak
    /// into the next run.
    pub fn enqueue(&mut self, request: Request) {
        if !self.is_running() {
            warn!(url = %request.url(), "Can't enqueue requests when job is not running");
            return;
        }

        debug!(url = %request.url(), "Queued");
        self.core.queue.enqueue(request);
    }

    pub fn set_error(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.core.set_error(code, message.into());
    }

    /// Error recorded so far in this run.
    pub fn error(&self) -> ErrorCode {
        self.core.shared.outcome.lock().error
    }

    /// End the run once the current hook returns.
    pub fn emit_finished(&mut self) {
        self.core.finish_requested = true;
    }

    pub fn emit_progress(&self, processed: usize, total: usize) {
        self.core.shared.publish(JobEvent::Progress { processed, total });
    }

    pub fn account(&self) -> Option<&Account> {
        self.core.account.as_deref()
    }

    /// The request whose reply is being handled.
    pub fn current_request(&self) -> Option<&Request> {
        self.core.current.as_ref()
    }

    pub fn is_running(&self) -> bool {
        !self.core.finish_requested && self.core.shared.is_running()
    }

    /// Number of requests waiting for dispatch.
    pub fn pending(&self) -> usize {
        self.core.queue.len()
    }
}

/// One logical asynchronous operation made of sequential HTTP round-trips.
pub struct Job<H: JobHandler> {
    handler: H,
    transport: Arc<dyn Transport>,
    core: JobCore,
}

impl<H: JobHandler> Job<H> {
    pub fn new(transport: Arc<dyn Transport>, handler: H) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (state, _) = watch::channel(JobState::Idle);

        Self {
            handler,
            transport,
            core: JobCore {
                queue: RequestQueue::new(),
                pacer: RetryPacer::default(),
                current: None,
                account: None,
                finish_requested: false,
                shared: Arc::new(Shared { outcome: Mutex::new(Outcome::default()), events }),
                state: Arc::new(state),
            },
        }
    }

    pub fn with_account(transport: Arc<dyn Transport>, account: Arc<Account>, handler: H) -> Self {
        let mut job = Self::new(transport, handler);
        job.core.account = Some(account);
        job
    }

    /// Detached handle for watching this job from elsewhere.
    pub fn observer(&self) -> JobObserver {
        JobObserver { shared: Arc::clone(&self.core.shared), state: self.core.state.subscribe() }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.core.shared.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.core.shared.is_running()
    }

    pub fn state(&self) -> JobState {
        *self.core.state.borrow()
    }

    /// Outcome of the last run; [`ErrorCode::NoError`] while running.
    pub fn error(&self) -> ErrorCode {
        self.core.shared.error()
    }

    /// Diagnosis of the last run; empty while running.
    pub fn error_message(&self) -> String {
        self.core.shared.error_message()
    }

    pub fn account(&self) -> Option<&Arc<Account>> {
        self.core.account.as_ref()
    }

    pub fn set_account(&mut self, account: Option<Arc<Account>>) {
        if self.is_running() {
            warn!("Called set_account() on running job. Ignoring.");
            return;
        }
        self.core.account = account;
    }

    /// Throttling backoff ceiling in seconds (0 = unbounded).
    pub fn max_retry_interval(&self) -> u64 {
        self.core.pacer.ceiling_secs()
    }

    pub fn set_max_retry_interval(&mut self, seconds: u64) {
        if self.is_running() {
            warn!("Called set_max_retry_interval() on running job. Ignoring.");
            return;
        }
        self.core.pacer.set_ceiling(seconds);
    }

    /// Current pacing delay applied before each dispatch. Zero between runs.
    pub fn retry_interval(&self) -> Duration {
        if !self.is_running() {
            return Duration::ZERO;
        }
        self.core.pacer.interval()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Execute one run to completion.
    ///
    /// Dropping the returned future before it completes ends the run with
    /// [`ErrorCode::UnknownError`]. The job can be run again afterwards.
    pub async fn run(&mut self) {
        if self.begin() {
            self.execute().await;
        }
    }

    /// Run the job again with fresh error state.
    pub async fn restart(&mut self) {
        self.run().await;
    }

    /// Run on the tokio runtime, returning a handle to await the job back.
    pub fn spawn(mut self) -> JobHandle<H> {
        let observer = self.observer();
        // Leave the previous Finished state before the task is scheduled
        let begun = self.begin();
        let task = tokio::spawn(async move {
            if begun {
                self.execute().await;
            }
            self
        });
        JobHandle { observer, task }
    }

    /// Mark a new run as started and reset the outcome. Returns false if a
    /// run is already in progress.
    fn begin(&mut self) -> bool {
        let run = {
            let mut outcome = self.core.shared.outcome.lock();
            if outcome.running {
                drop(outcome);
                warn!("Running job cannot be restarted.");
                return false;
            }
            outcome.running = true;
            outcome.error = ErrorCode::NoError;
            outcome.message.clear();
            outcome.runs += 1;
            outcome.runs
        };

        self.core.set_state(JobState::Starting);
        debug!(run, "Starting job");
        true
    }

    async fn execute(&mut self) {
        let _guard = RunGuard {
            shared: Arc::clone(&self.core.shared),
            state: Arc::clone(&self.core.state),
        };

        // Let observers attached alongside the call subscribe first
        tokio::task::yield_now().await;
        self.start();

        while !self.core.finish_requested {
            let Some(request) = self.core.queue.dequeue() else {
                break;
            };
            self.dispatch(request).await;
        }

        self.finish().await;
    }

    fn start(&mut self) {
        self.core.finish_requested = false;
        self.core.queue.clear();
        self.core.pacer.reset();
        self.core.current = None;
        self.core.shared.publish(JobEvent::Started);

        self.handler.about_to_start();

        if self.handler.requires_account()
            && !self.core.account.as_deref().is_some_and(Account::has_access_token)
        {
            warn!("Job requires an account with an access token");
            self.core.set_error(
                ErrorCode::InvalidAccount,
                format!(
                    "{}.\n\nNo usable account was provided",
                    ErrorCode::InvalidAccount.description()
                ),
            );
            self.core.finish_requested = true;
            return;
        }

        let mut ctx = JobContext { core: &mut self.core };
        self.handler.start(&mut ctx);
    }

    async fn dispatch(&mut self, request: Request) {
        let delay = self.core.pacer.interval();
        if !delay.is_zero() {
            self.core.set_state(JobState::AwaitingRetry);
            debug!(delay_secs = delay.as_secs(), "Waiting before dispatch");
            tokio::time::sleep(delay).await;
        }

        let http = self.handler.dispatch_request(&request, self.core.account.as_deref());
        debug!(
            method = %http.method,
            url = %http.url,
            pending = self.core.queue.len(),
            "Dispatching request"
        );
        if let Some(body) = &http.body {
            trace!(body = %String::from_utf8_lossy(body), "Request body");
        }

        self.core.current = Some(request.clone());
        self.core.set_state(JobState::Dispatching);

        match self.transport.send(http).await {
            Ok(reply) => self.process_reply(&request, &reply),
            Err(err) => {
                warn!(error = %err, url = %request.url(), "Transport failed");
                self.core.set_error(
                    ErrorCode::NetworkError,
                    format!("{}.\n\n{err}", ErrorCode::NetworkError.description()),
                );
                self.core.finish_requested = true;
            }
        }
    }

    fn process_reply(&mut self, request: &Request, reply: &Reply) {
        let Classification { code, action } = classify(reply);
        debug!(
            url = %request.url(),
            status = reply.status,
            code = code.code(),
            ?action,
            "Received reply"
        );
        trace!(body = %reply.text(), "Reply body");
        self.core.shared.publish(JobEvent::Replied { status: reply.status, code, action });

        match action {
            ReplyAction::Proceed => self.run_reply_hook(reply),
            ReplyAction::Redirect => self.redirect(request, reply),
            ReplyAction::Throttle => self.throttle(request, reply),
            ReplyAction::SoftFail => {
                warn!(url = %request.url(), "Requested resource does not exist");
                self.core.set_error(code, error_message(code, &reply.body));
                // Not fatal on its own; the handler decides whether to go on
                self.run_reply_hook(reply);
            }
            ReplyAction::Fail => {
                warn!(url = %request.url(), status = reply.status, %code, "Request failed");
                self.core.fail(code, &reply.body);
            }
        }
    }

    fn run_reply_hook(&mut self, reply: &Reply) {
        let mut ctx = JobContext { core: &mut self.core };
        self.handler.handle_reply(&mut ctx, reply);
        debug!(pending = self.core.queue.len(), "Requests in queue");
    }

    fn redirect(&mut self, request: &Request, reply: &Reply) {
        match reply.location().map(|location| request.url().join(location)) {
            Some(Ok(target)) => {
                debug!(from = %request.url(), to = %target, "Temporarily moved");
                self.core.queue.enqueue(request.redirected(target));
            }
            location => {
                warn!(?location, "Redirect without a usable Location header");
                self.core.set_error(
                    ErrorCode::TemporarilyMoved,
                    format!(
                        "{}.\n\nServer sent no usable redirect target",
                        ErrorCode::TemporarilyMoved.description()
                    ),
                );
                self.core.finish_requested = true;
            }
        }
    }

    fn throttle(&mut self, request: &Request, reply: &Reply) {
        match self.core.pacer.back_off() {
            Ok(interval) => {
                warn!(
                    interval_secs = interval.as_secs(),
                    "Quota exceeded, increasing dispatch interval"
                );
                self.core.queue.enqueue(request.clone());
            }
            Err(exhausted) => {
                warn!(%exhausted, "Quota exceeded, giving up");
                self.core.fail(ErrorCode::QuotaExceeded, &reply.body);
            }
        }
    }

    async fn finish(&mut self) {
        self.core.set_state(JobState::Finishing);
        self.handler.about_to_finish();

        let error = {
            let mut outcome = self.core.shared.outcome.lock();
            outcome.running = false;
            outcome.error
        };
        self.core.queue.clear();
        self.core.pacer.reset();

        // Notify on the next turn so the finishing call stack unwinds first
        tokio::task::yield_now().await;

        debug!(error = error.code(), "Job finished");
        self.core.set_state(JobState::Finished);
        self.core.shared.publish(JobEvent::Finished { error });
    }
}

/// Ends a run whose future was dropped before `finish` completed.
struct RunGuard {
    shared: Arc<Shared>,
    state: Arc<watch::Sender<JobState>>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if *self.state.borrow() == JobState::Finished {
            return;
        }

        let error = {
            let mut outcome = self.shared.outcome.lock();
            if outcome.running {
                outcome.running = false;
                outcome.error = ErrorCode::UnknownError;
                outcome.message = format!(
                    "{}.\n\nJob was dropped before it finished",
                    ErrorCode::UnknownError.description()
                );
            }
            outcome.error
        };

        warn!(error = error.code(), "Job run abandoned");
        self.state.send_replace(JobState::Finished);
        self.shared.publish(JobEvent::Finished { error });
    }
}

/// Read-only view of a job that may be running elsewhere.
#[derive(Debug, Clone)]
pub struct JobObserver {
    shared: Arc<Shared>,
    state: watch::Receiver<JobState>,
}

impl JobObserver {
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    pub fn state(&self) -> JobState {
        *self.state.borrow()
    }

    pub fn error(&self) -> ErrorCode {
        self.shared.error()
    }

    pub fn error_message(&self) -> String {
        self.shared.error_message()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.shared.events.subscribe()
    }

    /// Wait until the job reaches [`JobState::Finished`] and return its error.
    ///
    /// Returns immediately if the last run already finished.
    pub async fn wait_finished(&self) -> Result<ErrorCode> {
        let mut state = self.state.clone();
        state
            .wait_for(|state| *state == JobState::Finished)
            .await
            .map_err(|_| GapiError::Internal("job dropped before finishing".to_string()))?;
        Ok(self.error())
    }
}

/// A job running on its own tokio task
pub struct JobHandle<H: JobHandler> {
    observer: JobObserver,
    task: JoinHandle<Job<H>>,
}

impl<H: JobHandler> JobHandle<H> {
    pub fn observer(&self) -> &JobObserver {
        &self.observer
    }

    /// Wait for the run to end and take the job back.
    pub async fn join(self) -> Result<Job<H>> {
        self.task.await.map_err(|err| GapiError::Internal(format!("job task failed: {err}")))
    }
}
