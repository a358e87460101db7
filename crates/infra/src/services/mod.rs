//! Service clients
//!
//! Each service module provides URL builders, JSON mappers and typed job
//! constructors for one REST API. The jobs themselves are plain
//! [`gapi_core::Job`]s driven by the generic handlers in [`handlers`].

pub mod account_info;
pub mod calendar;
pub mod drive;
pub mod handlers;
pub mod tasks;

use std::sync::Arc;

use gapi_core::{Job, JobHandler, Transport};
use gapi_domain::{Account, Config, GapiError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::errors::into_gapi;
use crate::http::HttpClient;

pub use account_info::AccountInfoService;
pub use calendar::CalendarService;
pub use drive::DriveService;
pub use tasks::TasksService;

/// What every service needs to build jobs.
#[derive(Clone)]
pub struct ServiceContext {
    transport: Arc<dyn Transport>,
    account: Arc<Account>,
    max_retry_interval: u64,
}

impl ServiceContext {
    pub fn new(transport: Arc<dyn Transport>, account: Arc<Account>) -> Self {
        Self { transport, account, max_retry_interval: 0 }
    }

    /// Throttling backoff ceiling applied to every job built here.
    #[must_use]
    pub fn with_max_retry_interval(mut self, seconds: u64) -> Self {
        self.max_retry_interval = seconds;
        self
    }

    pub fn account(&self) -> &Arc<Account> {
        &self.account
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub(crate) fn job<H: JobHandler>(&self, handler: H) -> Job<H> {
        let mut job =
            Job::with_account(Arc::clone(&self.transport), Arc::clone(&self.account), handler);
        job.set_max_retry_interval(self.max_retry_interval);
        job
    }
}

/// Entry point bundling every service over one HTTP client.
#[derive(Clone)]
pub struct Services {
    pub tasks: TasksService,
    pub calendar: CalendarService,
    pub drive: DriveService,
    pub account_info: AccountInfoService,
}

impl Services {
    /// Build the HTTP client and service clients from configuration.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be built or an endpoint is not a valid
    /// base URL.
    pub fn from_config(config: &Config, account: Arc<Account>) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpClient::from_config(&config.http)?);
        let context = ServiceContext::new(transport, account)
            .with_max_retry_interval(config.jobs.max_retry_interval_seconds);

        Ok(Self {
            tasks: TasksService::new(context.clone(), &config.endpoints.tasks)?,
            calendar: CalendarService::new(context.clone(), &config.endpoints.calendar)?,
            drive: DriveService::new(context.clone(), &config.endpoints.drive)?,
            account_info: AccountInfoService::new(context, &config.endpoints.userinfo)?,
        })
    }
}

/// Parse a service base URL.
pub(crate) fn base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim_end_matches('/')).map_err(into_gapi)?;
    if url.cannot_be_a_base() {
        return Err(GapiError::InvalidInput(format!("not a base URL: {raw}")));
    }
    Ok(url)
}

/// Append percent-encoded path segments to `base`.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| GapiError::InvalidInput(format!("not a base URL: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub(crate) fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(into_gapi)
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(into_gapi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_segments() {
        let base = base_url("https://www.googleapis.com/calendar/v3/").unwrap();
        let url = endpoint(&base, &["calendars", "team@group.calendar.google.com", "events"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team@group.calendar.google.com/events"
        );

        let url = endpoint(&base, &["calendars", "a/b c"]).unwrap();
        assert_eq!(url.path(), "/calendar/v3/calendars/a%2Fb%20c");
    }

    #[test]
    fn base_url_rejects_non_base() {
        assert!(base_url("mailto:someone@example.com").is_err());
        assert!(base_url("not a url").is_err());
    }
}
