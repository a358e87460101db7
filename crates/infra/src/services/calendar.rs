//! Calendar API client

use chrono::{DateTime, SecondsFormat, Utc};
use gapi_core::{DeleteJob, FetchJob, HttpMethod, Job, ModifyJob};
use gapi_domain::{Event, Feed, GapiError, Result};
use url::Url;

use super::handlers::{FeedFetcher, JsonWriter, ObjectFetcher, PendingWrite, UrlDeleter};
use super::{base_url, endpoint, from_json, to_json, ServiceContext};

pub type EventFetchJob = Job<FetchJob<FeedFetcher<Event>>>;
pub type SingleEventFetchJob = Job<FetchJob<ObjectFetcher<Event>>>;
pub type EventCreateJob = Job<ModifyJob<JsonWriter<Event>>>;
pub type EventModifyJob = Job<ModifyJob<JsonWriter<Event>>>;
pub type EventDeleteJob = Job<DeleteJob<UrlDeleter>>;

const DEFAULT_PAGE_SIZE: u32 = 20;

/// Query options for listing events.
///
/// A sync token takes precedence over the time window, the server rejects
/// the combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub time_min: Option<DateTime<Utc>>,
    pub time_max: Option<DateTime<Utc>>,
    pub sync_token: Option<String>,
    /// Expand recurring events into instances
    pub single_events: bool,
    pub max_results: u32,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            time_min: None,
            time_max: None,
            sync_token: None,
            single_events: false,
            max_results: DEFAULT_PAGE_SIZE,
        }
    }
}

impl EventQuery {
    /// Instances overlapping `[start, end)`, ordered by start time.
    pub fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { time_min: Some(start), time_max: Some(end), single_events: true, ..Self::default() }
    }

    pub fn incremental(sync_token: impl Into<String>) -> Self {
        Self { sync_token: Some(sync_token.into()), ..Self::default() }
    }

    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("maxResults", self.max_results.to_string())];

        if let Some(token) = &self.sync_token {
            params.push(("syncToken", token.clone()));
            return params;
        }

        if self.single_events {
            params.push(("singleEvents", "true".to_string()));
            params.push(("orderBy", "startTime".to_string()));
        }
        if let Some(time_min) = self.time_min {
            params.push(("timeMin", time_min.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(time_max) = self.time_max {
            params.push(("timeMax", time_max.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        params
    }
}

pub fn event_from_json(bytes: &[u8]) -> Result<Event> {
    from_json(bytes)
}

pub fn event_to_json(event: &Event) -> Result<Vec<u8>> {
    to_json(event)
}

pub fn parse_event_feed(bytes: &[u8]) -> Result<Feed<Event>> {
    from_json(bytes)
}

#[derive(Clone)]
pub struct CalendarService {
    context: ServiceContext,
    base: Url,
}

impl CalendarService {
    pub fn new(context: ServiceContext, base: &str) -> Result<Self> {
        Ok(Self { context, base: base_url(base)? })
    }

    pub fn fetch_events_url(&self, calendar_id: &str, query: &EventQuery) -> Result<Url> {
        let mut url = endpoint(&self.base, &["calendars", calendar_id, "events"])?;
        url.query_pairs_mut().extend_pairs(query.query_params());
        Ok(url)
    }

    pub fn fetch_event_url(&self, calendar_id: &str, event_id: &str) -> Result<Url> {
        endpoint(&self.base, &["calendars", calendar_id, "events", event_id])
    }

    pub fn create_event_url(&self, calendar_id: &str) -> Result<Url> {
        endpoint(&self.base, &["calendars", calendar_id, "events"])
    }

    pub fn update_event_url(&self, calendar_id: &str, event_id: &str) -> Result<Url> {
        self.fetch_event_url(calendar_id, event_id)
    }

    pub fn remove_event_url(&self, calendar_id: &str, event_id: &str) -> Result<Url> {
        self.fetch_event_url(calendar_id, event_id)
    }

    /// List events page by page. The fetcher exposes the final sync token
    /// once the job finishes.
    pub fn fetch_events(&self, calendar_id: &str, query: &EventQuery) -> Result<EventFetchJob> {
        let url = self.fetch_events_url(calendar_id, query)?;
        Ok(self.context.job(FetchJob::new(FeedFetcher::new(url))))
    }

    pub fn fetch_event(&self, calendar_id: &str, event_id: &str) -> Result<SingleEventFetchJob> {
        let url = self.fetch_event_url(calendar_id, event_id)?;
        Ok(self.context.job(FetchJob::new(ObjectFetcher::new(vec![url]))))
    }

    pub fn create_events(&self, calendar_id: &str, events: &[Event]) -> Result<EventCreateJob> {
        let url = self.create_event_url(calendar_id)?;
        let writes = events
            .iter()
            .map(|event| {
                Ok(PendingWrite { url: url.clone(), body: event_to_json(event)?, etag: None })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.context.job(ModifyJob::new(JsonWriter::new(HttpMethod::Post, writes))))
    }

    /// Replace events with the local copies, guarded by their etags.
    pub fn modify_events(&self, calendar_id: &str, events: &[Event]) -> Result<EventModifyJob> {
        let writes = events
            .iter()
            .map(|event| {
                let id = event
                    .id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| GapiError::InvalidInput("event has no id".into()))?;
                Ok(PendingWrite {
                    url: self.update_event_url(calendar_id, id)?,
                    body: event_to_json(event)?,
                    etag: event.etag.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.context.job(ModifyJob::new(JsonWriter::new(HttpMethod::Put, writes))))
    }

    pub fn delete_events<I, S>(&self, calendar_id: &str, event_ids: I) -> Result<EventDeleteJob>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = event_ids
            .into_iter()
            .map(|id| self.remove_event_url(calendar_id, id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.context.job(DeleteJob::new(UrlDeleter, urls)))
    }
}
