//! Tasks API client
//!
//! Task lists live under `users/@me/lists`, tasks under `lists/{id}/tasks`.

use gapi_core::{DeleteJob, FetchJob, HttpMethod, Job, ModifyJob};
use gapi_domain::{Feed, GapiError, Result, Task, TaskList};
use tracing::debug;
use url::Url;

use super::handlers::{FeedFetcher, JsonWriter, ObjectFetcher, PendingWrite, UrlDeleter};
use super::{base_url, endpoint, from_json, to_json, ServiceContext};

pub type TaskListFetchJob = Job<FetchJob<FeedFetcher<TaskList>>>;
pub type TaskListCreateJob = Job<ModifyJob<JsonWriter<TaskList>>>;
pub type TaskFetchJob = Job<FetchJob<FeedFetcher<Task>>>;
pub type SingleTaskFetchJob = Job<FetchJob<ObjectFetcher<Task>>>;
pub type TaskCreateJob = Job<ModifyJob<JsonWriter<Task>>>;
pub type TaskModifyJob = Job<ModifyJob<JsonWriter<Task>>>;
pub type TaskDeleteJob = Job<DeleteJob<UrlDeleter>>;

pub fn task_from_json(bytes: &[u8]) -> Result<Task> {
    from_json(bytes)
}

pub fn task_to_json(task: &Task) -> Result<Vec<u8>> {
    to_json(task)
}

pub fn task_list_from_json(bytes: &[u8]) -> Result<TaskList> {
    from_json(bytes)
}

pub fn task_list_to_json(list: &TaskList) -> Result<Vec<u8>> {
    to_json(list)
}

pub fn parse_task_feed(bytes: &[u8]) -> Result<Feed<Task>> {
    from_json(bytes)
}

pub fn parse_task_list_feed(bytes: &[u8]) -> Result<Feed<TaskList>> {
    from_json(bytes)
}

fn require_id<'a>(id: Option<&'a str>, what: &str) -> Result<&'a str> {
    id.filter(|id| !id.is_empty())
        .ok_or_else(|| GapiError::InvalidInput(format!("{what} has no id")))
}

#[derive(Clone)]
pub struct TasksService {
    context: ServiceContext,
    base: Url,
}

impl TasksService {
    pub fn new(context: ServiceContext, base: &str) -> Result<Self> {
        Ok(Self { context, base: base_url(base)? })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn fetch_task_lists_url(&self) -> Result<Url> {
        endpoint(&self.base, &["users", "@me", "lists"])
    }

    pub fn create_task_list_url(&self) -> Result<Url> {
        self.fetch_task_lists_url()
    }

    pub fn fetch_all_tasks_url(&self, list_id: &str) -> Result<Url> {
        endpoint(&self.base, &["lists", list_id, "tasks"])
    }

    pub fn fetch_task_url(&self, list_id: &str, task_id: &str) -> Result<Url> {
        endpoint(&self.base, &["lists", list_id, "tasks", task_id])
    }

    /// New tasks are created as subtasks when `parent` is given.
    pub fn create_task_url(&self, list_id: &str, parent: Option<&str>) -> Result<Url> {
        let mut url = self.fetch_all_tasks_url(list_id)?;
        if let Some(parent) = parent {
            url.query_pairs_mut().append_pair("parent", parent);
        }
        Ok(url)
    }

    pub fn update_task_url(&self, list_id: &str, task_id: &str) -> Result<Url> {
        self.fetch_task_url(list_id, task_id)
    }

    pub fn remove_task_url(&self, list_id: &str, task_id: &str) -> Result<Url> {
        self.fetch_task_url(list_id, task_id)
    }

    /// Moving without a parent makes the task top-level again.
    pub fn move_task_url(&self, list_id: &str, task_id: &str, parent: Option<&str>) -> Result<Url> {
        let mut url = endpoint(&self.base, &["lists", list_id, "tasks", task_id, "move"])?;
        if let Some(parent) = parent {
            url.query_pairs_mut().append_pair("parent", parent);
        }
        Ok(url)
    }

    pub fn fetch_task_lists(&self) -> Result<TaskListFetchJob> {
        Ok(self.context.job(FetchJob::new(FeedFetcher::new(self.fetch_task_lists_url()?))))
    }

    pub fn create_task_lists(&self, lists: &[TaskList]) -> Result<TaskListCreateJob> {
        let url = self.create_task_list_url()?;
        let writes = lists
            .iter()
            .map(|list| {
                Ok(PendingWrite { url: url.clone(), body: task_list_to_json(list)?, etag: None })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.context.job(ModifyJob::new(JsonWriter::new(HttpMethod::Post, writes))))
    }

    /// Fetch every task of a list, following pages.
    pub fn fetch_tasks(&self, list_id: &str) -> Result<TaskFetchJob> {
        let url = self.fetch_all_tasks_url(list_id)?;
        Ok(self.context.job(FetchJob::new(FeedFetcher::new(url))))
    }

    pub fn fetch_task(&self, list_id: &str, task_id: &str) -> Result<SingleTaskFetchJob> {
        let url = self.fetch_task_url(list_id, task_id)?;
        Ok(self.context.job(FetchJob::new(ObjectFetcher::new(vec![url]))))
    }

    pub fn create_tasks(
        &self,
        list_id: &str,
        tasks: &[Task],
        parent: Option<&str>,
    ) -> Result<TaskCreateJob> {
        let url = self.create_task_url(list_id, parent)?;
        let writes = tasks
            .iter()
            .map(|task| Ok(PendingWrite { url: url.clone(), body: task_to_json(task)?, etag: None }))
            .collect::<Result<Vec<_>>>()?;
        debug!(list_id, count = writes.len(), "Prepared task creation");
        Ok(self.context.job(ModifyJob::new(JsonWriter::new(HttpMethod::Post, writes))))
    }

    /// Replace each task with the local copy. Every task must carry an id.
    pub fn modify_tasks(&self, list_id: &str, tasks: &[Task]) -> Result<TaskModifyJob> {
        let writes = tasks
            .iter()
            .map(|task| {
                let id = require_id(task.id.as_deref(), "task")?;
                Ok(PendingWrite {
                    url: self.update_task_url(list_id, id)?,
                    body: task_to_json(task)?,
                    etag: task.etag.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.context.job(ModifyJob::new(JsonWriter::new(HttpMethod::Put, writes))))
    }

    pub fn move_task(
        &self,
        list_id: &str,
        task_id: &str,
        parent: Option<&str>,
    ) -> Result<TaskModifyJob> {
        let write = PendingWrite {
            url: self.move_task_url(list_id, task_id, parent)?,
            body: Vec::new(),
            etag: None,
        };
        Ok(self.context.job(ModifyJob::new(JsonWriter::new(HttpMethod::Post, vec![write]))))
    }

    /// One DELETE per id, sent in order.
    pub fn delete_tasks<I, S>(&self, list_id: &str, task_ids: I) -> Result<TaskDeleteJob>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = task_ids
            .into_iter()
            .map(|id| self.remove_task_url(list_id, id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.context.job(DeleteJob::new(UrlDeleter, urls)))
    }
}
