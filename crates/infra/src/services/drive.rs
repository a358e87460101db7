//! Drive API client (file metadata only)

use gapi_core::{DeleteJob, FetchJob, HttpMethod, Job, ModifyJob};
use gapi_domain::{DriveFile, Feed, Result};
use serde_json::json;
use url::Url;

use super::handlers::{FeedFetcher, JsonWriter, ObjectFetcher, PendingWrite, UrlDeleter};
use super::{base_url, endpoint, from_json, ServiceContext};

pub type FileFetchJob = Job<FetchJob<FeedFetcher<DriveFile>>>;
pub type SingleFileFetchJob = Job<FetchJob<ObjectFetcher<DriveFile>>>;
pub type FileTrashJob = Job<ModifyJob<JsonWriter<DriveFile>>>;
pub type FileDeleteJob = Job<DeleteJob<UrlDeleter>>;

const PAGE_SIZE: &str = "100";

pub fn file_from_json(bytes: &[u8]) -> Result<DriveFile> {
    from_json(bytes)
}

pub fn parse_file_feed(bytes: &[u8]) -> Result<Feed<DriveFile>> {
    from_json(bytes)
}

#[derive(Clone)]
pub struct DriveService {
    context: ServiceContext,
    base: Url,
}

impl DriveService {
    pub fn new(context: ServiceContext, base: &str) -> Result<Self> {
        Ok(Self { context, base: base_url(base)? })
    }

    /// `query` uses the Drive search syntax, e.g. `'root' in parents`.
    pub fn fetch_files_url(&self, query: Option<&str>) -> Result<Url> {
        let mut url = endpoint(&self.base, &["files"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("pageSize", PAGE_SIZE);
            if let Some(query) = query {
                pairs.append_pair("q", query);
            }
        }
        Ok(url)
    }

    pub fn fetch_file_url(&self, file_id: &str) -> Result<Url> {
        endpoint(&self.base, &["files", file_id])
    }

    pub fn update_file_url(&self, file_id: &str) -> Result<Url> {
        self.fetch_file_url(file_id)
    }

    pub fn delete_file_url(&self, file_id: &str) -> Result<Url> {
        self.fetch_file_url(file_id)
    }

    pub fn fetch_files(&self, query: Option<&str>) -> Result<FileFetchJob> {
        let url = self.fetch_files_url(query)?;
        Ok(self.context.job(FetchJob::new(FeedFetcher::new(url))))
    }

    pub fn fetch_file(&self, file_id: &str) -> Result<SingleFileFetchJob> {
        let url = self.fetch_file_url(file_id)?;
        Ok(self.context.job(FetchJob::new(ObjectFetcher::new(vec![url]))))
    }

    /// Move files to the trash. They stay recoverable until deleted.
    pub fn trash_files<I, S>(&self, file_ids: I) -> Result<FileTrashJob>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let body = json!({ "trashed": true }).to_string().into_bytes();
        let writes = file_ids
            .into_iter()
            .map(|id| {
                Ok(PendingWrite {
                    url: self.update_file_url(id.as_ref())?,
                    body: body.clone(),
                    etag: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.context.job(ModifyJob::new(JsonWriter::new(HttpMethod::Patch, writes))))
    }

    /// Delete files permanently, skipping the trash.
    pub fn delete_files<I, S>(&self, file_ids: I) -> Result<FileDeleteJob>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = file_ids
            .into_iter()
            .map(|id| self.delete_file_url(id.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.context.job(DeleteJob::new(UrlDeleter, urls)))
    }
}
