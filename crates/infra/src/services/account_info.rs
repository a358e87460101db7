//! Profile of the signed-in user

use gapi_core::{FetchJob, Job};
use gapi_domain::{AccountInfo, Result};
use url::Url;

use super::handlers::ObjectFetcher;
use super::{base_url, endpoint, from_json, ServiceContext};

pub type AccountInfoFetchJob = Job<FetchJob<ObjectFetcher<AccountInfo>>>;

pub fn account_info_from_json(bytes: &[u8]) -> Result<AccountInfo> {
    from_json(bytes)
}

#[derive(Clone)]
pub struct AccountInfoService {
    context: ServiceContext,
    base: Url,
}

impl AccountInfoService {
    pub fn new(context: ServiceContext, base: &str) -> Result<Self> {
        Ok(Self { context, base: base_url(base)? })
    }

    pub fn fetch_account_info_url(&self) -> Result<Url> {
        endpoint(&self.base, &["userinfo"])
    }

    pub fn fetch_account_info(&self) -> Result<AccountInfoFetchJob> {
        let url = self.fetch_account_info_url()?;
        Ok(self.context.job(FetchJob::new(ObjectFetcher::new(vec![url]))))
    }
}
