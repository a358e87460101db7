//! Helpers for driving service jobs against a `wiremock` server.

use std::sync::Arc;

use gapi_domain::{Account, Config, EndpointConfig, HttpConfig, JobConfig};
use gapi_infra::Services;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

pub fn account() -> Arc<Account> {
    Arc::new(Account::new("user@example.com", TOKEN))
}

/// Config pointing every service at `server`, with transport retries off so
/// each scripted reply is seen exactly once.
pub fn config(server: &MockServer, max_retry_interval_seconds: u64) -> Config {
    Config {
        http: HttpConfig { timeout_seconds: 5, max_attempts: 1, ..HttpConfig::default() },
        jobs: JobConfig { max_retry_interval_seconds },
        endpoints: EndpointConfig::all(&server.uri()),
    }
}

pub fn services(server: &MockServer) -> Services {
    Services::from_config(&config(server, 0), account()).expect("services should build")
}
