//! Configuration loader
//!
//! Loads library configuration from a file and environment variables.
//!
//! ## Loading Strategy
//! 1. Probes multiple paths for a config file (JSON or TOML)
//! 2. Falls back to defaults when none exists
//! 3. Overlays environment variables on top
//!
//! ## Environment Variables
//! - `GAPI_HTTP_TIMEOUT`: Request timeout in seconds
//! - `GAPI_HTTP_MAX_ATTEMPTS`: Attempts per request on connection failures
//! - `GAPI_HTTP_USER_AGENT`: User agent sent with every request
//! - `GAPI_MAX_RETRY_INTERVAL`: Throttling backoff ceiling in seconds
//! - `GAPI_CALENDAR_URL`, `GAPI_TASKS_URL`, `GAPI_DRIVE_URL`,
//!   `GAPI_USERINFO_URL`: Service base URLs
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./gapi.json` or `./gapi.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use gapi_domain::{Config, GapiError, Result};

const CONFIG_FILE_NAMES: [&str; 8] = [
    "gapi.json",
    "gapi.toml",
    "config.json",
    "config.toml",
    "../config.json",
    "../config.toml",
    "../../config.json",
    "../../config.toml",
];

/// Load configuration from the first config file found, then apply
/// environment overrides.
///
/// # Errors
/// Returns `GapiError::Config` if a config file exists but cannot be parsed,
/// or an environment variable holds an invalid value.
pub fn load() -> Result<Config> {
    let config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(config)
}

/// Load configuration from environment variables on top of the defaults.
///
/// # Errors
/// Returns `GapiError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    apply_env_overrides(Config::default())
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `GapiError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GapiError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GapiError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| GapiError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Overlay the `GAPI_*` environment variables onto `config`.
///
/// Unset or empty variables leave the corresponding field untouched.
///
/// # Errors
/// Returns `GapiError::Config` if a numeric variable does not parse.
pub fn apply_env_overrides(mut config: Config) -> Result<Config> {
    if let Some(timeout) = env_parse("GAPI_HTTP_TIMEOUT")? {
        config.http.timeout_seconds = timeout;
    }
    if let Some(attempts) = env_parse("GAPI_HTTP_MAX_ATTEMPTS")? {
        config.http.max_attempts = attempts;
    }
    if let Some(agent) = env_var("GAPI_HTTP_USER_AGENT") {
        config.http.user_agent = Some(agent);
    }
    if let Some(ceiling) = env_parse("GAPI_MAX_RETRY_INTERVAL")? {
        config.jobs.max_retry_interval_seconds = ceiling;
    }

    let endpoints = &mut config.endpoints;
    for (key, target) in [
        ("GAPI_CALENDAR_URL", &mut endpoints.calendar),
        ("GAPI_TASKS_URL", &mut endpoints.tasks),
        ("GAPI_DRIVE_URL", &mut endpoints.drive),
        ("GAPI_USERINFO_URL", &mut endpoints.userinfo),
    ] {
        if let Some(url) = env_var(key) {
            *target = url.trim_end_matches('/').to_string();
        }
    }

    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `GapiError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GapiError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GapiError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(GapiError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory (and up to two parents), then the same
/// names relative to the executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(CONFIG_FILE_NAMES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Non-empty environment variable
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional numeric environment variable
///
/// # Errors
/// Returns `GapiError::Config` if the variable is set but does not parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    env_var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| GapiError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use gapi_domain::constants::DEFAULT_TASKS_API_BASE;
    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 8] = [
        "GAPI_HTTP_TIMEOUT",
        "GAPI_HTTP_MAX_ATTEMPTS",
        "GAPI_HTTP_USER_AGENT",
        "GAPI_MAX_RETRY_INTERVAL",
        "GAPI_CALENDAR_URL",
        "GAPI_TASKS_URL",
        "GAPI_DRIVE_URL",
        "GAPI_USERINFO_URL",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_load_from_env_defaults_when_unset() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let config = load_from_env().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("GAPI_HTTP_TIMEOUT", "5");
        std::env::set_var("GAPI_HTTP_MAX_ATTEMPTS", "1");
        std::env::set_var("GAPI_HTTP_USER_AGENT", "gapi-tests/1.0");
        std::env::set_var("GAPI_MAX_RETRY_INTERVAL", "60");
        std::env::set_var("GAPI_CALENDAR_URL", "http://localhost:9000/calendar/");
        std::env::set_var("GAPI_TASKS_URL", "http://localhost:9000/tasks");
        std::env::set_var("GAPI_DRIVE_URL", "http://localhost:9000/drive");
        std::env::set_var("GAPI_USERINFO_URL", "http://localhost:9000/userinfo");

        let result = load_from_env();
        assert!(result.is_ok(), "Should load config from env vars, error: {:?}", result.err());

        let config = result.unwrap();
        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.http.max_attempts, 1);
        assert_eq!(config.http.user_agent.as_deref(), Some("gapi-tests/1.0"));
        assert_eq!(config.jobs.max_retry_interval_seconds, 60);
        assert_eq!(config.endpoints.calendar, "http://localhost:9000/calendar");
        assert_eq!(config.endpoints.tasks, "http://localhost:9000/tasks");
        assert_eq!(config.endpoints.drive, "http://localhost:9000/drive");
        assert_eq!(config.endpoints.userinfo, "http://localhost:9000/userinfo");

        clear_env();
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("GAPI_HTTP_TIMEOUT", "not-a-number");

        let result = load_from_env();
        let err = result.unwrap_err();
        assert!(matches!(err, GapiError::Config(ref msg) if msg.contains("GAPI_HTTP_TIMEOUT")));

        clear_env();
    }

    #[test]
    fn test_env_overrides_file_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let path = temp_config(r#"{ "jobs": { "max_retry_interval_seconds": 10 } }"#, "json");
        std::env::set_var("GAPI_MAX_RETRY_INTERVAL", "120");

        let config = apply_env_overrides(load_from_file(Some(path.clone())).unwrap()).unwrap();
        assert_eq!(config.jobs.max_retry_interval_seconds, 120);

        clear_env();
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_json() {
        let path = temp_config(
            r#"{
                "http": { "timeout_seconds": 12, "user_agent": "gapi" },
                "jobs": { "max_retry_interval_seconds": 300 },
                "endpoints": { "tasks": "http://127.0.0.1:8080/tasks/v1" }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.http.timeout_seconds, 12);
        // Missing fields keep their defaults
        assert_eq!(config.http.max_attempts, 3);
        assert_eq!(config.jobs.max_retry_interval_seconds, 300);
        assert_eq!(config.endpoints.tasks, "http://127.0.0.1:8080/tasks/v1");
        assert_ne!(config.endpoints.calendar, "");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = temp_config(
            r#"
[http]
timeout_seconds = 45
max_attempts = 5

[jobs]
max_retry_interval_seconds = 16
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.http.timeout_seconds, 45);
        assert_eq!(config.http.max_attempts, 5);
        assert_eq!(config.jobs.max_retry_interval_seconds, 16);
        assert_eq!(config.endpoints.tasks, DEFAULT_TASKS_API_BASE);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/gapi.json")));
        assert!(matches!(result, Err(GapiError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = temp_config(r#"{ "this is": "not valid json" "#, "json");

        let result = load_from_file(Some(path.clone()));
        assert!(result.is_err(), "Should fail with invalid JSON");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("test.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
