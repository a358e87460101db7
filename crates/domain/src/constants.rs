//! Domain constants
//!
//! Default service endpoints and wire-level constants shared by the engine
//! and the service clients.

// Default service endpoints
pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_TASKS_API_BASE: &str = "https://www.googleapis.com/tasks/v1";
pub const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
pub const DEFAULT_USERINFO_API_BASE: &str = "https://www.googleapis.com/oauth2/v2";

// HTTP defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_HTTP_BASE_BACKOFF_MS: u64 = 200;

// Content types
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_XML: &str = "application/xml";
