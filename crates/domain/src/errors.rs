//! Error types used throughout the library
//!
//! Two families live here. [`ErrorCode`] is the closed taxonomy a finished
//! job reports as its outcome; it is data, not a Rust error. [`GapiError`] is
//! the conventional error type for library operations that can fail
//! (transport I/O, configuration, JSON mapping).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for library operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum GapiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, GapiError>;

/// Outcome code of a job run.
///
/// Values below 100 are local faults raised by the library itself; the rest
/// mirror the HTTP status the server answered with. The set is closed: any
/// status outside the table maps to [`ErrorCode::UnknownError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u16)]
pub enum ErrorCode {
    /* Local errors */
    #[default]
    NoError = 0,
    UnknownError = 1,
    AuthError = 2,
    UnknownAccount = 3,
    UnknownService = 4,
    InvalidResponse = 5,
    /// Deprecated: the credential backend was not ready.
    BackendNotReady = 6,
    InvalidAccount = 7,
    NetworkError = 8,
    AuthCancelled = 9,

    /* Server reported */
    Ok = 200,
    Created = 201,
    NoContent = 204,
    TemporarilyMoved = 302,
    NotModified = 304,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    Conflict = 409,
    Gone = 410,
    InternalError = 500,
    QuotaExceeded = 503,
}

impl ErrorCode {
    /// Map a raw numeric code onto the taxonomy.
    pub const fn from_status(status: u16) -> Self {
        match status {
            0 => Self::NoError,
            1 => Self::UnknownError,
            2 => Self::AuthError,
            3 => Self::UnknownAccount,
            4 => Self::UnknownService,
            5 => Self::InvalidResponse,
            6 => Self::BackendNotReady,
            7 => Self::InvalidAccount,
            8 => Self::NetworkError,
            9 => Self::AuthCancelled,
            200 => Self::Ok,
            201 => Self::Created,
            204 => Self::NoContent,
            302 => Self::TemporarilyMoved,
            304 => Self::NotModified,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            410 => Self::Gone,
            500 => Self::InternalError,
            503 => Self::QuotaExceeded,
            _ => Self::UnknownError,
        }
    }

    /// Numeric value of the code.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Whether the code is a library-local fault rather than a server status.
    pub const fn is_local(self) -> bool {
        (self as u16) < 100
    }

    /// Whether the code represents a successful outcome.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::NoError | Self::Ok | Self::Created | Self::NoContent)
    }

    /// Short human readable description used as the prefix of job error
    /// messages.
    pub const fn description(self) -> &'static str {
        match self {
            Self::NoError => "No error",
            Self::UnknownError => "Unknown error",
            Self::AuthError => "Authentication failed",
            Self::UnknownAccount => "Unknown account",
            Self::UnknownService => "Unknown service",
            Self::InvalidResponse => "Invalid response",
            Self::BackendNotReady => "Backend not ready",
            Self::InvalidAccount => "Invalid account",
            Self::NetworkError => "Network error",
            Self::AuthCancelled => "Authentication cancelled",
            Self::Ok => "OK",
            Self::Created => "Created",
            Self::NoContent => "No content",
            Self::TemporarilyMoved => "Temporarily moved",
            Self::NotModified => "Not modified",
            Self::BadRequest => "Bad request",
            Self::Unauthorized => "Invalid authentication",
            Self::Forbidden => "Requested resource is forbidden",
            Self::NotFound => "Requested resource does not exist",
            Self::Conflict => "Conflict. Remote resource is newer than local",
            Self::Gone => "Requested resource does not exist anymore",
            Self::InternalError => "Internal server error. Try again later",
            Self::QuotaExceeded => "Maximum quota exceeded. Try again later",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

impl From<u16> for ErrorCode {
    fn from(status: u16) -> Self {
        Self::from_status(status)
    }
}
