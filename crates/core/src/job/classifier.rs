//! Reply classification
//!
//! Maps a raw [`Reply`] onto the closed [`ErrorCode`] taxonomy and the policy
//! the job applies for it.

use gapi_domain::ErrorCode;
use serde_json::Value;

use crate::ports::Reply;

/// What the job does with a classified reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyAction {
    /// Success: hand the reply to the handler.
    Proceed,
    /// Resubmit the in-flight request at the `Location` target.
    Redirect,
    /// Back off, then resubmit the in-flight request.
    Throttle,
    /// Record the error, but still hand the reply to the handler.
    SoftFail,
    /// Record the error and finish.
    Fail,
}

/// Outcome of classifying one reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Classification {
    pub code: ErrorCode,
    pub action: ReplyAction,
}

/// Classify a reply by its status.
///
/// Some servers answer an expired token with a status the client cannot
/// decode; when the status is 0 and the raw status line reads as a 401 the
/// reply is treated as [`ErrorCode::Unauthorized`].
pub fn classify(reply: &Reply) -> Classification {
    let code = if reply.status == 0 && is_unauthorized_status_line(reply.status_line.as_deref()) {
        ErrorCode::Unauthorized
    } else {
        ErrorCode::from_status(reply.status)
    };

    let action = match code {
        ErrorCode::NoError | ErrorCode::Ok | ErrorCode::Created | ErrorCode::NoContent => {
            ReplyAction::Proceed
        }
        ErrorCode::TemporarilyMoved => ReplyAction::Redirect,
        ErrorCode::QuotaExceeded => ReplyAction::Throttle,
        ErrorCode::NotFound => ReplyAction::SoftFail,
        _ => ReplyAction::Fail,
    };

    Classification { code, action }
}

fn is_unauthorized_status_line(line: Option<&str>) -> bool {
    let Some(line) = line else {
        return false;
    };
    let mut parts = line.split_whitespace();
    matches!(
        (parts.next(), parts.next()),
        (Some(version), Some("401")) if version.starts_with("HTTP/")
    )
}

/// Extract a human readable message from an error body.
///
/// Looks for `error.message` (or a top-level `message`) in a JSON body and
/// falls back to the raw text.
pub fn parse_error_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        let scope = value.get("error").unwrap_or(&value);
        if let Some(message) = scope.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }

    String::from_utf8_lossy(body).into_owned()
}

/// Message recorded on the job for a failing reply.
pub(crate) fn error_message(code: ErrorCode, body: &[u8]) -> String {
    format!("{}.\n\nServer replied '{}'", code.description(), parse_error_message(body))
}
