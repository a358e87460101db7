//! Hook points a concrete job plugs into the engine

use gapi_domain::constants::CONTENT_TYPE_JSON;
use gapi_domain::{Account, ErrorCode, GapiError};
use tracing::warn;

use super::engine::JobContext;
use super::request::{ContentType, Request};
use crate::ports::{HttpMethod, HttpRequest, Reply, HEADER_CONTENT_TYPE};

/// Behavior of a concrete job.
///
/// The engine owns queueing, pacing and classification. A handler only
/// produces requests, turns each queued [`Request`] into a wire call and
/// consumes successful replies.
pub trait JobHandler: Send + 'static {
    /// Reset per-run state. Called before [`JobHandler::start`] on every run.
    fn about_to_start(&mut self) {}

    /// Produce the first request(s) of a run, or finish right away.
    fn start(&mut self, ctx: &mut JobContext<'_>);

    /// Build the wire call for a queued request.
    fn dispatch_request(&self, request: &Request, account: Option<&Account>) -> HttpRequest {
        build_http_request(request, account, request.method_hint())
    }

    /// Consume a reply classified as success or not-found.
    fn handle_reply(&mut self, ctx: &mut JobContext<'_>, reply: &Reply);

    /// Called once the run is over, before observers are notified.
    fn about_to_finish(&mut self) {}

    /// Whether runs need an account with an access token.
    fn requires_account(&self) -> bool {
        false
    }
}

/// Turn a queued request into a wire call, stamping the account's token.
///
/// A body without an explicit content type is sent as JSON.
pub fn build_http_request(
    request: &Request,
    account: Option<&Account>,
    method: HttpMethod,
) -> HttpRequest {
    let mut http = HttpRequest::new(method, request.url().clone());

    if let Some(account) = account {
        http = http.bearer_auth(&account.access_token);
    }

    for (name, value) in request.headers() {
        http = http.with_header(name.clone(), value.clone());
    }

    if let Some(body) = request.body() {
        let content_type = request.content_type().unwrap_or(CONTENT_TYPE_JSON);
        http = http.with_header(HEADER_CONTENT_TYPE, content_type).with_body(body.to_vec());
    }

    http
}

/// Check that a reply carries JSON, finishing the run with
/// [`ErrorCode::InvalidResponse`] otherwise.
pub(crate) fn expect_json(ctx: &mut JobContext<'_>, reply: &Reply) -> bool {
    match ContentType::from_header(reply.content_type()) {
        ContentType::Json => true,
        other => {
            warn!(
                content_type = ?reply.content_type(),
                kind = ?other,
                "Unexpected reply content type"
            );
            ctx.set_error(
                ErrorCode::InvalidResponse,
                format!(
                    "{}.\n\nUnsupported content type '{}'",
                    ErrorCode::InvalidResponse.description(),
                    reply.content_type().unwrap_or_default()
                ),
            );
            ctx.emit_finished();
            false
        }
    }
}

/// Finish the run because a reply body could not be mapped.
pub(crate) fn fail_invalid_response(ctx: &mut JobContext<'_>, err: &GapiError) {
    warn!(error = %err, "Failed to parse reply");
    ctx.set_error(
        ErrorCode::InvalidResponse,
        format!("{}.\n\n{err}", ErrorCode::InvalidResponse.description()),
    );
    ctx.emit_finished();
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    #[test]
    fn stamps_bearer_token_and_json_content_type() {
        let url = Url::parse("https://example.com/tasks").unwrap();
        let request =
            Request::with_body(url, b"{}".to_vec(), CONTENT_TYPE_JSON).header("If-Match", "\"1\"");
        let account = Account::new("user@example.com", "secret");

        let http = build_http_request(&request, Some(&account), HttpMethod::Put);

        assert_eq!(http.method, HttpMethod::Put);
        assert_eq!(http.header("authorization"), Some("Bearer secret"));
        assert_eq!(http.header("content-type"), Some(CONTENT_TYPE_JSON));
        assert_eq!(http.header("if-match"), Some("\"1\""));
        assert_eq!(http.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn no_account_no_body() {
        let request = Request::new(Url::parse("https://example.com/").unwrap());
        let http = build_http_request(&request, None, HttpMethod::Get);

        assert!(http.headers.is_empty());
        assert!(http.body.is_none());
    }
}
