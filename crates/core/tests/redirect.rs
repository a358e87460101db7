//! Redirect handling.

mod support;

use gapi_core::{HttpMethod, Job, ModifyJob, Reply};
use gapi_domain::ErrorCode;
use serde_json::json;
use support::handlers::JsonWriter;
use support::{account, drain, replied, url, MockTransport};

fn writer() -> ModifyJob<JsonWriter> {
    ModifyJob::new(JsonWriter {
        url: url("events"),
        method: HttpMethod::Post,
        body: json!({"summary": "Standup"}),
    })
}

#[tokio::test(start_paused = true)]
async fn redirect_resends_same_request_to_new_target() {
    let transport = MockTransport::new()
        .reply(Reply::new(302, "").with_header("Location", "https://moved.test/v2/events"))
        .reply(Reply::json(201, r#"{"id":"evt-1","summary":"Standup"}"#));
    let mut job = Job::with_account(transport.shared(), account(), writer());
    let mut events = job.subscribe();

    job.run().await;

    assert_eq!(job.error(), ErrorCode::NoError);
    assert_eq!(
        replied(&drain(&mut events)),
        [(302, ErrorCode::TemporarilyMoved), (201, ErrorCode::Created)]
    );

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    let (first, second) = (&sent[0].request, &sent[1].request);
    assert_eq!(second.url.as_str(), "https://moved.test/v2/events");
    assert_eq!(second.method, HttpMethod::Post);
    assert_eq!(second.body, first.body);
    assert_eq!(second.header("Content-Type"), first.header("Content-Type"));
    assert_eq!(second.header("If-Match"), Some("\"etag-1\""));

    assert_eq!(job.handler().items()[0]["id"], "evt-1");
}

#[tokio::test(start_paused = true)]
async fn relative_location_is_resolved_against_the_request() {
    let transport = MockTransport::new()
        .reply(Reply::new(302, "").with_header("location", "elsewhere"))
        .reply(Reply::json(200, "{}"));
    let mut job = Job::with_account(transport.shared(), account(), writer());

    job.run().await;

    assert_eq!(job.error(), ErrorCode::NoError);
    assert_eq!(transport.sent()[1].request.url, url("elsewhere"));
}

#[tokio::test(start_paused = true)]
async fn redirect_without_location_fails() {
    let transport = MockTransport::new().reply(Reply::new(302, ""));
    let mut job = Job::with_account(transport.shared(), account(), writer());

    job.run().await;

    assert_eq!(job.error(), ErrorCode::TemporarilyMoved);
    assert_eq!(transport.sent_count(), 1);
}
