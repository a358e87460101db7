//! Delete jobs issue one request per target, strictly in sequence.

mod support;

use gapi_core::{DeleteJob, HttpMethod, Job, JobEvent, Reply};
use gapi_domain::ErrorCode;
use support::handlers::IdDeleter;
use support::{account, drain, url, MockTransport};

fn deleter(ids: &[&str]) -> DeleteJob<IdDeleter> {
    DeleteJob::new(IdDeleter { base: url("tasks/") }, ids.iter().map(ToString::to_string))
}

fn paths(transport: &MockTransport) -> Vec<String> {
    transport.sent().iter().map(|sent| sent.request.url.path().to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn deletes_every_target_one_at_a_time() {
    let transport =
        MockTransport::new().replies([Reply::new(204, ""), Reply::new(204, ""), Reply::new(204, "")]);
    let mut job = Job::with_account(transport.shared(), account(), deleter(&["a", "b", "c"]));
    let mut events = job.subscribe();

    job.run().await;

    assert_eq!(job.error(), ErrorCode::NoError);
    assert_eq!(job.handler().deleted(), 3);
    assert_eq!(paths(&transport), ["/v1/tasks/a", "/v1/tasks/b", "/v1/tasks/c"]);
    assert!(transport.sent().iter().all(|sent| sent.request.method == HttpMethod::Delete));
    assert_eq!(transport.max_in_flight(), 1);

    let progress: Vec<(usize, usize)> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            JobEvent::Progress { processed, total } => Some((processed, total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, [(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test(start_paused = true)]
async fn failure_abandons_remaining_targets() {
    let transport = MockTransport::new().replies([
        Reply::new(204, ""),
        Reply::json(403, r#"{"error":{"message":"insufficient permissions"}}"#),
        Reply::new(204, ""),
    ]);
    let mut job = Job::with_account(transport.shared(), account(), deleter(&["a", "b", "c"]));

    job.run().await;

    assert_eq!(job.error(), ErrorCode::Forbidden);
    assert!(job.error_message().contains("insufficient permissions"));
    assert_eq!(paths(&transport), ["/v1/tasks/a", "/v1/tasks/b"]);
    assert_eq!(job.handler().deleted(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_target_does_not_stop_the_sequence() {
    let transport = MockTransport::new().replies([
        Reply::new(204, ""),
        Reply::json(404, r#"{"error":{"message":"gone already"}}"#),
        Reply::new(204, ""),
    ]);
    let mut job = Job::with_account(transport.shared(), account(), deleter(&["a", "b", "c"]));

    job.run().await;

    assert_eq!(transport.sent_count(), 3);
    assert_eq!(job.handler().deleted(), 3);
    // The 404 stays on record
    assert_eq!(job.error(), ErrorCode::NotFound);
}

#[tokio::test(start_paused = true)]
async fn no_targets_means_nothing_to_do() {
    let transport = MockTransport::new();
    let mut job = Job::with_account(transport.shared(), account(), deleter(&[]));

    job.run().await;

    assert_eq!(job.error(), ErrorCode::NoError);
    assert_eq!(transport.sent_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn concurrent_jobs_share_one_transport() {
    let transport = MockTransport::new().replies((0..4).map(|_| Reply::new(204, "")));
    let first = Job::with_account(transport.shared(), account(), deleter(&["a", "b"])).spawn();
    let second = Job::with_account(transport.shared(), account(), deleter(&["c", "d"])).spawn();

    let first = first.join().await.unwrap();
    let second = second.join().await.unwrap();

    assert_eq!(first.error(), ErrorCode::NoError);
    assert_eq!(second.error(), ErrorCode::NoError);
    assert_eq!(transport.sent_count(), 4);
    // Each job keeps a single request in flight; together they may overlap
    assert!(transport.max_in_flight() <= 2);
}
