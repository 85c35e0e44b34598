//! Client behavior against a scripted multiplexer (no network).

#[path = "helpers.rs"]
mod helpers;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clonk_http::{
    Headers, HttpClient, HttpError, Multiplexer, ProgressCallback, Request, TransportErrorKind,
    Uri,
};
use helpers::{ScriptedMultiplexer, Step};

fn peer() -> SocketAddr {
    "192.0.2.7:8080".parse().unwrap()
}

fn request(address: &str) -> Request {
    Request::new(Uri::new(address, 0).unwrap())
}

#[tokio::test]
async fn test_scripted_chunks_and_address() {
    let multiplexer = ScriptedMultiplexer::new(vec![
        Step::Connected(peer()),
        Step::Progress(9, 0),
        Step::Data(b"abc".to_vec()),
        Step::Progress(9, 3),
        Step::Data(b"def".to_vec()),
        Step::Data(b"ghi".to_vec()),
        Step::Progress(9, 9),
        Step::Complete(Ok(())),
    ]);
    let client = HttpClient::new(multiplexer.clone()).with_default_port(8080);

    let result = client
        .get_async(request("league.example/query"), None, Headers::new())
        .await
        .unwrap();
    assert_eq!(result.buffer, b"abcdefghi");
    assert_eq!(result.server_address, Some(peer()));
    assert_eq!(
        multiplexer.registered(),
        vec![(
            "GET".to_string(),
            "http://league.example:8080/query".to_string()
        )]
    );
}

#[tokio::test]
async fn test_scripted_failure_discards_partial_body() {
    let multiplexer = ScriptedMultiplexer::new(vec![
        Step::Data(b"partial".to_vec()),
        Step::Complete(Err(HttpError::Transport {
            kind: TransportErrorKind::Body,
            message: "connection reset".to_string(),
        })),
    ]);
    let client = HttpClient::new(multiplexer);

    let error = client
        .post_async(
            request("example.com").with_binary_data(vec![1, 2, 3]),
            None,
            Headers::new(),
        )
        .await
        .unwrap_err();
    assert_eq!(error.transport_kind(), Some(TransportErrorKind::Body));
}

#[tokio::test]
async fn test_progress_abort_stops_writes() {
    let multiplexer = ScriptedMultiplexer::new(vec![
        Step::Progress(6, 0),
        Step::Data(b"abc".to_vec()),
        Step::Progress(6, 3),
        Step::Data(b"def".to_vec()),
        Step::Progress(6, 6),
        Step::Complete(Ok(())),
    ]);
    let client = HttpClient::new(multiplexer);

    let reports = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&reports);
    let progress: ProgressCallback = Box::new(move |total, transferred| {
        seen.lock().unwrap().push((total, transferred));
        transferred < 3
    });

    let task = client.get_async(request("example.com"), Some(progress), Headers::new());
    assert_eq!(task.await, Err(HttpError::Aborted));
    assert_eq!(*reports.lock().unwrap(), vec![(6, 0), (6, 3)]);
}

#[tokio::test]
async fn test_cancel_mid_script_freezes_counters() {
    let multiplexer = ScriptedMultiplexer::new(vec![
        Step::Data(b"one".to_vec()),
        Step::Progress(0, 3),
        Step::Pause(Duration::from_millis(100)),
        Step::Data(b"two".to_vec()),
        Step::Progress(0, 6),
        Step::Complete(Ok(())),
    ]);
    let client = HttpClient::new(multiplexer.clone() as Arc<dyn Multiplexer>);
    let progress: ProgressCallback = Box::new(|_, _| true);
    let mut task = client.get_async(request("example.com"), Some(progress), Headers::new());

    assert!(
        helpers::wait_until(Duration::from_secs(2), || task.progress_count() == 1).await
    );
    task.cancel();
    assert_eq!(multiplexer.active_transfers(), 0);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(task.write_count(), 1);
    assert_eq!(task.progress_count(), 1);
    assert_eq!(task.await, Err(HttpError::Cancelled));
}

#[tokio::test]
async fn test_many_outstanding_tasks_each_get_their_result() {
    let multiplexer = ScriptedMultiplexer::new(vec![
        Step::Data(b"x".to_vec()),
        Step::Complete(Ok(())),
    ]);
    let client = HttpClient::new(multiplexer.clone());

    let tasks: Vec<_> = (0..50)
        .map(|i| client.get_async(request(&format!("host{i}.example")), None, Headers::new()))
        .collect();
    let ids: Vec<_> = tasks.iter().filter_map(|task| task.id()).collect();
    assert_eq!(ids.len(), 50);

    for outcome in futures::future::join_all(tasks).await {
        assert_eq!(outcome.unwrap().buffer, b"x");
    }
    assert_eq!(multiplexer.registered().len(), 50);
}
