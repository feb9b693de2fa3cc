use anyhow::Result;
use httpmock::prelude::*;
use namecheck::adapters::storage::LogKind;
use namecheck::domain::model::{CandidateEvent, RunReport};
use namecheck::domain::ports::Reporter;
use namecheck::{
    load_candidates, FailurePolicy, FileResultSink, HttpExecutor, Scheduler, ServicesConfig,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct RecordingReporter {
    events: Mutex<Vec<CandidateEvent>>,
}

impl Reporter for RecordingReporter {
    fn candidate_checked(&self, event: &CandidateEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn run_finished(&self, _report: &RunReport) {}
}

fn services_toml(base_url: &str) -> String {
    format!(
        r#"
[[services]]
name = "mock site"
url = "{base_url}/api/check"
min_length = 2
max_length = 10
method = "POST"
timeout_seconds = 5

[services.body]
username = ["{{word}}"]

[services.available_when]
kind = "json_field"
pointer = "/available"

[[services]]
name = "profiles"
url = "{base_url}/u/{{word}}"

[services.available_when]
kind = "status"
codes = [404]
"#
    )
}

#[tokio::test]
async fn test_check_run_persists_results_and_skips_checked_words_next_time() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("output");
    let wordlist = temp_dir.path().join("words.txt");
    tokio::fs::write(&wordlist, "Alice\nbob\n  carol \nx\nbob\nmallory\nwaytoolongname\n").await?;

    let server = MockServer::start_async().await;
    let free_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/check")
                .json_body(serde_json::json!({"username": ["bob"]}));
            then.status(200).json_body(serde_json::json!({"available": true}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/check")
                .json_body(serde_json::json!({"username": ["mallory"]}));
            then.status(200).json_body(serde_json::json!({"unexpected": "shape"}));
        })
        .await;
    for taken in ["alice", "carol"] {
        server
            .mock_async(move |when, then| {
                when.method(POST)
                    .path("/api/check")
                    .json_body(serde_json::json!({"username": [taken]}));
                then.status(200).json_body(serde_json::json!({"available": false}));
            })
            .await;
    }

    let services = ServicesConfig::from_toml_str(&services_toml(&server.base_url()))?;
    let descriptor = services.descriptor("mock site")?;
    let sink = Arc::new(FileResultSink::new(&output));

    let batch = load_candidates(
        sink.as_ref(),
        &descriptor,
        &wordlist,
        None,
        Duration::from_millis(5),
    )
    .await?;
    assert_eq!(batch.words, vec!["alice", "bob", "carol", "mallory"]);

    let scheduler = Scheduler::new(
        Arc::new(descriptor.clone()),
        Arc::new(HttpExecutor::new(Duration::from_secs(5))?),
        Arc::clone(&sink),
        RecordingReporter::default(),
    );
    let report = scheduler.run(batch).await;

    free_mock.assert_async().await;
    assert_eq!(report.total_checked, 4);
    assert_eq!(report.available_words, vec!["bob"]);
    assert_eq!(report.total_failed, 1);

    let events = scheduler.reporter().events.lock().unwrap().clone();
    let mallory = events.iter().find(|e| e.word == "mallory").unwrap();
    assert!(mallory.failed);
    assert_eq!(mallory.error_kind, Some("ClassificationError"));

    let mut checked = sink.read_log("mock site", LogKind::Checked).await?;
    checked.sort();
    assert_eq!(checked, vec!["alice", "bob", "carol", "mallory"]);
    assert_eq!(
        sink.read_log("mock site", LogKind::Available).await?,
        vec!["bob"]
    );

    // A second run over the same wordlist has nothing left to check.
    let batch = load_candidates(
        sink.as_ref(),
        &descriptor,
        &wordlist,
        None,
        Duration::from_millis(5),
    )
    .await?;
    assert!(batch.is_empty());

    let report = scheduler.run(batch).await;
    assert_eq!(report.total_checked, 0);
    assert_eq!(report.total_available, 0);

    Ok(())
}

#[tokio::test]
async fn test_status_based_service_treats_404_as_available() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("output");

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/u/free");
            then.status(404).body("no such user");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/u/taken");
            then.status(200).body("profile page");
        })
        .await;

    let services = ServicesConfig::from_toml_str(&services_toml(&server.base_url()))?;
    let descriptor = services.descriptor("profiles")?;
    let sink = Arc::new(FileResultSink::new(&output));

    let scheduler = Scheduler::new(
        Arc::new(descriptor),
        Arc::new(HttpExecutor::new(Duration::from_secs(5))?),
        Arc::clone(&sink),
        RecordingReporter::default(),
    );

    let batch = namecheck::CandidateBatch::new(
        vec!["free".to_string(), "taken".to_string()],
        Duration::from_millis(1),
    )?;
    let report = scheduler.run(batch).await;

    assert_eq!(report.available_words, vec!["free"]);
    assert_eq!(report.total_failed, 0);
    let mut checked = sink.read_log("profiles", LogKind::Checked).await?;
    checked.sort();
    assert_eq!(checked, vec!["free", "taken"]);

    Ok(())
}

#[tokio::test]
async fn test_unreachable_service_with_leave_unchecked_policy() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output = temp_dir.path().join("output");

    // Nothing listens on port 1, so every request fails at the transport level.
    let services = ServicesConfig::from_toml_str(&services_toml("http://127.0.0.1:1"))?;
    let descriptor = services.descriptor("profiles")?;
    let sink = Arc::new(FileResultSink::new(&output));

    let scheduler = Scheduler::new(
        Arc::new(descriptor),
        Arc::new(HttpExecutor::new(Duration::from_secs(2))?),
        Arc::clone(&sink),
        RecordingReporter::default(),
    )
    .with_failure_policy(FailurePolicy::LeaveUnchecked);

    let batch = namecheck::CandidateBatch::new(
        vec!["aa".to_string(), "bb".to_string(), "cc".to_string()],
        Duration::from_millis(1),
    )?;
    let report = scheduler.run(batch).await;

    assert_eq!(report.total_checked, 3);
    assert_eq!(report.total_failed, 3);
    let events = scheduler.reporter().events.lock().unwrap().clone();
    assert!(events
        .iter()
        .all(|e| e.error_kind == Some("TransportFailure") && !e.available));
    assert!(sink.read_log("profiles", LogKind::Checked).await?.is_empty());

    Ok(())
}
