//! End-to-end tests for the HeyGen server against a mocked HeyGen API.

use std::time::Duration;

use adk_rust_mcp_heygen::server::{
    CreateVideoToolParams, DownloadVideoToolParams, ListAvatarGroupsToolParams,
    ListAvatarsInGroupToolParams, VideoStatusToolParams, WaitForVideoToolParams,
};
use adk_rust_mcp_heygen::{Config, HeyGenServer, ToolResponse, VideoStatus};
use serde::Serialize;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KEY: &str = "integration-key";

fn server_for(base_url: &str, download_dir: &std::path::Path) -> HeyGenServer {
    let config = Config::new(TEST_KEY)
        .with_base_url(base_url)
        .with_download_dir(download_dir);
    HeyGenServer::from_config(&config).unwrap()
}

fn status_body(status: &str, video_url: Option<String>) -> Value {
    json!({
        "code": 100,
        "message": "Success",
        "data": {"id": "abc123", "status": status, "video_url": video_url}
    })
}

/// A failed response serializes to exactly `{"error": "..."}`.
fn assert_error_only<T: Serialize>(response: &ToolResponse<T>) {
    let value = serde_json::to_value(response).unwrap();
    let obj = value.as_object().unwrap();
    assert_eq!(obj.len(), 1, "unexpected fields in {}", value);
    assert!(!obj["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn create_video_returns_job_id() {
    let api = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/video/generate"))
        .and(header("X-Api-Key", TEST_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": null,
            "data": {"video_id": "abc123"}
        })))
        .mount(&api)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let server = server_for(&api.uri(), dir.path());

    let response = server
        .create_video(CreateVideoToolParams {
            input_text: "Hello world".to_string(),
            avatar_id: None,
            voice_id: None,
            title: None,
        })
        .await;

    let job = response.success().expect("create_video should succeed");
    assert_eq!(job.video_id, "abc123");
    assert_eq!(job.status, VideoStatus::Pending);
}

#[tokio::test]
async fn check_video_status_returns_url_unchanged() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/video_status.get"))
        .and(query_param("video_id", "abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(status_body("completed", Some("https://x/y.mp4".to_string()))),
        )
        .mount(&api)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let server = server_for(&api.uri(), dir.path());

    let response = server
        .check_video_status(VideoStatusToolParams {
            video_id: "abc123".to_string(),
        })
        .await;

    let report = response.success().expect("status should succeed");
    assert_eq!(report.status, VideoStatus::Completed);
    assert_eq!(report.video_url.as_deref(), Some("https://x/y.mp4"));
}

#[tokio::test]
async fn full_lifecycle_create_wait_download() {
    let api = MockServer::start().await;
    let video_url = format!("{}/cdn/abc123.mp4", api.uri());

    Mock::given(method("POST"))
        .and(path("/v2/video/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": null,
            "data": {"video_id": "abc123"}
        })))
        .mount(&api)
        .await;

    // Two "processing" answers, then "completed" for every later poll.
    Mock::given(method("GET"))
        .and(path("/v1/video_status.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("processing", None)))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/video_status.get"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(status_body("completed", Some(video_url.clone()))),
        )
        .with_priority(2)
        .mount(&api)
        .await;

    Mock::given(method("GET"))
        .and(path("/cdn/abc123.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"MP4DATA".to_vec()))
        .expect(1)
        .mount(&api)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let server = server_for(&api.uri(), dir.path());

    let job = server
        .create_video(CreateVideoToolParams {
            input_text: "Hello world".to_string(),
            avatar_id: Some("a1".to_string()),
            voice_id: Some("v1".to_string()),
            title: Some("Demo".to_string()),
        })
        .await
        .into_result()
        .unwrap();

    let waited = server
        .wait_for_video(WaitForVideoToolParams {
            video_id: job.video_id.clone(),
            max_attempts: Some(10),
            delay_seconds: Some(0),
        })
        .await
        .into_result()
        .unwrap();
    assert_eq!(waited.report.status, VideoStatus::Completed);
    assert_eq!(waited.attempts, 3);
    assert!(!waited.attempts_exhausted);

    let downloaded = server
        .download_video(DownloadVideoToolParams {
            video_id: job.video_id,
            download_path: None,
        })
        .await
        .into_result()
        .unwrap();

    let file = std::path::PathBuf::from(&downloaded.download_path);
    assert_eq!(file.parent(), Some(dir.path()));
    assert!(file.file_name().unwrap().to_str().unwrap().ends_with("_abc123.mp4"));
    assert_eq!(std::fs::read(&file).unwrap(), b"MP4DATA");
    assert_eq!(downloaded.video_url, video_url);
    assert!(downloaded.resource_uri.starts_with("file://"));
}

#[tokio::test]
async fn wait_reports_exhausted_budget() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/video_status.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("pending", None)))
        .expect(3)
        .mount(&api)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let server = server_for(&api.uri(), dir.path());

    let waited = server
        .wait_for_video(WaitForVideoToolParams {
            video_id: "abc123".to_string(),
            max_attempts: Some(3),
            delay_seconds: Some(0),
        })
        .await
        .into_result()
        .unwrap();

    assert_eq!(waited.attempts, 3);
    assert!(waited.attempts_exhausted);
    assert_eq!(waited.report.status, VideoStatus::Pending);
}

#[tokio::test]
async fn download_before_completion_writes_nothing() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/video_status.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("processing", None)))
        .mount(&api)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let server = server_for(&api.uri(), dir.path());

    let response = server
        .download_video(DownloadVideoToolParams {
            video_id: "abc123".to_string(),
            download_path: None,
        })
        .await;

    assert_eq!(
        response.error(),
        Some("Video URL not available. Video may still be processing or failed.")
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn transport_failure_is_error_only_for_every_tool() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_for("http://127.0.0.1:1", dir.path());
    let video_id = || "abc123".to_string();

    assert_error_only(&server.account_credits().await);
    assert_error_only(&server.list_available_voices().await);
    assert_error_only(
        &server
            .list_avatar_groups(ListAvatarGroupsToolParams::default())
            .await,
    );
    assert_error_only(
        &server
            .list_avatars_in_group(ListAvatarsInGroupToolParams {
                group_id: "g1".to_string(),
            })
            .await,
    );
    assert_error_only(
        &server
            .create_video(CreateVideoToolParams {
                input_text: "Hello world".to_string(),
                avatar_id: None,
                voice_id: None,
                title: None,
            })
            .await,
    );
    assert_error_only(
        &server
            .check_video_status(VideoStatusToolParams { video_id: video_id() })
            .await,
    );
    assert_error_only(
        &server
            .wait_for_video(WaitForVideoToolParams {
                video_id: video_id(),
                max_attempts: Some(2),
                delay_seconds: Some(0),
            })
            .await,
    );
    assert_error_only(
        &server
            .download_video(DownloadVideoToolParams {
                video_id: video_id(),
                download_path: None,
            })
            .await,
    );
}

#[tokio::test]
async fn wait_does_not_block_other_calls() {
    let api = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/video_status.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("processing", None)))
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/user/remaining_quota"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": null,
            "data": {"remaining_quota": 600}
        })))
        .mount(&api)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let server = server_for(&api.uri(), dir.path());

    let waiter = {
        let server = server.clone();
        tokio::spawn(async move {
            server
                .wait_for_video(WaitForVideoToolParams {
                    video_id: "abc123".to_string(),
                    max_attempts: Some(2),
                    delay_seconds: Some(2),
                })
                .await
        })
    };

    // The waiter is asleep between its polls; credits must answer meanwhile.
    let credits = tokio::time::timeout(Duration::from_secs(1), server.account_credits())
        .await
        .expect("credits blocked behind wait_for_video")
        .into_result()
        .unwrap();
    assert_eq!(credits.remaining_credits, 10);
    assert!(!waiter.is_finished());

    let waited = waiter.await.unwrap().into_result().unwrap();
    assert!(waited.attempts_exhausted);
}
