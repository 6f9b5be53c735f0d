//! Video lifecycle handler for the HeyGen MCP server.
//!
//! This module provides the `VideoHandler` struct, which drives a HeyGen job
//! through create → poll → download, and the simple catalog queries (credits,
//! voices, avatars). It is written against the [`HeyGenApi`] trait so the
//! polling and download logic can be exercised without a network.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use adk_rust_mcp_common::error::Error;
use chrono::{DateTime, Local};
use tracing::{debug, info, instrument};

use crate::client::{HeyGenApi, HeyGenClient};
use crate::config::Config;
use crate::models::{
    AvatarGroupList, AvatarList, Credits, DownloadedVideo, VideoGenerateRequest, VideoJob,
    VideoStatus, VideoStatusReport, VideoWaitReport, VoiceList,
};

/// Default number of status polls in `wait_for_video`.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Default delay between status polls, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Extension of downloaded videos.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Timestamp prefix of generated download filenames (14 digits, sortable).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Message returned when a download is requested before a URL exists.
pub const VIDEO_URL_UNAVAILABLE: &str =
    "Video URL not available. Video may still be processing or failed.";

/// Parameters for creating a video.
#[derive(Debug, Clone, Default)]
pub struct CreateVideoParams {
    /// Script the avatar speaks (required)
    pub input_text: String,
    /// Avatar to render; HeyGen's default when `None`
    pub avatar_id: Option<String>,
    /// Voice to speak with; the avatar's default when `None`
    pub voice_id: Option<String>,
    /// Title shown in the HeyGen dashboard
    pub title: String,
}

impl CreateVideoParams {
    /// Build the single-scene generation request for these parameters.
    ///
    /// # Errors
    /// Returns `Error::Validation` if `input_text` is blank.
    pub fn to_request(&self) -> Result<VideoGenerateRequest, Error> {
        if self.input_text.trim().is_empty() {
            return Err(Error::validation("input_text cannot be empty"));
        }

        Ok(VideoGenerateRequest::single_scene(
            self.title.clone(),
            self.input_text.clone(),
            non_blank(self.avatar_id.as_deref()),
            non_blank(self.voice_id.as_deref()),
        ))
    }
}

/// Parameters for waiting on a video.
#[derive(Debug, Clone)]
pub struct WaitParams {
    pub video_id: String,
    /// Maximum number of status polls (at least 1)
    pub max_attempts: u32,
    /// Delay between consecutive polls
    pub poll_interval: Duration,
}

impl WaitParams {
    /// Wait with the default attempt budget and interval.
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

/// Parameters for downloading a finished video.
#[derive(Debug, Clone)]
pub struct DownloadParams {
    pub video_id: String,
    /// Destination file; generated under the download directory when `None`
    pub download_path: Option<PathBuf>,
}

/// Video lifecycle handler.
///
/// Holds no job state: every status question is answered by HeyGen.
pub struct VideoHandler {
    api: Arc<dyn HeyGenApi>,
    download_dir: PathBuf,
}

impl VideoHandler {
    /// Create a handler over an existing API implementation.
    pub fn new(api: Arc<dyn HeyGenApi>, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            download_dir: download_dir.into(),
        }
    }

    /// Create a handler backed by the real HeyGen client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built from `config`.
    #[instrument(level = "debug", name = "video_handler_new", skip_all)]
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        debug!(base_url = %config.base_url, "Initializing VideoHandler");
        let client = HeyGenClient::new(config)?;
        Ok(Self::new(Arc::new(client), config.download_dir.clone()))
    }

    /// Directory used for downloads without an explicit path.
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Remaining account credits.
    #[instrument(level = "info", name = "account_credits", skip(self))]
    pub async fn account_credits(&self) -> Result<Credits, Error> {
        self.api.remaining_credits().await
    }

    /// Voices exactly as HeyGen lists them.
    #[instrument(level = "info", name = "list_available_voices", skip(self))]
    pub async fn list_voices(&self) -> Result<VoiceList, Error> {
        self.api.list_voices().await
    }

    /// Avatar groups, private only unless `include_public` is set.
    #[instrument(level = "info", name = "list_avatar_groups", skip(self))]
    pub async fn list_avatar_groups(&self, include_public: bool) -> Result<AvatarGroupList, Error> {
        self.api.list_avatar_groups(include_public).await
    }

    /// Avatars in one group.
    #[instrument(level = "info", name = "list_avatars_in_group", skip(self))]
    pub async fn list_avatars_in_group(&self, group_id: &str) -> Result<AvatarList, Error> {
        let group_id = required_id("group_id", group_id)?;
        self.api.list_avatars_in_group(group_id).await
    }

    /// Submit a generation job. Returns as soon as HeyGen accepts it.
    #[instrument(level = "info", name = "create_video", skip(self, params), fields(text_len = params.input_text.len()))]
    pub async fn create_video(&self, params: CreateVideoParams) -> Result<VideoJob, Error> {
        let request = params.to_request()?;
        let video_id = self.api.generate_video(&request).await?;

        info!(video_id = %video_id, "Video job submitted");
        Ok(VideoJob {
            video_id,
            status: VideoStatus::Pending,
        })
    }

    /// One status query.
    #[instrument(level = "info", name = "check_video_status", skip(self))]
    pub async fn check_video_status(&self, video_id: &str) -> Result<VideoStatusReport, Error> {
        let video_id = required_id("video_id", video_id)?;
        let data = self.api.video_status(video_id).await?;
        Ok(VideoStatusReport::from_data(video_id, data))
    }

    /// Poll until the job reaches a terminal status or the attempt budget is
    /// spent. Running out of attempts is reported, not raised.
    #[instrument(level = "info", name = "wait_for_video", skip(self, params), fields(video_id = %params.video_id, max_attempts = params.max_attempts))]
    pub async fn wait_for_video(&self, params: WaitParams) -> Result<VideoWaitReport, Error> {
        if params.max_attempts == 0 {
            return Err(Error::validation("max_attempts must be at least 1"));
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            let report = self.check_video_status(&params.video_id).await?;
            debug!(attempt = attempts, status = %report.status, "Polled video status");

            if report.status.is_terminal() {
                info!(status = %report.status, attempts, "Video reached terminal status");
                return Ok(VideoWaitReport {
                    report,
                    attempts,
                    attempts_exhausted: false,
                });
            }

            if attempts >= params.max_attempts {
                info!(status = %report.status, attempts, "Attempt budget spent, video still in progress");
                return Ok(VideoWaitReport {
                    report,
                    attempts,
                    attempts_exhausted: true,
                });
            }

            tokio::time::sleep(params.poll_interval).await;
        }
    }

    /// Download a completed video.
    ///
    /// The status is re-queried first so the URL is always current.
    #[instrument(level = "info", name = "download_video", skip(self, params), fields(video_id = %params.video_id))]
    pub async fn download_video(&self, params: DownloadParams) -> Result<DownloadedVideo, Error> {
        let report = self.check_video_status(&params.video_id).await?;
        let video_url = report
            .video_url
            .clone()
            .ok_or_else(|| Error::precondition(VIDEO_URL_UNAVAILABLE))?;

        let destination = match params.download_path {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => default_download_path(&self.download_dir, &report.video_id, Local::now()),
        };
        debug!(destination = %destination.display(), "Downloading video");

        let written = self.api.download_file(&video_url, &destination).await?;

        Ok(DownloadedVideo {
            video_id: report.video_id,
            status: report.status,
            video_url,
            resource_uri: file_uri(&written),
            download_path: written.to_string_lossy().into_owned(),
        })
    }
}

/// `<dir>/<YYYYMMDDHHMMSS>_<video_id>.mp4` for a download started at `now`.
pub fn default_download_path(dir: &Path, video_id: &str, now: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "{}_{}.{}",
        now.format(TIMESTAMP_FORMAT),
        sanitize_file_component(video_id),
        VIDEO_EXTENSION
    ))
}

/// Replace anything that could escape the directory or upset a file system.
pub fn sanitize_file_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `file://` URI for an absolute path.
pub fn file_uri(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{}", path)
    } else {
        format!("file:///{}", path)
    }
}

fn required_id<'a>(field: &str, value: &'a str) -> Result<&'a str, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", field)));
    }
    Ok(trimmed)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
