//! Request, response and result types for the HeyGen server.
//!
//! Three groups live here:
//! - wire types sent to or received from the HeyGen REST API,
//! - the payloads each tool returns on success,
//! - [`ToolResponse`], the envelope every tool result travels in.

use std::fmt;

use adk_rust_mcp_common::error::Error;
use serde::{Deserialize, Serialize};

/// Default output width in pixels.
pub const DEFAULT_WIDTH: u32 = 1280;
/// Default output height in pixels.
pub const DEFAULT_HEIGHT: u32 = 720;

// =============================================================================
// Job status
// =============================================================================

/// Lifecycle state of a video job as reported by HeyGen.
///
/// Unrecognised remote values deserialize to `Unknown` so that a new status
/// on the service side does not break polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    /// Queued and not yet rendering.
    #[serde(alias = "waiting")]
    Pending,
    /// Rendering in progress.
    Processing,
    /// Rendered; a download URL is available.
    Completed,
    /// Rendering failed.
    Failed,
    /// Any value this server does not recognise.
    #[serde(other)]
    Unknown,
}

impl VideoStatus {
    /// Whether polling can stop: the job will not change state again.
    pub fn is_terminal(self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Failed)
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            VideoStatus::Pending => "pending",
            VideoStatus::Processing => "processing",
            VideoStatus::Completed => "completed",
            VideoStatus::Failed => "failed",
            VideoStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// API Request Types
// =============================================================================

/// Body of `POST /v2/video/generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoGenerateRequest {
    /// Video title shown in the HeyGen dashboard; may be empty
    pub title: String,
    /// Scenes of the video; this server always sends exactly one
    pub video_inputs: Vec<VideoInput>,
    /// Output resolution
    pub dimension: Dimension,
}

impl VideoGenerateRequest {
    /// Single-scene request: one avatar speaking `input_text`.
    pub fn single_scene(
        title: impl Into<String>,
        input_text: impl Into<String>,
        avatar_id: Option<String>,
        voice_id: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            video_inputs: vec![VideoInput {
                character: Character::avatar(avatar_id),
                voice: Voice::text(input_text, voice_id),
            }],
            dimension: Dimension::default(),
        }
    }
}

/// One scene: who is on screen and what they say.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInput {
    /// On-screen character
    pub character: Character,
    /// Speech track
    pub voice: Voice,
}

/// Avatar reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Character {
    /// Character kind; always `avatar`
    #[serde(rename = "type")]
    pub kind: String,
    /// Avatar id; omitted to let HeyGen pick its default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<String>,
    /// Framing of the avatar
    pub avatar_style: String,
}

impl Character {
    pub fn avatar(avatar_id: Option<String>) -> Self {
        Self {
            kind: "avatar".to_string(),
            avatar_id,
            avatar_style: "normal".to_string(),
        }
    }
}

/// Text-to-speech voice track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Voice {
    /// Voice kind; always `text`
    #[serde(rename = "type")]
    pub kind: String,
    /// Script spoken by the avatar
    pub input_text: String,
    /// Voice id; omitted to use the avatar's default voice
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

impl Voice {
    pub fn text(input_text: impl Into<String>, voice_id: Option<String>) -> Self {
        Self {
            kind: "text".to_string(),
            input_text: input_text.into(),
            voice_id,
        }
    }
}

/// Output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Default for Dimension {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

// =============================================================================
// API Response Types
// =============================================================================

/// Envelope around every HeyGen JSON response.
///
/// v2 endpoints use `{ "error": ..., "data": ... }`; v1 endpoints use
/// `{ "code": ..., "message": ..., "data": ... }`.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Error object or string; `null` on success
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    /// v1 status code; 100 means success
    #[serde(default)]
    pub code: Option<i64>,
    /// v1 status message
    #[serde(default)]
    pub message: Option<String>,
    /// Payload
    pub data: Option<T>,
}

/// v1 success code.
pub const V1_SUCCESS_CODE: i64 = 100;

impl<T> ApiEnvelope<T> {
    /// Error reported inside a 2xx response, if any.
    pub fn error_message(&self) -> Option<String> {
        if let Some(error) = self.error.as_ref().filter(|e| !e.is_null()) {
            return Some(describe_error_value(error));
        }
        match self.code {
            Some(code) if code != V1_SUCCESS_CODE => Some(format!(
                "code {}: {}",
                code,
                self.message.as_deref().unwrap_or("unknown error")
            )),
            _ => None,
        }
    }
}

fn describe_error_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => {
            let code = map.get("code").map(|c| match c {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            });
            let message = map
                .get("message")
                .or_else(|| map.get("detail"))
                .and_then(|m| m.as_str());
            match (code, message) {
                (Some(code), Some(message)) => format!("{}: {}", code, message),
                (None, Some(message)) => message.to_string(),
                _ => value.to_string(),
            }
        }
        other => other.to_string(),
    }
}

/// `data` of `GET /v2/user/remaining_quota`.
#[derive(Debug, Deserialize)]
pub struct RemainingQuotaData {
    pub remaining_quota: f64,
}

/// `data` of `GET /v2/voices`.
#[derive(Debug, Deserialize)]
pub struct VoicesData {
    #[serde(default)]
    pub voices: Vec<VoiceInfo>,
}

/// `data` of `GET /v2/avatar_group.list`.
#[derive(Debug, Deserialize)]
pub struct AvatarGroupsData {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub avatar_group_list: Vec<AvatarGroupInfo>,
}

/// `data` of `GET /v2/avatar_group/{id}/avatars`.
#[derive(Debug, Deserialize)]
pub struct AvatarsData {
    #[serde(default)]
    pub avatar_list: Vec<AvatarInfo>,
}

/// `data` of `POST /v2/video/generate`.
#[derive(Debug, Deserialize)]
pub struct VideoGenerateData {
    pub video_id: String,
}

/// `data` of `GET /v1/video_status.get`.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoStatusData {
    #[serde(default)]
    pub id: Option<String>,
    pub status: VideoStatus,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl VideoStatusData {
    /// Human-readable failure reason, if the job reported one.
    pub fn failure_reason(&self) -> Option<String> {
        self.error
            .as_ref()
            .filter(|e| !e.is_null())
            .map(describe_error_value)
    }
}

// =============================================================================
// Catalog entries (passed through to tool callers)
// =============================================================================

/// A voice available to the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub voice_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_pause: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion_support: Option<bool>,
}

/// An avatar group (a collection of looks for one avatar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarGroupInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub num_looks: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<f64>,
}

/// An avatar usable in `create_video`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarInfo {
    pub avatar_id: String,
    #[serde(default)]
    pub avatar_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub premium: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_voice_id: Option<String>,
}

// =============================================================================
// Tool Result Types
// =============================================================================

/// Result of `account_credits`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credits {
    /// Whole credits left (`remaining_quota / 60`, rounded down)
    pub remaining_credits: u64,
    /// Raw quota as reported by HeyGen
    pub remaining_quota: f64,
}

/// Quota units per credit.
pub const QUOTA_PER_CREDIT: f64 = 60.0;

impl Credits {
    pub fn from_quota(remaining_quota: f64) -> Self {
        let credits = (remaining_quota.max(0.0) / QUOTA_PER_CREDIT).floor();
        Self {
            remaining_credits: credits as u64,
            remaining_quota,
        }
    }
}

/// Result of `list_available_voices`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceList {
    pub voices: Vec<VoiceInfo>,
}

/// Result of `list_avatar_groups`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvatarGroupList {
    pub total_count: u64,
    pub avatar_groups: Vec<AvatarGroupInfo>,
}

/// Result of `list_avatars_in_group`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvatarList {
    pub avatars: Vec<AvatarInfo>,
}

/// Result of `create_video`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoJob {
    pub video_id: String,
    pub status: VideoStatus,
}

/// Result of `check_video_status`: one observation of a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoStatusReport {
    pub video_id: String,
    pub status: VideoStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Why the job failed, when `status` is `failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl VideoStatusReport {
    /// Combine the queried id with the status payload. HeyGen echoes the id
    /// back, but the queried id wins when the echo is missing.
    pub fn from_data(video_id: &str, data: VideoStatusData) -> Self {
        let failure_reason = data.failure_reason();
        Self {
            video_id: data
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| video_id.to_string()),
            status: data.status,
            video_url: data.video_url.filter(|url| !url.is_empty()),
            thumbnail_url: data.thumbnail_url.filter(|url| !url.is_empty()),
            duration: data.duration,
            failure_reason,
        }
    }
}

/// Result of `wait_for_video`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoWaitReport {
    /// Last observed status
    #[serde(flatten)]
    pub report: VideoStatusReport,
    /// Status polls issued
    pub attempts: u32,
    /// True when polling stopped because the attempt budget ran out while
    /// the job was still non-terminal
    pub attempts_exhausted: bool,
}

/// Result of `download_video`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadedVideo {
    pub video_id: String,
    pub status: VideoStatus,
    pub video_url: String,
    /// Absolute local path of the file
    pub download_path: String,
    /// `file://` URI of the file
    pub resource_uri: String,
}

// =============================================================================
// Tool response envelope
// =============================================================================

/// Outcome of one tool invocation: either the success payload or an error
/// message, never both.
///
/// Serializes as the payload's own fields on success and as
/// `{"error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResponse<T> {
    Success(T),
    Failure { error: String },
}

impl<T> ToolResponse<T> {
    pub fn failure(error: impl Into<String>) -> Self {
        ToolResponse::Failure {
            error: error.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResponse::Failure { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ToolResponse::Success(_) => None,
            ToolResponse::Failure { error } => Some(error),
        }
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            ToolResponse::Success(value) => Some(value),
            ToolResponse::Failure { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            ToolResponse::Success(value) => Ok(value),
            ToolResponse::Failure { error } => Err(error),
        }
    }
}

impl<T> From<Result<T, Error>> for ToolResponse<T> {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(value) => ToolResponse::Success(value),
            Err(e) => ToolResponse::failure(e.to_string()),
        }
    }
}
