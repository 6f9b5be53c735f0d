//! MCP Server implementation for the HeyGen server.
//!
//! This module provides the MCP server handler that exposes:
//! - `account_credits`, `list_available_voices`, `list_avatar_groups` and
//!   `list_avatars_in_group` catalog tools
//! - `create_video`, `check_video_status`, `wait_for_video` and
//!   `download_video` for the video lifecycle
//! - The `heygen://downloads` resource
//!
//! Operation failures are returned as tool results flagged `is_error` with a
//! `{"error": "..."}` body. Only protocol misuse (unknown tool, malformed
//! arguments) becomes an MCP error.

use crate::config::Config;
use crate::handler::{
    CreateVideoParams, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_SECS, DownloadParams,
    VideoHandler, WaitParams,
};
use crate::models::{
    AvatarGroupList, AvatarList, Credits, DownloadedVideo, ToolResponse, VideoJob,
    VideoStatusReport, VideoWaitReport, VoiceList,
};
use crate::resources;
use adk_rust_mcp_common::error::Error;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    model::{
        CallToolResult, Content, JsonObject, ListResourcesResult, ReadResourceResult,
        ResourceContents, ServerCapabilities, ServerInfo, Tool,
    },
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// MCP Server for HeyGen video generation.
#[derive(Clone)]
pub struct HeyGenServer {
    /// Handler for HeyGen operations
    handler: Arc<VideoHandler>,
}

/// Tool parameters for list_avatar_groups.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListAvatarGroupsToolParams {
    /// Include public avatar groups as well as private ones (default: false)
    #[serde(default)]
    pub include_public: Option<bool>,
}

/// Tool parameters for list_avatars_in_group.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListAvatarsInGroupToolParams {
    /// Avatar group id from list_avatar_groups
    pub group_id: String,
}

/// Tool parameters for create_video.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateVideoToolParams {
    /// Text the avatar will speak
    pub input_text: String,
    /// Avatar id from list_avatars_in_group (default: HeyGen's default avatar)
    #[serde(default)]
    pub avatar_id: Option<String>,
    /// Voice id from list_available_voices (default: the avatar's voice)
    #[serde(default)]
    pub voice_id: Option<String>,
    /// Video title (default: empty)
    #[serde(default)]
    pub title: Option<String>,
}

impl From<CreateVideoToolParams> for CreateVideoParams {
    fn from(params: CreateVideoToolParams) -> Self {
        Self {
            input_text: params.input_text,
            avatar_id: params.avatar_id,
            voice_id: params.voice_id,
            title: params.title.unwrap_or_default(),
        }
    }
}

/// Tool parameters for check_video_status.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct VideoStatusToolParams {
    /// Video id returned by create_video
    pub video_id: String,
}

/// Tool parameters for wait_for_video.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WaitForVideoToolParams {
    /// Video id returned by create_video
    pub video_id: String,
    /// Maximum number of status checks (default: 60)
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Seconds to wait between status checks (default: 10)
    #[serde(default)]
    pub delay_seconds: Option<u64>,
}

impl From<WaitForVideoToolParams> for WaitParams {
    fn from(params: WaitForVideoToolParams) -> Self {
        Self {
            video_id: params.video_id,
            max_attempts: params.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            poll_interval: Duration::from_secs(
                params.delay_seconds.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            ),
        }
    }
}

/// Tool parameters for download_video.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DownloadVideoToolParams {
    /// Video id returned by create_video
    pub video_id: String,
    /// Local file path (default: a timestamped file in the download directory)
    #[serde(default)]
    pub download_path: Option<String>,
}

impl From<DownloadVideoToolParams> for DownloadParams {
    fn from(params: DownloadVideoToolParams) -> Self {
        Self {
            video_id: params.video_id,
            download_path: params
                .download_path
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

impl HeyGenServer {
    /// Create a new HeyGenServer around a handler.
    pub fn new(handler: VideoHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Create a server backed by the real HeyGen API.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self::new(VideoHandler::from_config(config)?))
    }

    /// The underlying handler.
    pub fn handler(&self) -> &VideoHandler {
        &self.handler
    }

    /// Remaining account credits.
    pub async fn account_credits(&self) -> ToolResponse<Credits> {
        self.handler.account_credits().await.into()
    }

    /// Voices available to the account.
    pub async fn list_available_voices(&self) -> ToolResponse<VoiceList> {
        self.handler.list_voices().await.into()
    }

    /// Avatar groups.
    pub async fn list_avatar_groups(
        &self,
        params: ListAvatarGroupsToolParams,
    ) -> ToolResponse<AvatarGroupList> {
        self.handler
            .list_avatar_groups(params.include_public.unwrap_or(false))
            .await
            .into()
    }

    /// Avatars in one group.
    pub async fn list_avatars_in_group(
        &self,
        params: ListAvatarsInGroupToolParams,
    ) -> ToolResponse<AvatarList> {
        self.handler
            .list_avatars_in_group(&params.group_id)
            .await
            .into()
    }

    /// Submit a video job.
    pub async fn create_video(&self, params: CreateVideoToolParams) -> ToolResponse<VideoJob> {
        self.handler.create_video(params.into()).await.into()
    }

    /// Check a job's status once.
    pub async fn check_video_status(
        &self,
        params: VideoStatusToolParams,
    ) -> ToolResponse<VideoStatusReport> {
        self.handler
            .check_video_status(&params.video_id)
            .await
            .into()
    }

    /// Poll a job until it finishes or the attempt budget runs out.
    pub async fn wait_for_video(
        &self,
        params: WaitForVideoToolParams,
    ) -> ToolResponse<VideoWaitReport> {
        self.handler.wait_for_video(params.into()).await.into()
    }

    /// Download a finished video.
    pub async fn download_video(
        &self,
        params: DownloadVideoToolParams,
    ) -> ToolResponse<DownloadedVideo> {
        self.handler.download_video(params.into()).await.into()
    }
}

/// The tools this server exposes, in workflow order.
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        tool(
            "account_credits",
            "Retrieves the remaining credits in your HeyGen account.",
            empty_schema(),
        ),
        tool(
            "list_available_voices",
            "Retrieves a list of available voices from the HeyGen API. Results truncated \
             to first 100 voices. Private voices generally will returned 1st.",
            empty_schema(),
        ),
        tool(
            "list_avatar_groups",
            "Retrieves a list of HeyGen avatar groups. By default, only private avatar \
             groups are returned, unless include_public is set to true. Avatar groups \
             are collections of avatars, avatar group ids cannot be used to generate \
             videos.",
            schema_of::<ListAvatarGroupsToolParams>(),
        ),
        tool(
            "list_avatars_in_group",
            "Retrieves a list of avatars in a specific HeyGen avatar group.",
            schema_of::<ListAvatarsInGroupToolParams>(),
        ),
        tool(
            "create_video",
            "Step 1: Create a new avatar video with HeyGen API. Input text is required, \
             avatar and voice are optional.",
            schema_of::<CreateVideoToolParams>(),
        ),
        tool(
            "check_video_status",
            "Step 2: Check the status of a video being generated. Video processing \
             may take several minutes to hours depending on length and queue time.",
            schema_of::<VideoStatusToolParams>(),
        ),
        tool(
            "wait_for_video",
            "Step 3: Wait for a video to complete processing. This tool will poll the \
             video status API until the video is complete or fails, or until \
             max_attempts checks have been made.",
            schema_of::<WaitForVideoToolParams>(),
        ),
        tool(
            "download_video",
            "Step 4: Download a completed video to a local file and return the file \
             path and a resource link.",
            schema_of::<DownloadVideoToolParams>(),
        ),
    ]
}

fn tool(name: &'static str, description: &'static str, input_schema: Arc<JsonObject>) -> Tool {
    Tool {
        name: Cow::Borrowed(name),
        description: Some(Cow::Borrowed(description)),
        input_schema,
        annotations: None,
        icons: None,
        meta: None,
        output_schema: None,
        title: None,
    }
}

fn schema_of<T: JsonSchema>() -> Arc<JsonObject> {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(&schema).unwrap_or_default() {
        serde_json::Value::Object(map) => Arc::new(map),
        _ => empty_schema(),
    }
}

/// Schema for tools without parameters.
fn empty_schema() -> Arc<JsonObject> {
    let mut map = JsonObject::new();
    map.insert("type".to_string(), serde_json::Value::from("object"));
    map.insert(
        "properties".to_string(),
        serde_json::Value::Object(JsonObject::new()),
    );
    Arc::new(map)
}

/// Deserialize tool arguments; no arguments at all reads as `{}`.
fn parse_arguments<T: DeserializeOwned>(arguments: Option<JsonObject>) -> Result<T, McpError> {
    serde_json::from_value(serde_json::Value::Object(arguments.unwrap_or_default()))
        .map_err(|e| McpError::invalid_params(format!("Invalid parameters: {}", e), None))
}

/// Render a tool response as MCP content.
fn into_call_result<T: Serialize>(
    tool: &str,
    response: ToolResponse<T>,
) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(&response).map_err(|e| {
        McpError::internal_error(format!("Failed to serialize result: {}", e), None)
    })?;

    match response.error() {
        Some(error) => {
            warn!(tool, error, "Tool failed");
            Ok(CallToolResult::error(vec![Content::text(text)]))
        }
        None => Ok(CallToolResult::success(vec![Content::text(text)])),
    }
}

impl ServerHandler for HeyGenServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "HeyGen avatar video server. Use list_avatar_groups, list_avatars_in_group \
                 and list_available_voices to pick an avatar and voice, then create_video, \
                 check_video_status or wait_for_video, and finally download_video."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::ListToolsResult, McpError>> + Send + '_
    {
        async move {
            Ok(rmcp::model::ListToolsResult {
                tools: tool_definitions(),
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            let name = params.name.as_ref();
            info!(tool = name, "Calling tool");

            match name {
                "account_credits" => into_call_result(name, self.account_credits().await),
                "list_available_voices" => {
                    into_call_result(name, self.list_available_voices().await)
                }
                "list_avatar_groups" => {
                    let tool_params = parse_arguments(params.arguments)?;
                    into_call_result(name, self.list_avatar_groups(tool_params).await)
                }
                "list_avatars_in_group" => {
                    let tool_params = parse_arguments(params.arguments)?;
                    into_call_result(name, self.list_avatars_in_group(tool_params).await)
                }
                "create_video" => {
                    let tool_params = parse_arguments(params.arguments)?;
                    into_call_result(name, self.create_video(tool_params).await)
                }
                "check_video_status" => {
                    let tool_params = parse_arguments(params.arguments)?;
                    into_call_result(name, self.check_video_status(tool_params).await)
                }
                "wait_for_video" => {
                    let tool_params = parse_arguments(params.arguments)?;
                    into_call_result(name, self.wait_for_video(tool_params).await)
                }
                "download_video" => {
                    let tool_params = parse_arguments(params.arguments)?;
                    into_call_result(name, self.download_video(tool_params).await)
                }
                _ => Err(McpError::invalid_params(
                    format!("Unknown tool: {}", params.name),
                    None,
                )),
            }
        }
    }

    fn list_resources(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        async move {
            debug!("Listing resources");

            let downloads_resource = rmcp::model::Resource {
                raw: rmcp::model::RawResource {
                    uri: resources::DOWNLOADS_URI.to_string(),
                    name: "Downloaded Videos".to_string(),
                    title: None,
                    description: Some(format!(
                        "Videos downloaded to {}, newest first",
                        self.handler.download_dir().display()
                    )),
                    mime_type: Some("application/json".to_string()),
                    size: None,
                    icons: None,
                    meta: None,
                },
                annotations: None,
            };

            Ok(ListResourcesResult {
                resources: vec![downloads_resource],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn read_resource(
        &self,
        params: rmcp::model::ReadResourceRequestParams,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        async move {
            let uri = &params.uri;
            debug!(uri = %uri, "Reading resource");

            let content = match uri.as_str() {
                resources::DOWNLOADS_URI => {
                    let dir = self.handler.download_dir().to_path_buf();
                    tokio::task::spawn_blocking(move || resources::downloads_resource_json(&dir))
                        .await
                        .map_err(|e| McpError::internal_error(e.to_string(), None))?
                        .map_err(|e| {
                            McpError::internal_error(
                                format!("Failed to list downloads: {}", e),
                                None,
                            )
                        })?
                }
                _ => {
                    return Err(McpError::resource_not_found(
                        format!("Unknown resource: {}", uri),
                        None,
                    ));
                }
            };

            Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(content, uri.clone())],
            })
        }
    }
}
