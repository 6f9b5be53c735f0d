//! HTTP client for the HeyGen REST API.
//!
//! [`HeyGenClient`] is the production implementation of [`HeyGenApi`], the
//! seam the video handler is written against. Every JSON call carries the API
//! key in the `X-Api-Key` header; file downloads go to the pre-signed video
//! URL and never carry the key.

use std::path::{Path, PathBuf};
use std::time::Duration;

use adk_rust_mcp_common::error::{ConfigError, Error};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use crate::config::{API_KEY_ENV, Config};
use crate::models::{
    ApiEnvelope, AvatarGroupList, AvatarGroupsData, AvatarList, AvatarsData, Credits,
    RemainingQuotaData, VideoGenerateData, VideoGenerateRequest, VideoStatusData, VoiceList,
    VoicesData,
};

/// Connection establishment timeout for all requests.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Operations the video handler needs from HeyGen.
#[async_trait]
pub trait HeyGenApi: Send + Sync {
    /// Remaining account credits.
    async fn remaining_credits(&self) -> Result<Credits, Error>;

    /// Voices available to the account, in the order HeyGen returns them.
    async fn list_voices(&self) -> Result<VoiceList, Error>;

    /// Avatar groups; private only unless `include_public` is set.
    async fn list_avatar_groups(&self, include_public: bool) -> Result<AvatarGroupList, Error>;

    /// Avatars belonging to one group.
    async fn list_avatars_in_group(&self, group_id: &str) -> Result<AvatarList, Error>;

    /// Submit a generation job and return its video id.
    async fn generate_video(&self, request: &VideoGenerateRequest) -> Result<String, Error>;

    /// Current status of a job.
    async fn video_status(&self, video_id: &str) -> Result<VideoStatusData, Error>;

    /// Stream the file at `url` into `destination`, creating parent
    /// directories as needed. Returns the absolute path written.
    async fn download_file(&self, url: &str, destination: &Path) -> Result<PathBuf, Error>;
}

/// reqwest-backed HeyGen client.
#[derive(Clone)]
pub struct HeyGenClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    request_timeout: Duration,
    download_timeout: Option<Duration>,
}

impl HeyGenClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` if the API key is empty or the HTTP client
    /// cannot be built.
    pub fn new(config: &Config) -> Result<Self, Error> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::missing_env_var(API_KEY_ENV).into());
        }
        if reqwest::header::HeaderValue::from_str(&config.api_key).is_err() {
            return Err(ConfigError::invalid_value(
                API_KEY_ENV,
                "contains characters that are not allowed in an HTTP header",
            )
            .into());
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::invalid_value("http client", e.to_string()))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
            download_timeout: config.download_timeout,
        })
    }

    /// The key this client authenticates with.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("X-Api-Key", &self.api_key)
            .header("Accept", "application/json")
            .timeout(self.request_timeout)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let endpoint = self.endpoint(path);
        debug!(endpoint = %endpoint, "GET");

        let request = self.authorized(self.http.get(&endpoint)).query(query);
        self.send_json(&endpoint, request).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let endpoint = self.endpoint(path);
        debug!(endpoint = %endpoint, "POST");

        let request = self.authorized(self.http.post(&endpoint)).json(body);
        self.send_json(&endpoint, request).await
    }

    /// Send a request and unwrap the HeyGen envelope around its JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, Error> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::network(endpoint, e.to_string()))?;
        let response = ensure_success(endpoint, response).await?;
        let status = response.status().as_u16();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::network(endpoint, format!("Failed to read response body: {}", e)))?;
        let envelope: ApiEnvelope<T> = serde_json::from_slice(&body)
            .map_err(|e| Error::decode(endpoint, e.to_string()))?;

        if let Some(message) = envelope.error_message() {
            return Err(Error::api(endpoint, status, message));
        }

        envelope
            .data
            .ok_or_else(|| Error::decode(endpoint, "response has no data"))
    }
}

/// Turn a non-2xx response into `Error::Api`, keeping the body as the message.
async fn ensure_success(endpoint: &str, response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body
    };
    Err(Error::api(endpoint, status.as_u16(), message))
}

/// Absolute form of `path` without touching the file system.
fn absolute(path: &Path) -> Result<PathBuf, Error> {
    Ok(std::path::absolute(path)?)
}

#[async_trait]
impl HeyGenApi for HeyGenClient {
    #[instrument(level = "debug", name = "heygen_remaining_credits", skip(self))]
    async fn remaining_credits(&self) -> Result<Credits, Error> {
        let data: RemainingQuotaData = self.get_json("/v2/user/remaining_quota", &[]).await?;
        Ok(Credits::from_quota(data.remaining_quota))
    }

    #[instrument(level = "debug", name = "heygen_list_voices", skip(self))]
    async fn list_voices(&self) -> Result<VoiceList, Error> {
        let data: VoicesData = self.get_json("/v2/voices", &[]).await?;
        debug!(count = data.voices.len(), "Fetched voices");
        Ok(VoiceList { voices: data.voices })
    }

    #[instrument(level = "debug", name = "heygen_list_avatar_groups", skip(self))]
    async fn list_avatar_groups(&self, include_public: bool) -> Result<AvatarGroupList, Error> {
        let include_public = if include_public { "true" } else { "false" };
        let data: AvatarGroupsData = self
            .get_json("/v2/avatar_group.list", &[("include_public", include_public)])
            .await?;

        let total_count = data
            .total_count
            .unwrap_or(data.avatar_group_list.len() as u64);
        Ok(AvatarGroupList {
            total_count,
            avatar_groups: data.avatar_group_list,
        })
    }

    #[instrument(level = "debug", name = "heygen_list_avatars_in_group", skip(self))]
    async fn list_avatars_in_group(&self, group_id: &str) -> Result<AvatarList, Error> {
        let path = format!("/v2/avatar_group/{}/avatars", urlencoding::encode(group_id));
        let data: AvatarsData = self.get_json(&path, &[]).await?;
        Ok(AvatarList {
            avatars: data.avatar_list,
        })
    }

    #[instrument(level = "debug", name = "heygen_generate_video", skip_all)]
    async fn generate_video(&self, request: &VideoGenerateRequest) -> Result<String, Error> {
        let data: VideoGenerateData = self.post_json("/v2/video/generate", request).await?;
        if data.video_id.trim().is_empty() {
            return Err(Error::decode(
                self.endpoint("/v2/video/generate"),
                "response has an empty video_id",
            ));
        }
        info!(video_id = %data.video_id, "Video generation job created");
        Ok(data.video_id)
    }

    #[instrument(level = "debug", name = "heygen_video_status", skip(self))]
    async fn video_status(&self, video_id: &str) -> Result<VideoStatusData, Error> {
        self.get_json("/v1/video_status.get", &[("video_id", video_id)])
            .await
    }

    #[instrument(level = "debug", name = "heygen_download_file", skip(self, url))]
    async fn download_file(&self, url: &str, destination: &Path) -> Result<PathBuf, Error> {
        let destination = absolute(destination)?;

        let mut request = self.http.get(url);
        if let Some(timeout) = self.download_timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| Error::network(url, e.to_string()))?;
        let mut response = ensure_success(url, response).await?;

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(&destination).await?;
        let mut written: u64 = 0;
        let streamed = async {
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| Error::network(url, format!("Download interrupted: {}", e)))?
            {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok::<(), Error>(())
        }
        .await;
        drop(file);

        if let Err(e) = streamed {
            warn!(path = %destination.display(), error = %e, "Download failed, removing partial file");
            let _ = tokio::fs::remove_file(&destination).await;
            return Err(e);
        }

        info!(path = %destination.display(), bytes = written, "Video downloaded");
        Ok(destination)
    }
}
