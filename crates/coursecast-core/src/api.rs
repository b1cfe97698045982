//! Video descriptor API
//!
//! Fetches the description of an uploaded video (processing status and
//! encoded formats) from the video hosting service, and derives the source
//! list and download links the player page needs.

use crate::{types::Source, Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

/// Processing state of an uploaded video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Success,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingInfo {
    pub status: ProcessingStatus,
    /// Percentage complete
    #[serde(default)]
    pub progress: f64,
}

/// One encoded format of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFormat {
    /// Format name ("HD", "SD", "LD")
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub bitrate: Option<f64>,
}

impl VideoFormat {
    /// Vertical resolution for the well-known format names
    pub fn resolution(&self) -> Option<u32> {
        match self.name.as_str() {
            "HD" => Some(720),
            "SD" => Some(480),
            "LD" => Some(320),
            _ => None,
        }
    }

    /// Download label for the well-known format names
    pub fn download_label(&self) -> String {
        match self.name.as_str() {
            "HD" => "High (720p)".to_string(),
            "SD" => "Standard (480p)".to_string(),
            "LD" => "Mobile (320p)".to_string(),
            other => other.to_string(),
        }
    }

    /// MIME type guessed from the URL extension
    pub fn mime_type(&self) -> &'static str {
        let path = self
            .url
            .split(|c: char| c == '?' || c == '#')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if path.ends_with(".webm") {
            "video/webm"
        } else if path.ends_with(".m3u8") {
            "application/x-mpegURL"
        } else {
            "video/mp4"
        }
    }
}

/// Video description returned by the hosting service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub processing: ProcessingInfo,
    /// Formats in increasing bitrate order
    #[serde(default)]
    pub formats: Vec<VideoFormat>,
}

/// Severity of a message shown next to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub level: MessageLevel,
    pub text: String,
}

/// Download link for the player page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadLink {
    pub url: String,
    pub label: String,
}

impl VideoDescriptor {
    /// Message describing an unfinished or failed processing run
    pub fn status_message(&self) -> Option<StatusMessage> {
        match self.processing.status {
            ProcessingStatus::Processing => Some(StatusMessage {
                level: MessageLevel::Info,
                text: format!("Video is currently being processed ({:.2}%)", self.processing.progress),
            }),
            ProcessingStatus::Failed => Some(StatusMessage {
                level: MessageLevel::Warning,
                text: "Video processing failed: try again with a different video ID".to_string(),
            }),
            _ => None,
        }
    }

    /// Download links, highest bitrate first
    pub fn download_links(&self) -> Vec<DownloadLink> {
        self.formats
            .iter()
            .rev()
            .map(|f| DownloadLink {
                url: f.url.clone(),
                label: f.download_label(),
            })
            .collect()
    }

    /// Player sources, one per format
    pub fn sources(&self) -> Vec<Source> {
        self.formats
            .iter()
            .map(|f| Source {
                url: f.url.clone(),
                resolution: f.resolution().map(|r| r.to_string()),
                mime_type: f.mime_type().to_string(),
                label: f.name.clone(),
            })
            .collect()
    }
}

/// Trim a host-supplied video id, rejecting empty ones
pub fn normalize_video_id(video_id: &str) -> Result<&str> {
    let trimmed = video_id.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidConfig("a valid video ID is required".into()));
    }
    Ok(trimmed)
}

/// Map an API response status to an error
pub fn check_status(status: StatusCode, video_id: &str) -> Result<()> {
    match status {
        s if !s.is_client_error() && !s.is_server_error() => Ok(()),
        StatusCode::FORBIDDEN => Err(Error::Authentication),
        StatusCode::NOT_FOUND => Err(Error::VideoNotFound {
            video_id: video_id.to_string(),
        }),
        s => Err(Error::ApiStatus { status: s.as_u16() }),
    }
}

/// Source of video descriptors
#[async_trait]
pub trait VideoApi: Send + Sync {
    /// Fetch the descriptor of one video
    async fn fetch_video(&self, video_id: &str) -> Result<VideoDescriptor>;
}

/// HTTP client for the video hosting service
pub struct VideofrontClient {
    host: String,
    token: String,
    client: Client,
}

impl VideofrontClient {
    /// Create a client for `host` authenticating with `token`
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Self::with_client(host, token, client)
    }

    /// Create a client that sends requests through an existing `reqwest` client
    pub fn with_client(host: impl Into<String>, token: impl Into<String>, client: Client) -> Result<Self> {
        let host = host.into();
        let token = token.into();
        if host.trim().is_empty() {
            return Err(Error::InvalidConfig("video API host is not defined".into()));
        }
        if token.is_empty() {
            return Err(Error::InvalidConfig("video API token is not defined".into()));
        }
        Ok(Self { host, token, client })
    }

    /// Descriptor URL for a video
    pub fn video_url(&self, video_id: &str) -> Result<Url> {
        let video_id = normalize_video_id(video_id)?;
        let url = format!("{}/api/v1/videos/{}/", self.host.trim_end_matches('/'), video_id);
        Ok(Url::parse(&url)?)
    }
}

#[async_trait]
impl VideoApi for VideofrontClient {
    #[instrument(skip(self))]
    async fn fetch_video(&self, video_id: &str) -> Result<VideoDescriptor> {
        let url = self.video_url(video_id)?;
        let video_id = normalize_video_id(video_id)?;

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Token {}", self.token))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Could not reach video API");
                Error::Network(e)
            })?;

        let status = response.status();
        if let Err(e) = check_status(status, video_id) {
            if matches!(e, Error::ApiStatus { .. }) {
                error!(status = status.as_u16(), "Unexpected video API status");
            }
            return Err(e);
        }

        let body = response.text().await?;
        let descriptor: VideoDescriptor = serde_json::from_str(&body)?;
        debug!(formats = descriptor.formats.len(), status = ?descriptor.processing.status, "Video descriptor fetched");
        Ok(descriptor)
    }
}
