//! Core types for Coursecast

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

// =============================================================================
// Sources
// =============================================================================

/// One playable rendition of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Opaque media locator handed to the engine
    #[serde(alias = "src")]
    pub url: String,
    /// Resolution label, usually the vertical pixel count ("720")
    #[serde(default, alias = "res", deserialize_with = "deserialize_resolution")]
    pub resolution: Option<String>,
    /// MIME type, passed through unchanged
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Display label for menus
    pub label: String,
}

impl Source {
    /// Create a new source
    pub fn new(
        url: impl Into<String>,
        resolution: impl Into<String>,
        mime_type: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            resolution: Some(resolution.into()),
            mime_type: mime_type.into(),
            label: label.into(),
        }
    }

    /// Create a source without a resolution label
    pub fn unlabelled(url: impl Into<String>, mime_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            resolution: None,
            mime_type: mime_type.into(),
            label: label.into(),
        }
    }

    /// Numeric value of the resolution label, if it has a usable one
    pub fn resolution_value(&self) -> Option<f64> {
        let raw = self.resolution.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Hosts send resolutions either as strings (from `<source res="720">`) or numbers
fn deserialize_resolution<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}

/// Playback state captured right before a source swap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    /// Position in seconds
    pub current_time: f64,
    /// Whether the engine was paused
    pub paused: bool,
    /// Whether the player UI had left its "not started" look
    pub has_started: bool,
}

// =============================================================================
// Text Tracks
// =============================================================================

/// Text track visibility mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackMode {
    Showing,
    Hidden,
    Disabled,
}

impl std::fmt::Display for TrackMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackMode::Showing => write!(f, "showing"),
            TrackMode::Hidden => write!(f, "hidden"),
            TrackMode::Disabled => write!(f, "disabled"),
        }
    }
}

/// Stable identity of a cue within one transcript render: its start time
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct CueKey(pub f64);

impl CueKey {
    /// Start time in seconds
    pub fn seconds(&self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for CueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Individual cue within a text track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCue {
    /// Start time in seconds
    pub start_time: f64,
    /// End time in seconds
    pub end_time: f64,
    /// Cue text content
    pub text: String,
}

impl TextCue {
    /// Create a new text cue
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
        }
    }

    /// Transcript row key for this cue
    pub fn key(&self) -> CueKey {
        CueKey(self.start_time)
    }
}

/// Text track as exposed by the playback engine
///
/// The engine owns tracks; the core only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextTrack {
    /// Unique identifier
    pub id: String,
    /// Human-readable label (e.g., "English")
    pub label: String,
    /// BCP-47 language code
    pub language: String,
    /// Current visibility mode
    pub mode: TrackMode,
    /// Parsed cues, empty until the engine has loaded the track payload
    pub cues: Vec<TextCue>,
    /// Cues the engine currently reports as active
    pub active_cues: Vec<TextCue>,
}

impl TextTrack {
    /// Create a new text track with no cues loaded yet
    pub fn new(id: impl Into<String>, label: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            language: language.into(),
            mode: TrackMode::Disabled,
            cues: Vec::new(),
            active_cues: Vec::new(),
        }
    }

    /// Set the visibility mode
    pub fn with_mode(mut self, mode: TrackMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the cue list
    pub fn with_cues(mut self, cues: Vec<TextCue>) -> Self {
        self.cues = cues;
        self
    }

    /// Whether this track currently drives captions
    pub fn is_showing(&self) -> bool {
        self.mode == TrackMode::Showing
    }

    /// Whether cue data has materialized
    pub fn has_cues(&self) -> bool {
        !self.cues.is_empty()
    }
}

/// Player viewport width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportWidth {
    /// Width as a percentage of the container
    pub percent: f64,
}

impl ViewportWidth {
    pub const FULL: ViewportWidth = ViewportWidth { percent: 100.0 };

    pub fn percent(percent: f64) -> Self {
        Self { percent }
    }
}

impl std::fmt::Display for ViewportWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.percent)
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Resolution switcher options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitcherConfig {
    /// Resolution selected on load when the catalog offers it
    #[serde(default)]
    pub default_resolution: Option<u32>,
}

/// Transcript panel options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Delay between cue availability checks (milliseconds)
    pub retry_delay_ms: u64,
    /// Maximum render attempts before giving up on a track
    pub max_render_attempts: u32,
    /// Scroll animation duration (milliseconds)
    pub scroll_duration_ms: u64,
    /// Player width while the transcript is shown
    pub transcript_width_percent: f64,
}

impl TranscriptConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn scroll_duration(&self) -> Duration {
        Duration::from_millis(self.scroll_duration_ms)
    }

    pub fn transcript_width(&self) -> ViewportWidth {
        ViewportWidth::percent(self.transcript_width_percent)
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: 2,
            max_render_attempts: 500,
            scroll_duration_ms: 500,
            transcript_width_percent: 200.0 / 3.0,
        }
    }
}

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Resolution switcher options
    pub switcher: SwitcherConfig,
    /// Transcript options
    pub transcript: TranscriptConfig,
    /// Buffered resolution change notifications per subscriber
    pub resolution_change_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            switcher: SwitcherConfig::default(),
            transcript: TranscriptConfig::default(),
            resolution_change_capacity: 16,
        }
    }
}

impl PlayerConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the player cannot operate with
    pub fn validate(&self) -> Result<()> {
        if self.transcript.max_render_attempts == 0 {
            return Err(Error::InvalidConfig("max_render_attempts must be at least 1".into()));
        }
        let width = self.transcript.transcript_width_percent;
        if !(width > 0.0 && width <= 100.0) {
            return Err(Error::InvalidConfig(format!(
                "transcript_width_percent must be in (0, 100], got {}",
                width
            )));
        }
        if self.resolution_change_capacity == 0 {
            return Err(Error::InvalidConfig("resolution_change_capacity must be positive".into()));
        }
        Ok(())
    }
}

/// Identifiers supplied by the host runtime, passed through to logging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostArgs {
    pub course_id: String,
    pub video_id: String,
}

impl HostArgs {
    pub fn new(course_id: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            video_id: video_id.into(),
        }
    }
}
