//! Playback event bridge
//!
//! Turns playback state transitions into named log events for the host's
//! event-logging sink. Each record carries the course and video ids the host
//! supplied. Events are emitted synchronously on the transition; how a sink
//! transports them is its own business.

use crate::types::HostArgs;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Semantic playback events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Player constructed
    VideoPlayerReady,

    /// Engine started loading a source
    LoadVideo,

    /// Playback started
    PlayVideo {
        #[serde(rename = "currentTime")]
        current_time: i64,
    },

    /// Playback paused
    PauseVideo {
        #[serde(rename = "currentTime")]
        current_time: i64,
    },

    /// Playback reached the end
    StopVideo {
        #[serde(rename = "currentTime")]
        current_time: i64,
    },

    /// Seek completed
    SeekVideo { new_time: i64 },

    /// Playback rate changed
    SpeedChangeVideo {
        #[serde(rename = "currentTime")]
        current_time: i64,
        #[serde(rename = "newSpeed")]
        new_speed: f64,
    },
}

impl PlaybackEvent {
    /// Event name as the logging sink knows it
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackEvent::VideoPlayerReady => "video_player_ready",
            PlaybackEvent::LoadVideo => "load_video",
            PlaybackEvent::PlayVideo { .. } => "play_video",
            PlaybackEvent::PauseVideo { .. } => "pause_video",
            PlaybackEvent::StopVideo { .. } => "stop_video",
            PlaybackEvent::SeekVideo { .. } => "seek_video",
            PlaybackEvent::SpeedChangeVideo { .. } => "speed_change_video",
        }
    }

    /// Playback time carried by the event, in whole seconds
    pub fn time(&self) -> Option<i64> {
        match self {
            PlaybackEvent::VideoPlayerReady | PlaybackEvent::LoadVideo => None,
            PlaybackEvent::PlayVideo { current_time }
            | PlaybackEvent::PauseVideo { current_time }
            | PlaybackEvent::StopVideo { current_time }
            | PlaybackEvent::SpeedChangeVideo { current_time, .. } => Some(*current_time),
            PlaybackEvent::SeekVideo { new_time } => Some(*new_time),
        }
    }
}

/// Logged times are whole seconds, truncated
pub fn whole_seconds(seconds: f64) -> i64 {
    if seconds.is_finite() {
        seconds.trunc() as i64
    } else {
        0
    }
}

/// Playback event with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Unique record ID
    pub id: Uuid,
    /// Sequence number within this player
    pub sequence: u64,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Host course identifier
    pub course_id: String,
    /// Host video identifier
    pub video_id: String,
    /// The event
    #[serde(flatten)]
    pub event: PlaybackEvent,
}

/// Destination for playback log records
pub trait EventSink: Send {
    fn record(&mut self, record: &LogRecord);
}

/// Writes records through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, record: &LogRecord) {
        info!(
            event = record.event.name(),
            sequence = record.sequence,
            course_id = %record.course_id,
            video_id = %record.video_id,
            time = ?record.event.time(),
            "Playback event"
        );
    }
}

/// Forwards records to an async consumer
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<LogRecord>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LogRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn record(&mut self, record: &LogRecord) {
        // A closed consumer drops telemetry, playback goes on
        let _ = self.tx.send(record.clone());
    }
}

/// Keeps records in memory; clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Event names in emission order
    pub fn names(&self) -> Vec<&'static str> {
        self.records().iter().map(|r| r.event.name()).collect()
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, record: &LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(record.clone());
    }
}

/// Emits playback events for one player
pub struct EventBridge {
    args: HostArgs,
    sequence: u64,
    sink: Box<dyn EventSink>,
}

impl EventBridge {
    pub fn new(args: HostArgs, sink: Box<dyn EventSink>) -> Self {
        Self { args, sequence: 0, sink }
    }

    pub fn args(&self) -> &HostArgs {
        &self.args
    }

    /// Emit an event
    pub fn emit(&mut self, event: PlaybackEvent) -> LogRecord {
        self.sequence += 1;
        let record = LogRecord {
            id: Uuid::new_v4(),
            sequence: self.sequence,
            timestamp: Utc::now(),
            course_id: self.args.course_id.clone(),
            video_id: self.args.video_id.clone(),
            event,
        };
        self.sink.record(&record);
        record
    }
}
