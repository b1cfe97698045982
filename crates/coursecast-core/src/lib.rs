//! Coursecast Core - Course Video Player Library
//!
//! This crate provides the player logic around an embedded playback engine:
//! - Resolution switching that keeps position and play state
//! - Resolution menu state driven by change notifications
//! - Transcript panel synchronized with the showing text track
//! - Playback event logging for the host platform
//! - Video descriptor fetching from the hosting service
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Coursecast Core                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Source    │  │   Playback   │  │  Resolution  │           │
//! │  │   Catalog    │──│  Controller  │──│     Menu     │           │
//! │  └──────────────┘  └──────┬───────┘  └──────────────┘           │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │    Video    │                              │
//! │                    │   Player    │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │  ┌──────────────┐  ┌──────┴──────┐  ┌──────────────┐            │
//! │  │  Transcript  │  │  Playback   │  │    Event     │            │
//! │  │ Synchronizer │  │   Engine    │  │    Bridge    │            │
//! │  └──────────────┘  └─────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod engine;
pub mod catalog;
pub mod controller;
pub mod menu;
pub mod retry;
pub mod transcript;
pub mod bridge;
pub mod session;
pub mod api;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
pub use types::*;
pub use engine::PlaybackEngine;
pub use catalog::{select_default, sort_sources, SourceCatalog};
pub use controller::{PlaybackController, ResolutionChange};
pub use menu::{MenuEntry, ResolutionMenu};
pub use retry::{RetryBudget, RetryPolicy};
pub use transcript::{
    RenderStatus, ScrollRequest, TranscriptLayout, TranscriptRow, TranscriptState, TranscriptSynchronizer,
};
pub use bridge::{ChannelSink, EventBridge, EventSink, LogRecord, MemorySink, PlaybackEvent, TracingSink};
pub use session::{run, Outcome, PlayerEvent, VideoPlayer};
pub use api::{DownloadLink, VideoApi, VideoDescriptor, VideofrontClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the player library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Coursecast Core initialized");
}
