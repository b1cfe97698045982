//! Playback engine contract
//!
//! The engine decodes, buffers and fetches media; the core only drives it
//! through this trait. Time and pause state are read and written
//! synchronously. Cue data shows up asynchronously, signalled through
//! [`PlayerEvent::TracksChanged`](crate::session::PlayerEvent) and
//! [`PlayerEvent::CueChange`](crate::session::PlayerEvent).
//!
//! Source assignment is fire-and-forget: if the engine later fails to load
//! a source it reports that through its own error channel.

use crate::types::{Source, TextTrack, ViewportWidth};

/// Handle to the underlying media playback engine
pub trait PlaybackEngine {
    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Move the playback position
    fn set_current_time(&mut self, seconds: f64);

    /// Whether playback is paused
    fn paused(&self) -> bool;

    /// Resume playback
    fn play(&mut self);

    /// Current playback rate
    fn playback_rate(&self) -> f64 {
        1.0
    }

    /// Assign a new media source
    fn load_source(&mut self, source: &Source);

    /// Whether the player UI has left its initial "not started" look
    fn has_started(&self) -> bool;

    /// Apply the "has started" visual marker
    fn mark_has_started(&mut self);

    /// Hide the big "begin playback" affordance
    fn hide_big_play_button(&mut self);

    /// Resize the player viewport
    fn set_width(&mut self, width: ViewportWidth);

    /// Current state of the text tracks, in engine order
    fn text_tracks(&self) -> Vec<TextTrack>;
}
