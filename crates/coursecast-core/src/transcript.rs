//! Transcript synchronization
//!
//! Drives the transcript panel from the engine's text tracks:
//! - a showing track enables the panel and renders one row per cue
//! - cue changes move the highlight and request a smooth scroll
//! - clicking a row seeks to the cue start
//!
//! Cue data may not be parsed yet when a track starts showing. Rendering
//! then reports [`RenderStatus::Pending`] and the caller re-invokes
//! [`TranscriptSynchronizer::retry_render`] after the returned delay. Every
//! retry re-checks that the track is still showing.

use crate::{
    engine::PlaybackEngine,
    retry::{RetryBudget, RetryPolicy},
    types::{CueKey, TextTrack, TranscriptConfig, ViewportWidth},
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Row geometry of the rendered transcript, supplied by the presentation layer
pub trait TranscriptLayout {
    /// Current scroll offset of the transcript container
    fn scroll_top(&self) -> f64;

    /// Top offset of the transcript container
    fn container_top(&self) -> f64;

    /// Top offset of the row at `index`, if it is laid out
    fn row_top(&self, index: usize) -> Option<f64>;
}

/// Scroll offset that brings a row to the top of the container
pub fn scroll_target(scroll_top: f64, container_top: f64, row_top: f64) -> f64 {
    scroll_top - container_top + row_top
}

/// Animated scroll the presentation layer should perform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    /// Target scroll offset
    pub target: f64,
    /// Animation duration
    pub duration: Duration,
}

/// One cue line in the transcript
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptRow {
    /// Cue start time, the row identity
    pub key: CueKey,
    /// Cue text
    pub text: String,
    /// Whether the cue is currently active
    pub highlighted: bool,
}

/// Transcript panel state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptState {
    /// No track showing, player at full width
    Disabled,
    /// A showing track is rendered
    Enabled,
}

/// Outcome of a render attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderStatus {
    /// Rows built for the showing track
    Rendered { rows: usize },
    /// Cues not loaded yet, retry after the delay
    Pending { retry_in: Duration },
    /// The track stopped showing before its cues arrived
    Superseded,
    /// Cues never arrived within the retry budget
    Exhausted { attempts: u32 },
    /// No track showing
    Disabled,
    /// Nothing to render
    Idle,
}

#[derive(Debug)]
struct PendingRender {
    track_id: String,
    budget: RetryBudget,
}

/// Keeps the transcript panel in step with the showing text track
#[derive(Debug)]
pub struct TranscriptSynchronizer {
    config: TranscriptConfig,
    retry: RetryPolicy,
    state: TranscriptState,
    track_id: Option<String>,
    rows: Vec<TranscriptRow>,
    pending: Option<PendingRender>,
}

impl TranscriptSynchronizer {
    pub fn new(config: TranscriptConfig) -> Self {
        let retry = RetryPolicy::new(config.retry_delay(), config.max_render_attempts);
        Self {
            config,
            retry,
            state: TranscriptState::Disabled,
            track_id: None,
            rows: Vec::new(),
            pending: None,
        }
    }

    pub fn state(&self) -> TranscriptState {
        self.state
    }

    /// Whether the "transcript enabled" marker is set
    pub fn is_enabled(&self) -> bool {
        self.state == TranscriptState::Enabled
    }

    /// Rendered rows in cue order
    pub fn rows(&self) -> &[TranscriptRow] {
        &self.rows
    }

    /// Id of the rendered track
    pub fn track_id(&self) -> Option<&str> {
        self.track_id.as_deref()
    }

    /// Keys of the highlighted rows
    pub fn current_cue_keys(&self) -> Vec<CueKey> {
        self.rows.iter().filter(|r| r.highlighted).map(|r| r.key).collect()
    }

    /// Whether a render is waiting for cue data
    pub fn has_pending_render(&self) -> bool {
        self.pending.is_some()
    }

    /// React to tracks being added, removed or changing mode
    pub fn on_tracks_changed<E>(&mut self, engine: &mut E) -> RenderStatus
    where
        E: PlaybackEngine + ?Sized,
    {
        // At most one track shows in practice; the last one in engine order wins
        let showing = engine
            .text_tracks()
            .into_iter()
            .filter(|t| t.is_showing())
            .last()
            .map(|t| t.id);

        match showing {
            Some(track_id) => {
                debug!(track = %track_id, "Showing track found");
                // Rows of a track that stopped showing must not outlive it
                if self.track_id.as_deref().is_some_and(|rendered| rendered != track_id) {
                    self.clear_transcript(engine);
                }
                self.pending = Some(PendingRender {
                    track_id,
                    budget: self.retry.budget(),
                });
                self.attempt_render(engine)
            }
            None => {
                self.pending = None;
                self.clear_transcript(engine);
                RenderStatus::Disabled
            }
        }
    }

    /// Re-run a render that was waiting for cue data
    pub fn retry_render<E>(&mut self, engine: &mut E) -> RenderStatus
    where
        E: PlaybackEngine + ?Sized,
    {
        if self.pending.is_none() {
            return RenderStatus::Idle;
        }
        self.attempt_render(engine)
    }

    fn attempt_render<E>(&mut self, engine: &mut E) -> RenderStatus
    where
        E: PlaybackEngine + ?Sized,
    {
        let Some(pending) = self.pending.as_mut() else {
            return RenderStatus::Idle;
        };

        let track = engine
            .text_tracks()
            .into_iter()
            .find(|t| t.id == pending.track_id && t.is_showing());
        let Some(track) = track else {
            debug!(track = %pending.track_id, "Track no longer showing, render abandoned");
            self.pending = None;
            return RenderStatus::Superseded;
        };

        if !pending.budget.try_attempt() {
            return self.give_up(engine);
        }

        if !track.has_cues() {
            if pending.budget.is_exhausted() {
                return self.give_up(engine);
            }
            debug!(
                track = %pending.track_id,
                attempt = pending.budget.attempts(),
                "Cues not loaded yet"
            );
            return RenderStatus::Pending {
                retry_in: pending.budget.delay(),
            };
        }

        let rows = Self::build_rows(&track);
        let track_id = pending.track_id.clone();
        self.pending = None;
        self.render_transcript(engine, track_id, rows)
    }

    fn give_up<E>(&mut self, engine: &mut E) -> RenderStatus
    where
        E: PlaybackEngine + ?Sized,
    {
        let Some(pending) = self.pending.take() else {
            return RenderStatus::Idle;
        };
        warn!(
            track = %pending.track_id,
            attempts = pending.budget.attempts(),
            waited_ms = self.retry.max_wait().as_millis() as u64,
            "Cues never loaded, transcript not rendered"
        );
        self.clear_transcript(engine);
        RenderStatus::Exhausted {
            attempts: pending.budget.attempts(),
        }
    }

    fn build_rows(track: &TextTrack) -> Vec<TranscriptRow> {
        track
            .cues
            .iter()
            .map(|cue| TranscriptRow {
                key: cue.key(),
                text: cue.text.clone(),
                highlighted: false,
            })
            .collect()
    }

    fn render_transcript<E>(&mut self, engine: &mut E, track_id: String, rows: Vec<TranscriptRow>) -> RenderStatus
    where
        E: PlaybackEngine + ?Sized,
    {
        let count = rows.len();
        info!(track = %track_id, rows = count, "Transcript rendered");

        self.rows = rows;
        self.track_id = Some(track_id);
        self.state = TranscriptState::Enabled;
        engine.set_width(self.config.transcript_width());

        RenderStatus::Rendered { rows: count }
    }

    fn clear_transcript<E>(&mut self, engine: &mut E)
    where
        E: PlaybackEngine + ?Sized,
    {
        if self.state == TranscriptState::Enabled {
            info!("Transcript disabled");
        }
        self.state = TranscriptState::Disabled;
        self.track_id = None;
        self.rows.clear();
        engine.set_width(ViewportWidth::FULL);
    }

    /// Move the highlight to the cues the engine reports active
    ///
    /// Returns the scroll to perform when at least one row was highlighted;
    /// the last highlighted cue in track order decides the target.
    pub fn on_cue_change<E, L>(&mut self, track_id: &str, engine: &E, layout: &L) -> Option<ScrollRequest>
    where
        E: PlaybackEngine + ?Sized,
        L: TranscriptLayout + ?Sized,
    {
        if self.state != TranscriptState::Enabled || self.track_id.as_deref() != Some(track_id) {
            debug!(track = %track_id, "Cue change ignored for track not rendered");
            return None;
        }

        let track = engine.text_tracks().into_iter().find(|t| t.id == track_id)?;

        for row in &mut self.rows {
            row.highlighted = false;
        }

        let mut scroll_row = None;
        for cue in &track.active_cues {
            let key = cue.key();
            let mut first = None;
            for (index, row) in self.rows.iter_mut().enumerate().filter(|(_, r)| r.key == key) {
                row.highlighted = true;
                first.get_or_insert(index);
            }
            if first.is_some() {
                scroll_row = first;
            }
        }

        let index = scroll_row?;
        let target = scroll_target(layout.scroll_top(), layout.container_top(), layout.row_top(index)?);
        debug!(row = index, target, "Scrolling to active cue");

        Some(ScrollRequest {
            target,
            duration: self.config.scroll_duration(),
        })
    }

    /// Seek to the start of the clicked row's cue
    ///
    /// Returns `false` when no rendered row has that key.
    pub fn click_row<E>(&self, key: CueKey, engine: &mut E) -> bool
    where
        E: PlaybackEngine + ?Sized,
    {
        if !self.rows.iter().any(|r| r.key == key) {
            return false;
        }
        debug!(time = key.seconds(), "Transcript row clicked");
        engine.set_current_time(key.seconds());
        true
    }
}

impl Default for TranscriptSynchronizer {
    fn default() -> Self {
        Self::new(TranscriptConfig::default())
    }
}
