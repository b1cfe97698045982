//! Video player - wires the controller, menu, transcript and event bridge
//! to one engine
//!
//! Everything runs on a single logical thread. The host delivers engine
//! and UI signals as [`PlayerEvent`]s, either by calling
//! [`VideoPlayer::handle`] directly from its own loop or by feeding a
//! channel consumed by [`run`].

use crate::{
    bridge::{whole_seconds, EventBridge, EventSink, PlaybackEvent},
    controller::PlaybackController,
    engine::PlaybackEngine,
    transcript::{RenderStatus, ScrollRequest, TranscriptLayout, TranscriptSynchronizer},
    types::{CueKey, HostArgs, PlayerConfig, Source},
    Result,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, instrument, warn};

/// Signals delivered to the player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Engine metadata loaded, text tracks can be observed
    LoadedMetadata,
    /// Text tracks added, removed or changed mode
    TracksChanged,
    /// Active cues changed on a track
    CueChange { track_id: String },
    /// Resolution menu entry clicked
    MenuEntryActivated(usize),
    /// Transcript row clicked
    TranscriptRowClicked(CueKey),
    /// Host supplied a new source list
    SourcesUpdated(Vec<Source>),
    /// Deferred transcript render is due
    RenderRetry,
    /// Engine started loading a source
    LoadStart,
    /// Engine started playing
    Play,
    /// Engine paused
    Pause,
    /// Engine finished a seek
    Seeked,
    /// Engine reached the end
    Ended,
    /// Engine playback rate changed
    RateChange,
}

/// What handling one event produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Transcript render result, when the event touched rendering
    pub render: Option<RenderStatus>,
    /// Scroll the presentation layer should animate
    pub scroll: Option<ScrollRequest>,
    /// Whether a source switch happened
    pub switched: bool,
    /// Playback event emitted to the bridge
    pub logged: Option<PlaybackEvent>,
}

impl Outcome {
    /// Delay after which [`PlayerEvent::RenderRetry`] should be delivered
    pub fn retry_after(&self) -> Option<Duration> {
        match self.render {
            Some(RenderStatus::Pending { retry_in }) => Some(retry_in),
            _ => None,
        }
    }
}

/// One embedded player instance
pub struct VideoPlayer<E, L> {
    engine: E,
    layout: L,
    controller: PlaybackController,
    transcript: TranscriptSynchronizer,
    bridge: EventBridge,
    /// Track signals are observed once metadata is loaded
    tracks_attached: bool,
}

impl<E, L> VideoPlayer<E, L>
where
    E: PlaybackEngine,
    L: TranscriptLayout,
{
    /// Build the player and assign its initial source
    ///
    /// Fails with `NoSourcesAvailable` when `sources` is empty; no player is
    /// constructed in that case.
    #[instrument(skip_all, fields(course_id = %args.course_id, video_id = %args.video_id))]
    pub fn new(
        mut engine: E,
        layout: L,
        config: PlayerConfig,
        args: HostArgs,
        sink: Box<dyn EventSink>,
        sources: Vec<Source>,
    ) -> Result<Self> {
        config.validate()?;

        let mut controller = PlaybackController::new(config.switcher.clone(), config.resolution_change_capacity);
        controller.update_sources(&mut engine, sources)?;

        let mut bridge = EventBridge::new(args, sink);
        bridge.emit(PlaybackEvent::VideoPlayerReady);
        info!("Video player ready");

        Ok(Self {
            engine,
            layout,
            controller,
            transcript: TranscriptSynchronizer::new(config.transcript),
            bridge,
            tracks_attached: false,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn transcript(&self) -> &TranscriptSynchronizer {
        &self.transcript
    }

    pub fn args(&self) -> &HostArgs {
        self.bridge.args()
    }

    /// Handle one signal
    pub fn handle(&mut self, event: PlayerEvent) -> Result<Outcome> {
        debug!(event = ?event, "Player event");
        let mut outcome = Outcome::default();

        match event {
            PlayerEvent::LoadedMetadata => {
                if !self.tracks_attached {
                    self.tracks_attached = true;
                    debug!("Text track listeners attached");
                }
            }
            PlayerEvent::TracksChanged => {
                if self.tracks_attached {
                    outcome.render = Some(self.transcript.on_tracks_changed(&mut self.engine));
                }
            }
            PlayerEvent::RenderRetry => {
                outcome.render = Some(self.transcript.retry_render(&mut self.engine));
            }
            PlayerEvent::CueChange { track_id } => {
                if self.tracks_attached {
                    outcome.scroll = self.transcript.on_cue_change(&track_id, &self.engine, &self.layout);
                }
            }
            PlayerEvent::TranscriptRowClicked(key) => {
                self.transcript.click_row(key, &mut self.engine);
            }
            PlayerEvent::MenuEntryActivated(index) => {
                outcome.switched = self.controller.select_menu_entry(&mut self.engine, index)?;
            }
            PlayerEvent::SourcesUpdated(sources) => {
                self.controller.update_sources(&mut self.engine, sources)?;
            }
            PlayerEvent::LoadStart => {
                outcome.logged = Some(self.log(PlaybackEvent::LoadVideo));
            }
            PlayerEvent::Play => {
                let current_time = self.current_seconds();
                outcome.logged = Some(self.log(PlaybackEvent::PlayVideo { current_time }));
            }
            PlayerEvent::Pause => {
                let current_time = self.current_seconds();
                outcome.logged = Some(self.log(PlaybackEvent::PauseVideo { current_time }));
            }
            PlayerEvent::Ended => {
                let current_time = self.current_seconds();
                outcome.logged = Some(self.log(PlaybackEvent::StopVideo { current_time }));
            }
            PlayerEvent::Seeked => {
                let new_time = self.current_seconds();
                outcome.logged = Some(self.log(PlaybackEvent::SeekVideo { new_time }));
            }
            PlayerEvent::RateChange => {
                let current_time = self.current_seconds();
                let new_speed = self.engine.playback_rate();
                outcome.logged = Some(self.log(PlaybackEvent::SpeedChangeVideo { current_time, new_speed }));
            }
        }

        Ok(outcome)
    }

    /// Switch to a source directly, bypassing the menu
    pub fn switch_to(&mut self, source: &Source) -> bool {
        self.controller.switch_to(&mut self.engine, source)
    }

    fn current_seconds(&self) -> i64 {
        whole_seconds(self.engine.current_time())
    }

    fn log(&mut self, event: PlaybackEvent) -> PlaybackEvent {
        self.bridge.emit(event.clone());
        event
    }
}

/// Drive a player from a channel of events until the channel closes
///
/// Deferred transcript renders are scheduled on the tokio clock. Every
/// outcome is forwarded to `outcomes`; a dropped receiver is ignored.
pub async fn run<E, L>(
    mut player: VideoPlayer<E, L>,
    mut events: mpsc::UnboundedReceiver<PlayerEvent>,
    outcomes: mpsc::UnboundedSender<Outcome>,
) -> VideoPlayer<E, L>
where
    E: PlaybackEngine,
    L: TranscriptLayout,
{
    let mut retry_at: Option<Instant> = None;

    loop {
        let deadline = retry_at.unwrap_or_else(Instant::now);
        let event = tokio::select! {
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
            _ = sleep_until(deadline), if retry_at.is_some() => {
                retry_at = None;
                PlayerEvent::RenderRetry
            }
        };

        match player.handle(event) {
            Ok(outcome) => {
                if let Some(delay) = outcome.retry_after() {
                    retry_at = Some(Instant::now() + delay);
                } else if outcome.render.is_some() {
                    retry_at = None;
                }
                let _ = outcomes.send(outcome);
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "Player event failed");
            }
        }
    }

    debug!("Player event channel closed");
    player
}
