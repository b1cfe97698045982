//! Recording engine used by unit tests

use crate::{
    engine::PlaybackEngine,
    types::{Source, TextTrack, ViewportWidth},
};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    SetCurrentTime(f64),
    Play,
    LoadSource(String),
    MarkHasStarted,
    HideBigPlayButton,
    SetWidth(ViewportWidth),
}

#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub time: f64,
    pub paused: bool,
    pub rate: f64,
    pub started: bool,
    pub source: Option<Source>,
    pub width: Option<ViewportWidth>,
    pub tracks: Vec<TextTrack>,
    pub calls: Vec<EngineCall>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            paused: true,
            rate: 1.0,
            ..Default::default()
        }
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::SetCurrentTime(t) => Some(*t),
                _ => None,
            })
            .collect()
    }
}

impl PlaybackEngine for RecordingEngine {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.time = seconds;
        self.calls.push(EngineCall::SetCurrentTime(seconds));
    }

    fn paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) {
        self.paused = false;
        self.started = true;
        self.calls.push(EngineCall::Play);
    }

    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn load_source(&mut self, source: &Source) {
        // Loading a new source resets the engine position
        self.time = 0.0;
        self.source = Some(source.clone());
        self.calls.push(EngineCall::LoadSource(source.url.clone()));
    }

    fn has_started(&self) -> bool {
        self.started
    }

    fn mark_has_started(&mut self) {
        self.started = true;
        self.calls.push(EngineCall::MarkHasStarted);
    }

    fn hide_big_play_button(&mut self) {
        self.calls.push(EngineCall::HideBigPlayButton);
    }

    fn set_width(&mut self, width: ViewportWidth) {
        self.width = Some(width);
        self.calls.push(EngineCall::SetWidth(width));
    }

    fn text_tracks(&self) -> Vec<TextTrack> {
        self.tracks.clone()
    }
}
