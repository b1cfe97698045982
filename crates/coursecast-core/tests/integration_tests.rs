//! Integration tests for Coursecast Core

use coursecast_core::{
    run, select_default, sort_sources, CueKey, Error, HostArgs, MemorySink, Outcome, PlaybackController,
    PlaybackEngine, PlayerConfig, PlayerEvent, RenderStatus, Source, TextCue, TextTrack, TrackMode,
    TranscriptLayout, TranscriptState, VideoPlayer, ViewportWidth,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

// =============================================================================
// Test Engine
// =============================================================================

#[derive(Debug, Default)]
struct EngineState {
    time: f64,
    paused: bool,
    started: bool,
    source: Option<Source>,
    width: Option<ViewportWidth>,
    tracks: Vec<TextTrack>,
    seeks: Vec<f64>,
}

/// Engine whose state stays reachable after the player takes ownership
#[derive(Debug, Clone, Default)]
struct SharedEngine {
    state: Arc<Mutex<EngineState>>,
}

impl SharedEngine {
    fn new() -> Self {
        let engine = Self::default();
        engine.with(|s| s.paused = true);
        engine
    }

    fn with<T>(&self, f: impl FnOnce(&mut EngineState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }
}

impl PlaybackEngine for SharedEngine {
    fn current_time(&self) -> f64 {
        self.with(|s| s.time)
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.with(|s| {
            s.time = seconds;
            s.seeks.push(seconds);
        })
    }

    fn paused(&self) -> bool {
        self.with(|s| s.paused)
    }

    fn play(&mut self) {
        self.with(|s| {
            s.paused = false;
            s.started = true;
        })
    }

    fn load_source(&mut self, source: &Source) {
        self.with(|s| {
            s.time = 0.0;
            s.source = Some(source.clone());
        })
    }

    fn has_started(&self) -> bool {
        self.with(|s| s.started)
    }

    fn mark_has_started(&mut self) {
        self.with(|s| s.started = true)
    }

    fn hide_big_play_button(&mut self) {}

    fn set_width(&mut self, width: ViewportWidth) {
        self.with(|s| s.width = Some(width))
    }

    fn text_tracks(&self) -> Vec<TextTrack> {
        self.with(|s| s.tracks.clone())
    }
}

struct RowLayout;

impl TranscriptLayout for RowLayout {
    fn scroll_top(&self) -> f64 {
        0.0
    }

    fn container_top(&self) -> f64 {
        50.0
    }

    fn row_top(&self, index: usize) -> Option<f64> {
        Some(50.0 + index as f64 * 24.0)
    }
}

fn src(res: &str) -> Source {
    Source::new(format!("https://cdn.example.com/{}.mp4", res), res, "video/mp4", format!("{}p", res))
}

fn lecture_cues() -> Vec<TextCue> {
    vec![TextCue::new(0.0, 5.0, "A"), TextCue::new(5.0, 10.0, "B")]
}

fn player(engine: SharedEngine) -> VideoPlayer<SharedEngine, RowLayout> {
    VideoPlayer::new(
        engine,
        RowLayout,
        PlayerConfig::default(),
        HostArgs::new("course-v1:Org+C1+2016", "abc123"),
        Box::new(MemorySink::new()),
        vec![src("720"), src("480"), src("1080")],
    )
    .unwrap()
}

// =============================================================================
// Source Selection Tests
// =============================================================================

#[test]
fn test_sort_then_select_preferred() {
    let sorted = sort_sources(vec![src("720"), src("480"), src("1080")]);
    let order: Vec<_> = sorted.iter().map(|s| s.resolution.clone().unwrap()).collect();
    assert_eq!(order, vec!["1080", "720", "480"]);

    assert_eq!(select_default(&sorted, Some(480)).unwrap(), &src("480"));
    assert_eq!(select_default(&sorted, Some(360)).unwrap(), &src("1080"));
}

fn permutations(items: &[Source]) -> Vec<Vec<Source>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut all = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            all.push(tail);
        }
    }
    all
}

#[test]
fn test_sort_then_select_holds_for_every_order() {
    let mut second_480 = src("480");
    second_480.url = "https://mirror.example.com/480.mp4".into();
    let auto = Source::unlabelled("https://cdn.example.com/auto.mp4", "video/mp4", "Auto");
    let pool = vec![src("720"), src("480"), src("1080"), second_480, auto];

    let orders = permutations(&pool);
    assert_eq!(orders.len(), 120);

    for order in orders {
        let sorted = sort_sources(order.clone());
        assert_eq!(sorted.len(), order.len());
        assert!(order.iter().all(|s| sorted.contains(s)));

        for pair in sorted.windows(2) {
            if let (Some(a), Some(b)) = (pair[0].resolution_value(), pair[1].resolution_value()) {
                assert!(a >= b, "{:?} sorted before {:?}", pair[0].resolution, pair[1].resolution);
                if a == b {
                    let first = order.iter().position(|s| s == &pair[0]);
                    let second = order.iter().position(|s| s == &pair[1]);
                    assert!(first < second, "equal resolutions reordered");
                }
            }
        }

        for preferred in [1080, 720, 480, 360] {
            let chosen = select_default(&sorted, Some(preferred)).unwrap();
            match sorted.iter().find(|s| s.resolution_value() == Some(f64::from(preferred))) {
                Some(expected) => assert_eq!(chosen, expected),
                None => assert_eq!(chosen, &sorted[0]),
            }
        }
    }
}

#[test]
fn test_sort_fully_orders_labelled_lists() {
    let pool = vec![src("240"), src("720"), src("480"), src("1080")];
    for order in permutations(&pool) {
        let sorted = sort_sources(order);
        let resolutions: Vec<_> = sorted.iter().map(|s| s.resolution.clone().unwrap()).collect();
        assert_eq!(resolutions, vec!["1080", "720", "480", "240"]);
        assert_eq!(select_default(&sorted, Some(480)).unwrap(), &src("480"));
        assert_eq!(select_default(&sorted, Some(360)).unwrap(), &src("1080"));
    }
}

#[test]
fn test_select_default_empty_fails() {
    assert!(matches!(select_default(&[], None), Err(Error::NoSourcesAvailable)));
}

#[test]
fn test_initialize_with_preferred_resolution() {
    let mut engine = SharedEngine::new();
    let mut controller = PlaybackController::default();
    let chosen = controller
        .initialize(&mut engine, vec![src("720"), src("480"), src("1080")], Some(480))
        .unwrap();

    assert_eq!(chosen, src("480"));
    assert_eq!(engine.with(|s| s.source.clone()), Some(src("480")));
}

// =============================================================================
// Resolution Switch Tests
// =============================================================================

#[test]
fn test_switch_to_current_is_noop() {
    let engine = SharedEngine::new();
    let mut player = player(engine.clone());
    let mut changes = player.controller().subscribe();
    let current = player.controller().current_source().cloned().unwrap();

    assert!(!player.switch_to(&current));
    assert!(changes.try_recv().is_err());
    assert!(engine.with(|s| s.seeks.is_empty()));
}

#[test]
fn test_switch_preserves_position_and_playing() {
    let engine = SharedEngine::new();
    let mut player = player(engine.clone());
    engine.with(|s| {
        s.time = 73.25;
        s.paused = false;
    });

    assert!(player.switch_to(&src("480")));
    engine.with(|s| {
        assert!((s.time - 73.25).abs() < 1e-9);
        assert!(!s.paused);
        assert_eq!(s.source, Some(src("480")));
    });
}

#[test]
fn test_switch_preserves_paused() {
    let engine = SharedEngine::new();
    let mut player = player(engine.clone());
    engine.with(|s| s.time = 8.0);

    assert!(player.switch_to(&src("720")));
    engine.with(|s| {
        assert_eq!(s.time, 8.0);
        assert!(s.paused);
        assert!(s.started);
    });
}

#[test]
fn test_menu_follows_switches() {
    let engine = SharedEngine::new();
    let mut player = player(engine);

    // Catalog order: 1080, 720, 480
    player.handle(PlayerEvent::MenuEntryActivated(1)).unwrap();
    let menu = player.controller().menu().unwrap();
    assert_eq!(menu.selected().unwrap().source, src("720"));
    assert_eq!(menu.label(), Some("720p"));

    player
        .handle(PlayerEvent::SourcesUpdated(vec![src("360"), src("240")]))
        .unwrap();
    let menu = player.controller().menu().unwrap();
    assert_eq!(menu.entries().len(), 2);
    assert_eq!(menu.selected().unwrap().source, src("360"));
    assert_eq!(player.controller().subscriber_count(), 1);
}

#[test]
fn test_empty_source_update_is_reported() {
    let mut player = player(SharedEngine::new());
    let err = player.handle(PlayerEvent::SourcesUpdated(Vec::new())).unwrap_err();
    assert!(matches!(err, Error::NoSourcesAvailable));
    assert_eq!(player.controller().current_source(), Some(&src("1080")));
}

// =============================================================================
// Transcript Tests
// =============================================================================

fn showing_player() -> (VideoPlayer<SharedEngine, RowLayout>, SharedEngine) {
    let engine = SharedEngine::new();
    engine.with(|s| {
        s.tracks = vec![TextTrack::new("en", "English", "en")
            .with_mode(TrackMode::Showing)
            .with_cues(lecture_cues())]
    });
    let mut player = player(engine.clone());
    player.handle(PlayerEvent::LoadedMetadata).unwrap();
    player.handle(PlayerEvent::TracksChanged).unwrap();
    (player, engine)
}

#[test]
fn test_cue_change_highlights_single_row() {
    let (mut player, engine) = showing_player();
    engine.with(|s| s.tracks[0].active_cues = vec![TextCue::new(5.0, 10.0, "B")]);

    let outcome = player
        .handle(PlayerEvent::CueChange { track_id: "en".into() })
        .unwrap();

    assert_eq!(player.transcript().current_cue_keys(), vec![CueKey(5.0)]);
    let scroll = outcome.scroll.unwrap();
    assert_eq!(scroll.target, 24.0);
    assert_eq!(scroll.duration, Duration::from_millis(500));
}

#[test]
fn test_hiding_track_disables_transcript() {
    let (mut player, engine) = showing_player();
    engine.with(|s| s.tracks[0].active_cues = vec![TextCue::new(0.0, 5.0, "A")]);
    player
        .handle(PlayerEvent::CueChange { track_id: "en".into() })
        .unwrap();
    assert!(player.transcript().is_enabled());

    engine.with(|s| s.tracks[0].mode = TrackMode::Hidden);
    let outcome = player.handle(PlayerEvent::TracksChanged).unwrap();

    assert_eq!(outcome.render, Some(RenderStatus::Disabled));
    assert_eq!(player.transcript().state(), TranscriptState::Disabled);
    assert!(player.transcript().current_cue_keys().is_empty());
    assert_eq!(engine.with(|s| s.width), Some(ViewportWidth::FULL));
}

#[test]
fn test_row_click_seeks_once() {
    let (mut player, engine) = showing_player();
    engine.with(|s| s.seeks.clear());

    player
        .handle(PlayerEvent::TranscriptRowClicked(CueKey(5.0)))
        .unwrap();
    assert_eq!(engine.with(|s| s.seeks.clone()), vec![5.0]);
}

// =============================================================================
// Event Loop Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_run_retries_until_cues_load() {
    let engine = SharedEngine::new();
    engine.with(|s| {
        s.tracks = vec![TextTrack::new("en", "English", "en").with_mode(TrackMode::Showing)]
    });
    let player = player(engine.clone());

    let (tx, rx) = mpsc::unbounded_channel();
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<Outcome>();

    let driver = async {
        tx.send(PlayerEvent::LoadedMetadata).unwrap();
        tx.send(PlayerEvent::TracksChanged).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        engine.with(|s| s.tracks[0].cues = lecture_cues());
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(tx);
    };

    let (player, ()) = tokio::join!(run(player, rx, outcome_tx), driver);

    assert_eq!(player.transcript().state(), TranscriptState::Enabled);
    assert_eq!(player.transcript().rows().len(), 2);

    let mut renders = Vec::new();
    while let Ok(outcome) = outcome_rx.try_recv() {
        if let Some(render) = outcome.render {
            renders.push(render);
        }
    }
    assert!(renders.len() > 2);
    assert!(matches!(renders[0], RenderStatus::Pending { .. }));
    assert_eq!(renders.last(), Some(&RenderStatus::Rendered { rows: 2 }));
}

#[tokio::test(start_paused = true)]
async fn test_run_abandons_render_when_track_hidden() {
    let engine = SharedEngine::new();
    engine.with(|s| {
        s.tracks = vec![TextTrack::new("en", "English", "en").with_mode(TrackMode::Showing)]
    });
    let player = player(engine.clone());

    let (tx, rx) = mpsc::unbounded_channel();
    let (outcome_tx, _outcome_rx) = mpsc::unbounded_channel();

    let driver = async {
        tx.send(PlayerEvent::LoadedMetadata).unwrap();
        tx.send(PlayerEvent::TracksChanged).unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        // Cues arrive only after the track stopped showing
        engine.with(|s| {
            s.tracks[0].mode = TrackMode::Disabled;
            s.tracks[0].cues = lecture_cues();
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(tx);
    };

    let (player, ()) = tokio::join!(run(player, rx, outcome_tx), driver);

    assert_eq!(player.transcript().state(), TranscriptState::Disabled);
    assert!(player.transcript().rows().is_empty());
    assert!(!player.transcript().has_pending_render());
}
