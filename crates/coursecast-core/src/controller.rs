//! Playback controller - resolution switching
//!
//! Owns the current source pointer for one player instance and swaps
//! sources without losing the playback position:
//! - snapshot time and pause state
//! - assign the new source and notify subscribers
//! - restore the position and resume (or keep the started look)

use crate::{
    catalog::SourceCatalog,
    engine::PlaybackEngine,
    menu::ResolutionMenu,
    types::{PlaybackSnapshot, Source, SwitcherConfig},
    Error, Result,
};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

/// Notification emitted whenever a new source is assigned
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionChange {
    /// The source now assigned to the engine
    pub source: Source,
}

/// Resolution switcher for one player
pub struct PlaybackController {
    /// Switcher options
    config: SwitcherConfig,
    /// Catalog from the last source list
    catalog: Option<SourceCatalog>,
    /// Source currently assigned to the engine
    current: Option<Source>,
    /// Resolution change broadcaster
    changes: broadcast::Sender<ResolutionChange>,
    /// Menu for the current catalog
    menu: Option<ResolutionMenu>,
}

impl PlaybackController {
    /// Create a controller with no sources
    pub fn new(config: SwitcherConfig, capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity.max(1));
        Self {
            config,
            catalog: None,
            current: None,
            changes,
            menu: None,
        }
    }

    /// Subscribe to resolution changes
    pub fn subscribe(&self) -> broadcast::Receiver<ResolutionChange> {
        self.changes.subscribe()
    }

    /// Number of live resolution change subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    /// Source currently assigned to the engine
    pub fn current_source(&self) -> Option<&Source> {
        self.current.as_ref()
    }

    pub fn catalog(&self) -> Option<&SourceCatalog> {
        self.catalog.as_ref()
    }

    pub fn menu(&self) -> Option<&ResolutionMenu> {
        self.menu.as_ref()
    }

    /// Load a new source list using the configured default resolution
    pub fn update_sources<E>(&mut self, engine: &mut E, sources: Vec<Source>) -> Result<Source>
    where
        E: PlaybackEngine + ?Sized,
    {
        let preferred = self.config.default_resolution;
        self.initialize(engine, sources, preferred)
    }

    /// Build the catalog, rebuild the menu and assign the default source
    ///
    /// There is no prior playback state to carry over, so the assignment
    /// skips the snapshot/restore steps of [`switch_to`](Self::switch_to).
    #[instrument(skip(self, engine, sources), fields(count = sources.len()))]
    pub fn initialize<E>(&mut self, engine: &mut E, sources: Vec<Source>, preferred: Option<u32>) -> Result<Source>
    where
        E: PlaybackEngine + ?Sized,
    {
        let catalog = SourceCatalog::new(sources)?;
        let default = catalog.default_source(preferred)?.clone();

        // The old menu's subscription must be gone before the new one attaches
        if let Some(old) = self.menu.take() {
            old.dispose();
        }
        if catalog.len() > 1 {
            self.menu = Some(ResolutionMenu::new(catalog.sources(), self.changes.subscribe()));
        }
        self.catalog = Some(catalog);

        info!(
            url = %default.url,
            resolution = default.resolution.as_deref().unwrap_or("-"),
            "Initial source selected"
        );
        self.set_source(engine, default.clone());

        Ok(default)
    }

    /// Assign a source and notify subscribers
    pub fn set_source<E>(&mut self, engine: &mut E, source: Source)
    where
        E: PlaybackEngine + ?Sized,
    {
        engine.load_source(&source);
        self.current = Some(source.clone());

        // No subscribers is fine
        let _ = self.changes.send(ResolutionChange { source });

        if let Some(menu) = self.menu.as_mut() {
            menu.process_notifications();
        }
    }

    /// Switch to another source, keeping position and play state
    ///
    /// Returns `false` without touching the engine when `source` is already
    /// the current one.
    pub fn switch_to<E>(&mut self, engine: &mut E, source: &Source) -> bool
    where
        E: PlaybackEngine + ?Sized,
    {
        if self.current.as_ref() == Some(source) {
            debug!(url = %source.url, "Source already current");
            return false;
        }

        engine.hide_big_play_button();
        let snapshot = Self::snapshot(engine);

        info!(
            url = %source.url,
            resolution = source.resolution.as_deref().unwrap_or("-"),
            position = snapshot.current_time,
            paused = snapshot.paused,
            has_started = snapshot.has_started,
            "Switching source"
        );
        self.set_source(engine, source.clone());

        engine.set_current_time(snapshot.current_time);
        if !snapshot.paused {
            engine.play();
        } else {
            // Without the marker the player shows its fresh-load controls
            engine.mark_has_started();
        }

        true
    }

    /// Switch to the source bound to a menu entry
    pub fn select_menu_entry<E>(&mut self, engine: &mut E, index: usize) -> Result<bool>
    where
        E: PlaybackEngine + ?Sized,
    {
        let source = self
            .menu
            .as_ref()
            .ok_or(Error::UnknownMenuEntry { index })?
            .activate(index)?
            .clone();
        Ok(self.switch_to(engine, &source))
    }

    fn snapshot<E>(engine: &E) -> PlaybackSnapshot
    where
        E: PlaybackEngine + ?Sized,
    {
        PlaybackSnapshot {
            current_time: engine.current_time(),
            paused: engine.paused(),
            has_started: engine.has_started(),
        }
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(SwitcherConfig::default(), 16)
    }
}
