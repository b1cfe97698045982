//! Resolution menu state
//!
//! The menu never reads the controller's current source. Its selected flags
//! and label are recomputed from each resolution change notification it
//! receives. Each menu holds one subscription, released when the menu is
//! disposed or dropped.

use crate::{controller::ResolutionChange, types::Source, Error, Result};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::debug;

/// One selectable resolution
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    /// Source this entry switches to
    pub source: Source,
    /// Whether this entry matches the last notified source
    pub selected: bool,
}

impl MenuEntry {
    fn new(source: Source) -> Self {
        Self { source, selected: false }
    }

    /// Accessibility selection state ("true" / "false")
    pub fn aria_selected(&self) -> &'static str {
        if self.selected {
            "true"
        } else {
            "false"
        }
    }
}

/// Resolution menu bound to one catalog
#[derive(Debug)]
pub struct ResolutionMenu {
    entries: Vec<MenuEntry>,
    label: Option<String>,
    changes: broadcast::Receiver<ResolutionChange>,
}

impl ResolutionMenu {
    /// Build a menu with one entry per source
    pub fn new(sources: &[Source], changes: broadcast::Receiver<ResolutionChange>) -> Self {
        Self {
            entries: sources.iter().cloned().map(MenuEntry::new).collect(),
            label: None,
            changes,
        }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Label of the last notified source
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Entry currently flagged as selected
    pub fn selected(&self) -> Option<&MenuEntry> {
        self.entries.iter().find(|e| e.selected)
    }

    /// Source bound to the entry at `index`
    pub fn activate(&self, index: usize) -> Result<&Source> {
        self.entries
            .get(index)
            .map(|e| &e.source)
            .ok_or(Error::UnknownMenuEntry { index })
    }

    /// Apply every notification delivered since the last call
    ///
    /// Returns the number of notifications applied.
    pub fn process_notifications(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.changes.try_recv() {
                Ok(change) => {
                    self.apply(&change);
                    applied += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "Resolution menu lagged behind notifications");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        applied
    }

    fn apply(&mut self, change: &ResolutionChange) {
        for entry in &mut self.entries {
            entry.selected = entry.source == change.source;
        }
        self.label = Some(change.source.label.clone());
    }

    /// Release the menu and its subscription
    pub fn dispose(self) {
        debug!(entries = self.entries.len(), "Resolution menu disposed");
    }
}
