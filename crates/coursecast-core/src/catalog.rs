//! Source catalog and selection policy
//!
//! Sources are ordered by descending resolution. Sources without a usable
//! numeric resolution compare as equal to everything, so the comparison is
//! not a total order: sorting uses a stable insertion sort that never
//! reorders such a pair, which keeps the output deterministic (the standard
//! library sorts may panic on comparators that are not total orders).

use crate::{types::Source, Error, Result};
use std::cmp::Ordering;
use tracing::debug;

/// Compare two sources for descending resolution order
///
/// Returns `Equal` when either side lacks a numeric resolution.
pub fn compare_resolutions(a: &Source, b: &Source) -> Ordering {
    match (a.resolution_value(), b.resolution_value()) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Sort sources by descending resolution, stable for ties
pub fn sort_sources(mut sources: Vec<Source>) -> Vec<Source> {
    for i in 1..sources.len() {
        let mut j = i;
        while j > 0 && compare_resolutions(&sources[j - 1], &sources[j]) == Ordering::Greater {
            sources.swap(j - 1, j);
            j -= 1;
        }
    }
    sources
}

/// Pick the first source whose resolution equals `preferred`, else the first source
pub fn select_default(sources: &[Source], preferred: Option<u32>) -> Result<&Source> {
    let first = sources.first().ok_or(Error::NoSourcesAvailable)?;

    let Some(preferred) = preferred else {
        return Ok(first);
    };

    let chosen = sources
        .iter()
        .find(|s| s.resolution_value() == Some(f64::from(preferred)))
        .unwrap_or(first);

    debug!(
        preferred,
        chosen = chosen.resolution.as_deref().unwrap_or("-"),
        "Default source selected"
    );

    Ok(chosen)
}

/// Ordered set of candidate sources for one video load
///
/// Immutable once built; a new source list replaces the catalog wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceCatalog {
    sources: Vec<Source>,
}

impl SourceCatalog {
    /// Build a sorted catalog, rejecting empty source lists
    pub fn new(sources: Vec<Source>) -> Result<Self> {
        if sources.is_empty() {
            return Err(Error::NoSourcesAvailable);
        }
        Ok(Self {
            sources: sort_sources(sources),
        })
    }

    /// Sources in catalog order
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Source> {
        self.sources.get(index)
    }

    /// Default source for the preferred resolution
    pub fn default_source(&self, preferred: Option<u32>) -> Result<&Source> {
        select_default(&self.sources, preferred)
    }

    /// Position of a source in the catalog
    pub fn position(&self, source: &Source) -> Option<usize> {
        self.sources.iter().position(|s| s == source)
    }
}
