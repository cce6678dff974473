//! Viewport synchronization across stacked panes.
//!
//! The primary (price) pane owns the visible logical range. Whenever it
//! changes, the range is copied verbatim to every sibling. Sibling changes
//! stay local: they are recorded for that sibling and never sent back, which
//! keeps the panes free of feedback loops.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Visible window in index space. Fractional values are allowed; renderers
/// pad a little past the first and last bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRange {
    pub from: f64,
    pub to: f64,
}

impl ViewportRange {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    /// Range showing every bar of a series with `len` bars.
    pub fn full(len: usize) -> Option<Self> {
        (len > 0).then(|| Self::new(0.0, (len - 1) as f64))
    }

    pub fn span(&self) -> f64 {
        self.to - self.from
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaneId {
    Price,
    Volume,
    Oscillator,
    Custom(String),
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaneId::Price => f.write_str("price"),
            PaneId::Volume => f.write_str("volume"),
            PaneId::Oscillator => f.write_str("oscillator"),
            PaneId::Custom(name) => f.write_str(name),
        }
    }
}

/// Receives ranges pushed to sibling panes.
pub trait ViewportSink {
    fn apply_range(&mut self, pane: &PaneId, range: ViewportRange);
}

/// Sink that drops every update; useful when only stored ranges matter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ViewportSink for NullSink {
    fn apply_range(&mut self, _pane: &PaneId, _range: ViewportRange) {}
}

/// What a range-change event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Primary changed; the range went to this many siblings.
    Propagated(usize),
    /// A sibling changed; only its own stored range was updated.
    Local,
    /// The pane is not registered.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct ViewportSyncCoordinator {
    primary: PaneId,
    primary_range: Option<ViewportRange>,
    siblings: Vec<(PaneId, Option<ViewportRange>)>,
    fitted: bool,
}

impl ViewportSyncCoordinator {
    pub fn new(primary: PaneId, siblings: impl IntoIterator<Item = PaneId>) -> Self {
        let mut coordinator = Self {
            primary,
            primary_range: None,
            siblings: Vec::new(),
            fitted: false,
        };
        for pane in siblings {
            coordinator.add_sibling(pane);
        }
        coordinator
    }

    /// Price pane primary, volume and oscillator siblings.
    pub fn standard() -> Self {
        Self::new(PaneId::Price, [PaneId::Volume, PaneId::Oscillator])
    }

    /// Register a sibling. A new sibling starts at the primary's range.
    pub fn add_sibling(&mut self, pane: PaneId) {
        if pane == self.primary || self.siblings.iter().any(|(p, _)| *p == pane) {
            return;
        }
        self.siblings.push((pane, self.primary_range));
    }

    pub fn primary(&self) -> &PaneId {
        &self.primary
    }

    pub fn siblings(&self) -> impl Iterator<Item = &PaneId> {
        self.siblings.iter().map(|(p, _)| p)
    }

    /// Stored range for any registered pane.
    pub fn range(&self, pane: &PaneId) -> Option<ViewportRange> {
        if *pane == self.primary {
            return self.primary_range;
        }
        self.siblings
            .iter()
            .find(|(p, _)| p == pane)
            .and_then(|(_, r)| *r)
    }

    pub fn has_fitted(&self) -> bool {
        self.fitted
    }

    /// Handle a range change reported by `pane`.
    pub fn on_range_changed(
        &mut self,
        pane: &PaneId,
        range: ViewportRange,
        sink: &mut dyn ViewportSink,
    ) -> SyncOutcome {
        if *pane == self.primary {
            self.primary_range = Some(range);
            for (sibling, stored) in &mut self.siblings {
                *stored = Some(range);
                sink.apply_range(sibling, range);
            }
            return SyncOutcome::Propagated(self.siblings.len());
        }
        match self.siblings.iter_mut().find(|(p, _)| p == pane) {
            Some((_, stored)) => {
                *stored = Some(range);
                SyncOutcome::Local
            }
            None => {
                debug!(%pane, "range change from unregistered pane ignored");
                SyncOutcome::Ignored
            }
        }
    }

    /// Fit the primary to `len` bars and push the result to every sibling.
    ///
    /// Allowed once per data set; later calls (and empty data) return `None`
    /// and leave every range untouched.
    pub fn fit_primary(&mut self, len: usize, sink: &mut dyn ViewportSink) -> Option<ViewportRange> {
        if self.fitted {
            return None;
        }
        let range = ViewportRange::full(len)?;
        self.fitted = true;
        let primary = self.primary.clone();
        sink.apply_range(&primary, range);
        self.on_range_changed(&primary, range, sink);
        Some(range)
    }

    /// Forget stored ranges and allow a new fit, for a new data set.
    pub fn reset(&mut self) {
        self.fitted = false;
        self.primary_range = None;
        for (_, stored) in &mut self.siblings {
            *stored = None;
        }
    }
}
