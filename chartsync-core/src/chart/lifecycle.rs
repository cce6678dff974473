//! Readiness guard for rendering surfaces.
//!
//! Series must not be built against a pane that isn't laid out yet. The
//! guard polls a [`SurfaceProbe`] for every required pane with a bounded
//! number of attempts. Running out of attempts is terminal for the current
//! construction; only [`ChartLifecycleGuard::reset`] (a new construction
//! request) re-arms it.
//!
//! Hosts with a real readiness signal can call [`ChartLifecycleGuard::poll`]
//! once when it fires. Timer-driven hosts use
//! [`ChartLifecycleGuard::wait_until_ready`] with a [`Sleeper`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::viewport::PaneId;
use crate::error::ChartError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub initial_delay_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 15,
            retry_delay_ms: 300,
            initial_delay_ms: 500,
        }
    }
}

impl LifecycleConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

/// Measured size of a rendering surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Host-side lookup of a pane's surface. `None` means it doesn't exist yet.
pub trait SurfaceProbe {
    fn measure(&self, pane: &PaneId) -> Option<SurfaceSize>;
}

pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Ready,
    /// Not ready; try again after `delay`.
    Retry { attempt: u32, delay: Duration },
}

#[derive(Debug, Clone, PartialEq)]
enum GuardState {
    Pending,
    Ready,
    Failed(ChartError),
}

#[derive(Debug, Clone)]
pub struct ChartLifecycleGuard {
    config: LifecycleConfig,
    surfaces: Vec<PaneId>,
    attempts: u32,
    state: GuardState,
}

impl ChartLifecycleGuard {
    pub fn new(config: LifecycleConfig, surfaces: impl IntoIterator<Item = PaneId>) -> Self {
        Self {
            config,
            surfaces: surfaces.into_iter().collect(),
            attempts: 0,
            state: GuardState::Pending,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_ready(&self) -> bool {
        self.state == GuardState::Ready
    }

    pub fn surfaces(&self) -> &[PaneId] {
        &self.surfaces
    }

    /// Re-arm for a new construction request.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.state = GuardState::Pending;
    }

    /// One readiness check. After a terminal failure every call returns the
    /// same error until [`reset`](Self::reset).
    pub fn poll(&mut self, probe: &dyn SurfaceProbe) -> Result<PollOutcome, ChartError> {
        match &self.state {
            GuardState::Ready => return Ok(PollOutcome::Ready),
            GuardState::Failed(err) => return Err(err.clone()),
            GuardState::Pending => {}
        }

        self.attempts += 1;
        let Some(blocker) = self.first_blocker(probe) else {
            debug!(attempts = self.attempts, "chart surfaces ready");
            self.state = GuardState::Ready;
            return Ok(PollOutcome::Ready);
        };

        if self.attempts >= self.config.max_attempts {
            let err = blocker.into_error(self.attempts);
            warn!(error = %err, "giving up on chart surfaces");
            self.state = GuardState::Failed(err.clone());
            return Err(err);
        }

        debug!(attempt = self.attempts, pane = %blocker.pane(), "chart surface not ready");
        Ok(PollOutcome::Retry {
            attempt: self.attempts,
            delay: self.config.retry_delay(),
        })
    }

    /// Poll until ready or out of attempts, sleeping between checks.
    pub fn wait_until_ready(
        &mut self,
        probe: &dyn SurfaceProbe,
        sleeper: &mut dyn Sleeper,
    ) -> Result<(), ChartError> {
        if self.state == GuardState::Pending && self.attempts == 0 {
            sleeper.sleep(self.config.initial_delay());
        }
        loop {
            match self.poll(probe)? {
                PollOutcome::Ready => return Ok(()),
                PollOutcome::Retry { delay, .. } => sleeper.sleep(delay),
            }
        }
    }

    fn first_blocker(&self, probe: &dyn SurfaceProbe) -> Option<Blocker> {
        self.surfaces.iter().find_map(|pane| match probe.measure(pane) {
            None => Some(Blocker::Missing(pane.clone())),
            Some(size) if !(size.width > 0.0) => Some(Blocker::Unsized(pane.clone(), size)),
            Some(_) => None,
        })
    }
}

enum Blocker {
    Missing(PaneId),
    Unsized(PaneId, SurfaceSize),
}

impl Blocker {
    fn pane(&self) -> &PaneId {
        match self {
            Blocker::Missing(p) | Blocker::Unsized(p, _) => p,
        }
    }

    fn into_error(self, attempts: u32) -> ChartError {
        match self {
            Blocker::Missing(pane) => ChartError::SurfaceMissing { pane, attempts },
            Blocker::Unsized(pane, size) => ChartError::SurfaceUnsized {
                pane,
                width: size.width,
                height: size.height,
                attempts,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    /// Surfaces appear after a number of measurements.
    struct DelayedProbe {
        sizes: HashMap<PaneId, SurfaceSize>,
        ready_after: u32,
        calls: Cell<u32>,
    }

    impl DelayedProbe {
        fn new(ready_after: u32) -> Self {
            let sizes = [PaneId::Price, PaneId::Volume]
                .into_iter()
                .map(|p| (p, SurfaceSize::new(800.0, 300.0)))
                .collect();
            Self { sizes, ready_after, calls: Cell::new(0) }
        }
    }

    impl SurfaceProbe for DelayedProbe {
        fn measure(&self, pane: &PaneId) -> Option<SurfaceSize> {
            if *pane == PaneId::Price {
                self.calls.set(self.calls.get() + 1);
            }
            if self.calls.get() <= self.ready_after {
                return None;
            }
            self.sizes.get(pane).copied()
        }
    }

    struct ZeroWidth;

    impl SurfaceProbe for ZeroWidth {
        fn measure(&self, _pane: &PaneId) -> Option<SurfaceSize> {
            Some(SurfaceSize::new(0.0, 300.0))
        }
    }

    #[derive(Default)]
    struct RecordingSleeper(Vec<Duration>);

    impl Sleeper for RecordingSleeper {
        fn sleep(&mut self, duration: Duration) {
            self.0.push(duration);
        }
    }

    fn guard() -> ChartLifecycleGuard {
        ChartLifecycleGuard::new(LifecycleConfig::default(), [PaneId::Price, PaneId::Volume])
    }

    #[test]
    fn ready_after_a_few_attempts() {
        let probe = DelayedProbe::new(3);
        let mut sleeper = RecordingSleeper::default();
        let mut g = guard();
        g.wait_until_ready(&probe, &mut sleeper).unwrap();
        assert!(g.is_ready());
        assert_eq!(g.attempts(), 4);
        assert_eq!(sleeper.0[0], Duration::from_millis(500));
        assert_eq!(&sleeper.0[1..], &[Duration::from_millis(300); 3]);
    }

    #[test]
    fn missing_surface_fails_after_ceiling() {
        let probe = DelayedProbe::new(u32::MAX);
        let mut sleeper = RecordingSleeper::default();
        let mut g = guard();
        let err = g.wait_until_ready(&probe, &mut sleeper).unwrap_err();
        assert_eq!(err, ChartError::SurfaceMissing { pane: PaneId::Price, attempts: 15 });
        assert_eq!(g.attempts(), 15);
        // initial delay plus 14 retries
        assert_eq!(sleeper.0.len(), 15);
    }

    #[test]
    fn zero_width_is_unsized() {
        let mut g = guard();
        let err = g.wait_until_ready(&ZeroWidth, &mut RecordingSleeper::default()).unwrap_err();
        assert!(matches!(err, ChartError::SurfaceUnsized { pane: PaneId::Price, attempts: 15, .. }));
    }

    #[test]
    fn failure_is_terminal_until_reset() {
        let mut g = guard();
        let _ = g.wait_until_ready(&ZeroWidth, &mut RecordingSleeper::default());
        // a ready probe does not help without a reset
        let ready = DelayedProbe::new(0);
        assert!(g.poll(&ready).is_err());
        assert_eq!(g.attempts(), 15);

        g.reset();
        assert_eq!(g.attempts(), 0);
        assert_eq!(g.poll(&ready).unwrap(), PollOutcome::Ready);
        assert_eq!(g.attempts(), 1);
    }

    #[test]
    fn poll_reports_retry_delay() {
        let mut g = guard();
        let probe = DelayedProbe::new(1);
        assert_eq!(
            g.poll(&probe).unwrap(),
            PollOutcome::Retry { attempt: 1, delay: Duration::from_millis(300) }
        );
        assert_eq!(g.poll(&probe).unwrap(), PollOutcome::Ready);
        // stays ready without probing again
        assert_eq!(g.poll(&probe).unwrap(), PollOutcome::Ready);
        assert_eq!(g.attempts(), 2);
    }

    #[test]
    fn no_surfaces_is_immediately_ready() {
        let mut g = ChartLifecycleGuard::new(LifecycleConfig::default(), []);
        assert_eq!(g.poll(&ZeroWidth).unwrap(), PollOutcome::Ready);
    }
}
