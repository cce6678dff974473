//! Readiness polling for chart surfaces.

use std::cell::Cell;
use std::time::Duration;

use chartsync_core::chart::{
    ChartLifecycleGuard, LifecycleConfig, PaneId, PollOutcome, Sleeper, SurfaceProbe, SurfaceSize,
};
use chartsync_core::ChartError;

/// Surfaces appear after a number of measurements.
struct Delayed {
    ready_after: u32,
    calls: Cell<u32>,
}

impl Delayed {
    fn new(ready_after: u32) -> Self {
        Self {
            ready_after,
            calls: Cell::new(0),
        }
    }
}

impl SurfaceProbe for Delayed {
    fn measure(&self, _pane: &PaneId) -> Option<SurfaceSize> {
        let n = self.calls.get() + 1;
        self.calls.set(n);
        (n > self.ready_after).then(|| SurfaceSize::new(640.0, 240.0))
    }
}

/// The volume pane exists but never gets a width.
struct ZeroWidthVolume;

impl SurfaceProbe for ZeroWidthVolume {
    fn measure(&self, pane: &PaneId) -> Option<SurfaceSize> {
        match pane {
            PaneId::Volume => Some(SurfaceSize::new(0.0, 120.0)),
            _ => Some(SurfaceSize::new(640.0, 240.0)),
        }
    }
}

#[derive(Default)]
struct RecordingSleeper(Vec<Duration>);

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.0.push(duration);
    }
}

fn guard(config: LifecycleConfig) -> ChartLifecycleGuard {
    ChartLifecycleGuard::new(config, [PaneId::Price, PaneId::Volume, PaneId::Oscillator])
}

#[test]
fn waits_with_initial_then_retry_delays() {
    let mut g = guard(LifecycleConfig::default());
    let mut sleeper = RecordingSleeper::default();
    // one probe call per missing pane: fails on calls 1..=2
    g.wait_until_ready(&Delayed::new(2), &mut sleeper).unwrap();

    assert!(g.is_ready());
    assert_eq!(g.attempts(), 3);
    assert_eq!(
        sleeper.0,
        vec![
            Duration::from_millis(500),
            Duration::from_millis(300),
            Duration::from_millis(300),
        ]
    );
}

#[test]
fn gives_up_after_max_attempts() {
    let config = LifecycleConfig {
        max_attempts: 4,
        ..LifecycleConfig::default()
    };
    let mut g = guard(config);
    let mut sleeper = RecordingSleeper::default();
    let err = g.wait_until_ready(&Delayed::new(u32::MAX), &mut sleeper).unwrap_err();

    assert_eq!(err, ChartError::SurfaceMissing { pane: PaneId::Price, attempts: 4 });
    // initial delay plus one per failed retry
    assert_eq!(sleeper.0.len(), 4);
}

#[test]
fn unsized_surface_is_reported() {
    let config = LifecycleConfig {
        max_attempts: 2,
        ..LifecycleConfig::default()
    };
    let mut g = guard(config);
    assert!(matches!(g.poll(&ZeroWidthVolume), Ok(PollOutcome::Retry { attempt: 1, .. })));
    let err = g.poll(&ZeroWidthVolume).unwrap_err();
    assert!(matches!(err, ChartError::SurfaceUnsized { pane: PaneId::Volume, attempts: 2, .. }));
    assert!(err.to_string().contains("volume"));
}

#[test]
fn failure_is_terminal_until_reset() {
    let config = LifecycleConfig {
        max_attempts: 1,
        ..LifecycleConfig::default()
    };
    let mut g = guard(config);
    let never = Delayed::new(u32::MAX);
    let first = g.poll(&never).unwrap_err();

    // even a now-ready probe does not revive the cycle
    let ready = Delayed::new(0);
    assert_eq!(g.poll(&ready).unwrap_err(), first);
    assert_eq!(g.attempts(), 1);

    g.reset();
    assert_eq!(g.poll(&ready).unwrap(), PollOutcome::Ready);
}

#[test]
fn config_durations() {
    let config = LifecycleConfig::default();
    assert_eq!(config.max_attempts, 15);
    assert_eq!(config.retry_delay(), Duration::from_millis(300));
    assert_eq!(config.initial_delay(), Duration::from_millis(500));
}
