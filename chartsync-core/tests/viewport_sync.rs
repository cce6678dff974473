//! Pane viewport synchronization through the renderer seam.

use chartsync_core::chart::{
    PaneId, RecordingRenderer, RendererSink, SyncOutcome, ViewportRange, ViewportSyncCoordinator,
};

fn r(from: f64, to: f64) -> ViewportRange {
    ViewportRange::new(from, to)
}

#[test]
fn primary_pan_reaches_every_sibling() {
    let mut coordinator = ViewportSyncCoordinator::standard();
    let mut renderer = RecordingRenderer::new();

    let outcome = coordinator.on_range_changed(&PaneId::Price, r(20.0, 80.0), &mut RendererSink(&mut renderer));
    assert_eq!(outcome, SyncOutcome::Propagated(2));
    assert_eq!(renderer.range(&PaneId::Volume), Some(r(20.0, 80.0)));
    assert_eq!(renderer.range(&PaneId::Oscillator), Some(r(20.0, 80.0)));
    // the primary itself is not written back
    assert_eq!(renderer.range(&PaneId::Price), None);
}

#[test]
fn sibling_changes_stay_local() {
    let mut coordinator = ViewportSyncCoordinator::standard();
    let mut renderer = RecordingRenderer::new();
    coordinator.on_range_changed(&PaneId::Price, r(0.0, 50.0), &mut RendererSink(&mut renderer));
    renderer.ranges.clear();

    let outcome = coordinator.on_range_changed(&PaneId::Oscillator, r(10.0, 20.0), &mut RendererSink(&mut renderer));
    assert_eq!(outcome, SyncOutcome::Local);
    assert!(renderer.ranges.is_empty());
    assert_eq!(coordinator.range(&PaneId::Price), Some(r(0.0, 50.0)));
    assert_eq!(coordinator.range(&PaneId::Volume), Some(r(0.0, 50.0)));
    assert_eq!(coordinator.range(&PaneId::Oscillator), Some(r(10.0, 20.0)));

    // the next primary change overrides the local drift
    coordinator.on_range_changed(&PaneId::Price, r(5.0, 55.0), &mut RendererSink(&mut renderer));
    assert_eq!(coordinator.range(&PaneId::Oscillator), Some(r(5.0, 55.0)));
}

#[test]
fn fit_happens_once_per_data_set() {
    let mut coordinator = ViewportSyncCoordinator::standard();
    let mut renderer = RecordingRenderer::new();

    assert_eq!(coordinator.fit_primary(120, &mut RendererSink(&mut renderer)), Some(r(0.0, 119.0)));
    assert_eq!(renderer.range(&PaneId::Price), Some(r(0.0, 119.0)));
    assert_eq!(renderer.range(&PaneId::Volume), Some(r(0.0, 119.0)));

    coordinator.on_range_changed(&PaneId::Price, r(60.0, 119.0), &mut RendererSink(&mut renderer));
    assert_eq!(coordinator.fit_primary(120, &mut RendererSink(&mut renderer)), None);
    assert_eq!(coordinator.range(&PaneId::Price), Some(r(60.0, 119.0)));

    coordinator.reset();
    assert!(!coordinator.has_fitted());
    assert_eq!(coordinator.fit_primary(30, &mut RendererSink(&mut renderer)), Some(r(0.0, 29.0)));
}

#[test]
fn empty_data_is_not_fitted() {
    let mut coordinator = ViewportSyncCoordinator::standard();
    let mut renderer = RecordingRenderer::new();
    assert_eq!(coordinator.fit_primary(0, &mut RendererSink(&mut renderer)), None);
    assert!(!coordinator.has_fitted());
    assert!(renderer.ranges.is_empty());
}

#[test]
fn custom_panes_join_late() {
    let mut coordinator = ViewportSyncCoordinator::new(PaneId::Price, [PaneId::Volume]);
    let mut renderer = RecordingRenderer::new();
    coordinator.on_range_changed(&PaneId::Price, r(3.0, 9.0), &mut RendererSink(&mut renderer));

    let kdj = PaneId::Custom("kdj".into());
    assert_eq!(
        coordinator.on_range_changed(&kdj, r(0.0, 1.0), &mut RendererSink(&mut renderer)),
        SyncOutcome::Ignored
    );
    coordinator.add_sibling(kdj.clone());
    assert_eq!(coordinator.range(&kdj), Some(r(3.0, 9.0)));
    assert_eq!(
        coordinator.on_range_changed(&PaneId::Price, r(4.0, 10.0), &mut RendererSink(&mut renderer)),
        SyncOutcome::Propagated(2)
    );
    assert_eq!(renderer.range(&kdj), Some(r(4.0, 10.0)));
}
