use mapbench_core::{
    Coord, MeasuredPanels, PixelSize, Viewport, ViewportEvent, ViewportSyncEngine,
    ViewportSyncError,
};
use std::cell::RefCell;
use std::rc::Rc;

fn primary(resolution: f64) -> Viewport {
    Viewport::new(
        "EPSG:31370",
        Coord { x: 157257.0, y: 172012.0 },
        resolution,
        PixelSize::new(800, 600),
    )
}

#[test]
fn overview_uses_magnified_resolution_and_same_center() {
    let mut sync =
        ViewportSyncEngine::try_new(Some(primary(1.0)), PixelSize::new(200, 150), 5.0).unwrap();

    sync.on_primary_view_changed(Coord { x: 157257.0, y: 172012.0 }, 2.0)
        .unwrap();

    assert_eq!(sync.overview().center, Coord { x: 157257.0, y: 172012.0 });
    assert_eq!(sync.overview().resolution, 10.0);
}

#[test]
fn magnification_of_one_mirrors_the_primary() {
    let mut sync =
        ViewportSyncEngine::try_new(Some(primary(1.0)), PixelSize::new(200, 150), 1.0).unwrap();
    assert_eq!(sync.overview().resolution, sync.primary().resolution);

    sync.on_primary_view_changed(Coord { x: 150_000.0, y: 170_000.0 }, 3.5)
        .unwrap();

    assert_eq!(sync.overview().center, sync.primary().center);
    assert_eq!(sync.overview().resolution, sync.primary().resolution);
    assert_eq!(sync.overview().resolution, 3.5);
}

#[test]
fn zero_or_negative_magnification_is_rejected() {
    for magnification in [0.0, -3.0] {
        let err = ViewportSyncEngine::try_new(Some(primary(1.0)), PixelSize::new(1, 1), magnification)
            .err()
            .expect("construction must fail");
        assert_eq!(err, ViewportSyncError::InvalidMagnification(magnification));
    }
}

#[test]
fn missing_primary_map_is_not_ready() {
    let err = ViewportSyncEngine::try_new(None, PixelSize::new(1, 1), 5.0)
        .err()
        .expect("construction must fail");
    assert_eq!(err, ViewportSyncError::MapNotReady);
}

#[test]
fn overview_follows_every_change_in_order() {
    let mut sync =
        ViewportSyncEngine::try_new(Some(primary(1.0)), PixelSize::new(200, 150), 4.0).unwrap();
    let overview_resolutions = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&overview_resolutions);
    sync.on_changed(move |event| {
        if let ViewportEvent::OverviewChanged(viewport) = event {
            sink.borrow_mut().push(viewport.resolution);
        }
    });

    let changes = [(100.0, 1.5), (200.0, 0.25), (300.0, 8.0)];
    for (x, resolution) in changes {
        sync.on_primary_view_changed(Coord { x: x, y: x }, resolution)
            .unwrap();
        assert_eq!(sync.overview().center, sync.primary().center);
        assert_eq!(sync.overview().resolution, 4.0 * sync.primary().resolution);
    }
    assert_eq!(*overview_resolutions.borrow(), vec![6.0, 1.0, 32.0]);
}

#[test]
fn rejected_change_leaves_viewports_untouched() {
    let mut sync =
        ViewportSyncEngine::try_new(Some(primary(2.0)), PixelSize::new(200, 150), 5.0).unwrap();
    let before = (sync.primary().clone(), sync.overview().clone());

    assert_eq!(
        sync.on_primary_view_changed(Coord { x: 1.0, y: 1.0 }, 0.0),
        Err(ViewportSyncError::InvalidResolution(0.0))
    );
    assert_eq!(
        sync.on_primary_view_changed(Coord { x: f64::NAN, y: 1.0 }, 1.0),
        Err(ViewportSyncError::InvalidView)
    );
    assert_eq!((sync.primary().clone(), sync.overview().clone()), before);
}

#[test]
fn panel_resize_remeasures_both_maps() {
    let mut sync =
        ViewportSyncEngine::try_new(Some(primary(2.0)), PixelSize::new(200, 150), 5.0).unwrap();
    let layout = MeasuredPanels::new(PixelSize::new(640, 480), PixelSize::new(320, 0));

    sync.on_panel_resized("west", &layout);

    assert_eq!(sync.primary().size, PixelSize::new(640, 480));
    assert_eq!(sync.overview().size, PixelSize::new(320, 0));
    assert_eq!(sync.overview().resolution, 10.0);
}
