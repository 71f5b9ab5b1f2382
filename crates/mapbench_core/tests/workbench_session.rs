use mapbench_core::query::DEFAULT_QUERY_URL;
use mapbench_core::workbench::{WFS_LAYER_NAME, WMS_GROUP_NAME};
use mapbench_core::{
    Completion, Coord, FeatureId, MeasuredPanels, NoTransformEngine, PixelSize,
    QueryResponse, QueuedQueryService, Workbench, WorkbenchConfig, WorkbenchError,
};
use serde_json::json;

fn workbench() -> Workbench<QueuedQueryService> {
    Workbench::bootstrap(
        WorkbenchConfig::default(),
        QueuedQueryService::new(),
        Box::new(NoTransformEngine),
    )
    .unwrap()
}

#[test]
fn bootstrap_wires_layers_viewports_and_binding() {
    let workbench = workbench();

    let wfs = workbench.layers().find(workbench.wfs_layer_id()).unwrap();
    assert_eq!(wfs.name(), WFS_LAYER_NAME);
    assert_eq!(
        workbench.layers().find(workbench.wms_group_id()).unwrap().name(),
        WMS_GROUP_NAME
    );
    assert_eq!(workbench.query_binding().layer_id(), workbench.wfs_layer_id());
    assert_eq!(workbench.query_binding().url(), DEFAULT_QUERY_URL);
    assert_eq!(
        workbench.viewports().primary().center,
        Coord { x: 157_257.0, y: 172_012.0 }
    );
    assert_eq!(workbench.coordinate_control().selected().code, "EPSG:31370");
}

#[test]
fn query_results_land_in_the_vector_layer() {
    let mut workbench = workbench();
    let request = workbench.query_default().unwrap();
    let body = json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "Adrespos.1",
             "geometry": {"type": "Point", "coordinates": [157_260.0, 172_010.0]},
             "properties": {"straatnaam": "Markt"}}
        ]
    })
    .to_string();

    let outcome = workbench
        .query_binding_mut()
        .complete(request, QueryResponse::ok(body));
    assert_eq!(outcome, Completion::Loaded);

    let store = workbench
        .layers()
        .feature_store(workbench.wfs_layer_id())
        .unwrap();
    assert_eq!(store.len(), 1);

    let selected = workbench
        .query_binding_mut()
        .select_from_map_click(Coord { x: 157_261.0, y: 172_010.0 }, 2.0)
        .to_vec();
    assert_eq!(selected, vec![FeatureId::from("Adrespos.1")]);
}

#[test]
fn view_changes_and_resizes_keep_overview_in_sync() {
    let mut workbench = workbench();
    workbench
        .on_primary_view_changed(Coord { x: 150_000.0, y: 170_000.0 }, 2.0)
        .unwrap();
    workbench.on_panel_resized(
        "center",
        &MeasuredPanels::new(PixelSize::new(900, 700), PixelSize::new(300, 200)),
    );

    let overview = workbench.viewports().overview();
    assert_eq!(overview.center, Coord { x: 150_000.0, y: 170_000.0 });
    assert_eq!(overview.resolution, 10.0);
    assert_eq!(overview.size, PixelSize::new(300, 200));

    let err = workbench
        .on_primary_view_changed(Coord { x: 0.0, y: 0.0 }, -1.0)
        .unwrap_err();
    assert!(matches!(err, WorkbenchError::Viewport(_)));
}

#[test]
fn typed_coordinate_recenters_and_zoom_steps() {
    let mut workbench = workbench();
    let native = workbench.recenter_from_input("160000, 175000").unwrap();
    assert_eq!(native, Coord { x: 160_000.0, y: 175_000.0 });
    assert_eq!(workbench.display_center().unwrap(), "160000.00, 175000.00");

    let zoom = workbench.zoom_step(2).unwrap();
    assert!((zoom - 12.0).abs() < 1e-9);
    let zoom = workbench.zoom_step(-1).unwrap();
    assert!((zoom - 11.0).abs() < 1e-9);

    assert!(matches!(
        workbench.recenter_from_input("north"),
        Err(WorkbenchError::Control(_))
    ));
}

#[test]
fn unknown_map_projection_fails_bootstrap() {
    let config = WorkbenchConfig {
        map_projection: "EPSG:2154".to_string(),
        ..WorkbenchConfig::default()
    };
    let result = Workbench::bootstrap(config, QueuedQueryService::new(), Box::new(NoTransformEngine));
    assert!(matches!(result, Err(WorkbenchError::Projection(_))));
}
