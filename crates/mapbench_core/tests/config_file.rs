use mapbench_core::{ConfigError, WorkbenchConfig};
use std::io::Write;

#[test]
fn load_reads_json_file_and_fills_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "magnification": 4,
            "initialView": {{"center": {{"x": 150000.0, "y": 170000.0}}, "zoom": 12}},
            "layers": {{"parcels": true}}
        }}"#
    )
    .unwrap();

    let config = WorkbenchConfig::load(file.path()).unwrap();

    assert_eq!(config.magnification, 4.0);
    assert_eq!(config.initial_view.zoom, 12.0);
    assert_eq!(config.initial_view.rotation, 0.0);
    assert!(config.layers.parcels);
    assert!(config.layers.buildings);
    assert_eq!(config.query.srs_name, "EPSG:31370");
}

#[test]
fn saved_default_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workbench.json");
    std::fs::write(&path, WorkbenchConfig::default().to_json().unwrap()).unwrap();

    assert_eq!(WorkbenchConfig::load(&path).unwrap(), WorkbenchConfig::default());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = WorkbenchConfig::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
