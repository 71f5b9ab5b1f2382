//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `mapbench_core` linkage and bootstrap a workbench outside the UI.
//! - Optionally replay a saved GeoJSON answer through the query binding.
//!
//! Usage: `mapbench_cli [config.json|-] [response.geojson]`

use mapbench_core::{
    NoTransformEngine, QueryResponse, QueuedQueryService, Workbench, WorkbenchConfig,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("mapbench_core ping={}", mapbench_core::ping());
    println!("mapbench_core version={}", mapbench_core::core_version());

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match run(args.first().map(String::as_str), args.get(1).map(String::as_str)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<&str>, response_path: Option<&str>) -> Result<(), String> {
    let config = match config_path {
        Some(path) if path != "-" => WorkbenchConfig::load(path).map_err(|err| err.to_string())?,
        _ => WorkbenchConfig::default(),
    };
    let mut workbench = Workbench::bootstrap(
        config,
        QueuedQueryService::new(),
        Box::new(NoTransformEngine),
    )
    .map_err(|err| err.to_string())?;

    for row in workbench.layers().flatten() {
        println!(
            "layer {}{} kind={} visible={}",
            "  ".repeat(row.depth),
            row.name,
            row.kind,
            row.visible
        );
    }
    let primary = workbench.viewports().primary();
    let overview = workbench.viewports().overview();
    println!(
        "primary projection={} center={},{} resolution={}",
        primary.projection, primary.center.x, primary.center.y, primary.resolution
    );
    println!("overview resolution={}", overview.resolution);

    let Some(response_path) = response_path else {
        return Ok(());
    };
    let body = std::fs::read_to_string(response_path)
        .map_err(|err| format!("cannot read `{response_path}`: {err}"))?;
    let request = workbench.query_default().map_err(|err| err.to_string())?;
    let binding = workbench.query_binding_mut();
    let completion = binding.complete(request, QueryResponse::ok(body));
    println!(
        "query request={} completion={:?} state={}",
        request,
        completion,
        binding.state().label()
    );
    if let Some(err) = binding.last_error() {
        return Err(err.to_string());
    }

    let grid = binding.grid();
    println!(
        "grid rows={} columns={} possibly_truncated={}",
        grid.rows.len(),
        grid.columns.join(","),
        grid.possibly_truncated
    );
    Ok(())
}
