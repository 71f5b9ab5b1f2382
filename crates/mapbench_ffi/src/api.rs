//! FFI use-case API for the map workbench UI shell.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Hold one workbench session per UI thread.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are reported in response envelopes, never thrown.
//! - Query transport stays in the shell: requests are pulled with
//!   `feature_query_pending` and answered with `feature_query_complete`.

use mapbench_core::{
    core_version as core_version_inner, default_log_level, init_logging as init_logging_inner,
    ping as ping_inner, Coord, FeatureId, FeatureQueryOptions, LayerId, MeasuredPanels,
    NoTransformEngine, PixelSize, QueryResponse, QueuedQueryService, Viewport, Workbench,
    WorkbenchConfig, WorkbenchError,
};
use log::{info, warn};
use std::cell::RefCell;

type Session = Workbench<QueuedQueryService>;

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive); blank
///   selects the build default.
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = match level.trim() {
        "" => default_log_level(),
        level => level,
    };
    match init_logging_inner(level, log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn from_result(result: Result<String, String>) -> Self {
        match result {
            Ok(message) => Self { ok: true, message },
            Err(message) => Self { ok: false, message },
        }
    }
}

/// One map panel as seen by the shell.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportItem {
    pub center_x: f64,
    pub center_y: f64,
    pub resolution: f64,
    pub rotation: f64,
    pub width: u32,
    pub height: u32,
}

impl From<&Viewport> for ViewportItem {
    fn from(value: &Viewport) -> Self {
        Self {
            center_x: value.center.x,
            center_y: value.center.y,
            resolution: value.resolution,
            rotation: value.rotation,
            width: value.size.width,
            height: value.size.height,
        }
    }
}

/// Both map panels after a view operation.
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewResponse {
    pub ok: bool,
    pub primary: Option<ViewportItem>,
    pub overview: Option<ViewportItem>,
    pub message: String,
}

/// Result of issuing a feature query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDispatchResponse {
    pub ok: bool,
    pub request_id: Option<u64>,
    pub message: String,
}

/// Request waiting for the shell's transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequestItem {
    pub request_id: u64,
    pub url: String,
    /// Prefix-qualified feature type names, e.g. `Adressen:Adrespos`.
    pub type_names: Vec<String>,
    /// `FeatureQueryOptions` as camelCase JSON.
    pub options_json: String,
}

/// Query lifecycle state after a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStatusResponse {
    /// `idle|loading|loaded|failed`.
    pub state: String,
    /// `loaded|failed|discarded`, empty when no session exists.
    pub completion: String,
    pub feature_count: u32,
    pub possibly_truncated: bool,
    pub message: String,
}

/// JSON payload envelope for grid and property windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonResponse {
    pub ok: bool,
    pub json: String,
    pub message: String,
}

/// One row of the layer tree panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerTreeItem {
    pub layer_id: String,
    pub parent_id: String,
    pub depth: u32,
    pub name: String,
    /// `vector|raster|group`.
    pub kind: String,
    pub visible: bool,
}

/// Starts a new workbench session, replacing any previous one.
///
/// `config_json` uses the `WorkbenchConfig` JSON shape; `None` or blank
/// selects the default deployment.
#[flutter_rust_bridge::frb(sync)]
pub fn workbench_bootstrap(config_json: Option<String>) -> ActionResponse {
    let config = match config_json.as_deref().map(str::trim) {
        Some(json) if !json.is_empty() => WorkbenchConfig::from_json(json),
        _ => Ok(WorkbenchConfig::default()),
    };
    let result = config
        .map_err(WorkbenchError::from)
        .and_then(|config| {
            Workbench::bootstrap(config, QueuedQueryService::new(), Box::new(NoTransformEngine))
        })
        .map(|workbench| {
            SESSION.with(|session| *session.borrow_mut() = Some(workbench));
            "Workbench ready.".to_string()
        })
        .map_err(|err| format!("workbench_bootstrap failed: {err}"));
    match &result {
        Ok(_) => info!("event=ffi_bootstrap module=ffi status=ok"),
        Err(_) => warn!("event=ffi_bootstrap module=ffi status=error"),
    }
    ActionResponse::from_result(result)
}

/// Reports a primary map view change from the mapping engine.
#[flutter_rust_bridge::frb(sync)]
pub fn map_view_changed(center_x: f64, center_y: f64, resolution: f64) -> MapViewResponse {
    map_view_response(with_session(|workbench| {
        workbench
            .on_primary_view_changed(Coord { x: center_x, y: center_y }, resolution)
            .map_err(|err| format!("map_view_changed failed: {err}"))
    }))
}

/// Reports measured panel sizes after a split-pane drag finished.
#[flutter_rust_bridge::frb(sync)]
pub fn map_panel_resized(
    pane: String,
    primary_width: u32,
    primary_height: u32,
    overview_width: u32,
    overview_height: u32,
) -> MapViewResponse {
    let layout = MeasuredPanels::new(
        PixelSize::new(primary_width, primary_height),
        PixelSize::new(overview_width, overview_height),
    );
    map_view_response(with_session(|workbench| {
        workbench.on_panel_resized(pane.trim(), &layout);
        Ok(())
    }))
}

/// Issues a feature query. `options_json` overrides the configured defaults.
#[flutter_rust_bridge::frb(sync)]
pub fn feature_query(options_json: Option<String>) -> QueryDispatchResponse {
    let result = with_session(|workbench| {
        let options = match options_json.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => serde_json::from_str::<FeatureQueryOptions>(json)
                .map_err(|err| format!("invalid query options: {err}"))?,
            _ => workbench.config().query.clone(),
        };
        workbench
            .query_binding_mut()
            .query(options)
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(request_id) => QueryDispatchResponse {
            ok: true,
            request_id: Some(request_id),
            message: "Query issued.".to_string(),
        },
        Err(err) => QueryDispatchResponse {
            ok: false,
            request_id: None,
            message: format!("feature_query failed: {err}"),
        },
    }
}

/// Drains requests the shell still has to send.
#[flutter_rust_bridge::frb(sync)]
pub fn feature_query_pending() -> Vec<PendingRequestItem> {
    with_session(|workbench| {
        Ok(workbench
            .query_binding()
            .service()
            .take_pending()
            .into_iter()
            .map(|request| PendingRequestItem {
                request_id: request.id,
                type_names: request.options.qualified_type_names(),
                options_json: serde_json::to_string(&request.options).unwrap_or_default(),
                url: request.url,
            })
            .collect())
    })
    .unwrap_or_default()
}

/// Delivers the transport outcome of one request.
///
/// `transport_error` set means no answer arrived; otherwise `status`
/// (default 200) and `body` are the service answer.
#[flutter_rust_bridge::frb(sync)]
pub fn feature_query_complete(
    request_id: u64,
    status: Option<u16>,
    body: String,
    transport_error: Option<String>,
) -> QueryStatusResponse {
    let response = match transport_error {
        Some(reason) => QueryResponse::TransportFailure(reason),
        None => QueryResponse::Http {
            status: status.unwrap_or(200),
            body,
        },
    };
    let result = with_session(|workbench| {
        let binding = workbench.query_binding_mut();
        let completion = binding.complete(request_id, response);
        Ok(QueryStatusResponse {
            state: binding.state().label().to_string(),
            completion: format!("{completion:?}").to_ascii_lowercase(),
            feature_count: u32::try_from(binding.features().len()).unwrap_or(u32::MAX),
            possibly_truncated: binding.possibly_truncated(),
            message: binding
                .last_error()
                .map(ToString::to_string)
                .unwrap_or_default(),
        })
    });
    result.unwrap_or_else(|err| QueryStatusResponse {
        state: "idle".to_string(),
        completion: String::new(),
        feature_count: 0,
        possibly_truncated: false,
        message: format!("feature_query_complete failed: {err}"),
    })
}

/// Replaces the selection from grid rows. Returns the effective selection.
#[flutter_rust_bridge::frb(sync)]
pub fn feature_select_ids(ids: Vec<String>) -> Vec<String> {
    with_session(|workbench| {
        Ok(selection_strings(
            workbench.query_binding_mut().select_by_ids(ids),
        ))
    })
    .unwrap_or_default()
}

/// Selects features hit by a map click. Returns the effective selection.
#[flutter_rust_bridge::frb(sync)]
pub fn feature_select_at(x: f64, y: f64, tolerance: f64) -> Vec<String> {
    with_session(|workbench| {
        Ok(selection_strings(
            workbench
                .query_binding_mut()
                .select_from_map_click(Coord { x, y }, tolerance),
        ))
    })
    .unwrap_or_default()
}

/// Feature grid contents as JSON.
#[flutter_rust_bridge::frb(sync)]
pub fn feature_grid_json() -> JsonResponse {
    json_response(with_session(|workbench| {
        serde_json::to_string(&workbench.query_binding().grid()).map_err(|err| err.to_string())
    }))
}

/// Property tables of `ids` as JSON, one entry per known feature.
#[flutter_rust_bridge::frb(sync)]
pub fn feature_properties_json(ids: Vec<String>) -> JsonResponse {
    let ids = ids.into_iter().map(FeatureId::from).collect::<Vec<_>>();
    json_response(with_session(|workbench| {
        serde_json::to_string(&workbench.query_binding().feature_properties(&ids))
            .map_err(|err| err.to_string())
    }))
}

/// Depth-first layer tree listing.
#[flutter_rust_bridge::frb(sync)]
pub fn layer_tree() -> Vec<LayerTreeItem> {
    with_session(|workbench| {
        Ok(workbench
            .layers()
            .flatten()
            .into_iter()
            .map(|row| LayerTreeItem {
                layer_id: row.id.to_string(),
                parent_id: row.parent.to_string(),
                depth: u32::try_from(row.depth).unwrap_or(u32::MAX),
                name: row.name,
                kind: row.kind.to_string(),
                visible: row.visible,
            })
            .collect())
    })
    .unwrap_or_default()
}

/// Toggles one layer or group.
#[flutter_rust_bridge::frb(sync)]
pub fn layer_set_visibility(layer_id: String, visible: bool) -> ActionResponse {
    ActionResponse::from_result(with_session(|workbench| {
        let id = layer_id
            .trim()
            .parse::<LayerId>()
            .map_err(|err| format!("invalid layer id: {err}"))?;
        workbench
            .layers_mut()
            .set_visibility(id, visible)
            .map(|()| "Visibility updated.".to_string())
            .map_err(|err| format!("layer_set_visibility failed: {err}"))
    }))
}

/// Primary center in the selected projection, formatted for display.
#[flutter_rust_bridge::frb(sync)]
pub fn coordinate_display() -> ActionResponse {
    ActionResponse::from_result(with_session(|workbench| {
        workbench
            .display_center()
            .map_err(|err| format!("coordinate_display failed: {err}"))
    }))
}

/// Switches the coordinate control projection.
#[flutter_rust_bridge::frb(sync)]
pub fn coordinate_select_projection(code: String) -> ActionResponse {
    ActionResponse::from_result(with_session(|workbench| {
        workbench
            .select_projection(&code)
            .map(|()| workbench.coordinate_control().selected().label.clone())
            .map_err(|err| format!("coordinate_select_projection failed: {err}"))
    }))
}

/// Recenters the primary map on typed `x, y` in the selected projection.
#[flutter_rust_bridge::frb(sync)]
pub fn coordinate_recenter(input: String) -> MapViewResponse {
    map_view_response(with_session(|workbench| {
        workbench
            .recenter_from_input(&input)
            .map(|_| ())
            .map_err(|err| format!("coordinate_recenter failed: {err}"))
    }))
}

fn with_session<T>(f: impl FnOnce(&mut Session) -> Result<T, String>) -> Result<T, String> {
    SESSION.with(|session| {
        let mut session = session
            .try_borrow_mut()
            .map_err(|_| "workbench session is busy".to_string())?;
        let workbench = session
            .as_mut()
            .ok_or_else(|| "workbench not bootstrapped".to_string())?;
        f(workbench)
    })
}

fn map_view_response(result: Result<(), String>) -> MapViewResponse {
    let views = with_session(|workbench| {
        Ok((
            ViewportItem::from(workbench.viewports().primary()),
            ViewportItem::from(workbench.viewports().overview()),
        ))
    })
    .ok();
    let (primary, overview) = views.map_or((None, None), |(primary, overview)| {
        (Some(primary), Some(overview))
    });
    match result {
        Ok(()) => MapViewResponse {
            ok: true,
            primary,
            overview,
            message: "View updated.".to_string(),
        },
        Err(message) => MapViewResponse {
            ok: false,
            primary,
            overview,
            message,
        },
    }
}

fn json_response(result: Result<String, String>) -> JsonResponse {
    match result {
        Ok(json) => JsonResponse {
            ok: true,
            json,
            message: String::new(),
        },
        Err(message) => JsonResponse {
            ok: false,
            json: String::new(),
            message,
        },
    }
}

fn selection_strings(ids: &[FeatureId]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}
