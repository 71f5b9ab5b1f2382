//! Workbench composition root.
//!
//! # Responsibility
//! - Build every core component from one `WorkbenchConfig`.
//! - Own the components so the UI shell holds a single session value.
//!
//! # Invariants
//! - Bootstrap either returns a fully wired workbench or an error; no
//!   component is left half-initialized.
//! - The query binding is attached to the WFS vector layer's feature store.

use crate::config::{ConfigError, WorkbenchConfig};
use crate::control::{ControlError, CoordinateTransformControl, MeasureControl, MeasureError, ZoomControl};
use crate::layer::{LayerError, LayerManager, LayerOptions};
use crate::model::layer::{LayerId, RasterServiceDescriptor, RasterTiling};
use crate::model::viewport::Viewport;
use crate::projection::{ProjectionError, ProjectionRegistry, TransformEngine};
use crate::query::{FeatureQueryBinding, FeatureQueryService, QueryError, RequestId};
use crate::viewport::{PanelLayout, ViewportSyncEngine, ViewportSyncError};
use geo::Coord;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Name of the default raster service group.
pub const WMS_GROUP_NAME: &str = "WMS Flemish Layers";
/// Name of the queried vector layer.
pub const WFS_LAYER_NAME: &str = "WFS Flemish Addresses";

const WMS_INFO_FORMAT: &str = "application/vnd.esri.wms_featureinfo_xml";

struct ServiceLayer {
    name: &'static str,
    url: &'static str,
    layers: &'static str,
}

const SERVICE_LAYERS: [ServiceLayer; 3] = [
    ServiceLayer {
        name: "GRB Parcels",
        url: "https://geoservices.informatievlaanderen.be/raadpleegdiensten/Adpf/wms",
        layers: "Adpf",
    },
    ServiceLayer {
        name: "GRB Realized Buildings",
        url: "https://geoservices.informatievlaanderen.be/raadpleegdiensten/Gebouwenregister/wms",
        layers: "G_GEREALISEERD",
    },
    ServiceLayer {
        name: "GRB Addresses",
        url: "https://geoservices.informatievlaanderen.be/raadpleegdiensten/Adressen/wms",
        layers: "Adrespos",
    },
];

/// Any failure surfaced by the workbench.
#[derive(Debug)]
pub enum WorkbenchError {
    Config(ConfigError),
    Projection(ProjectionError),
    Layer(LayerError),
    Viewport(ViewportSyncError),
    Query(QueryError),
    Control(ControlError),
    Measure(MeasureError),
}

impl Display for WorkbenchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Projection(err) => write!(f, "{err}"),
            Self::Layer(err) => write!(f, "{err}"),
            Self::Viewport(err) => write!(f, "{err}"),
            Self::Query(err) => write!(f, "{err}"),
            Self::Control(err) => write!(f, "{err}"),
            Self::Measure(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkbenchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Projection(err) => Some(err),
            Self::Layer(err) => Some(err),
            Self::Viewport(err) => Some(err),
            Self::Query(err) => Some(err),
            Self::Control(err) => Some(err),
            Self::Measure(err) => Some(err),
        }
    }
}

impl From<ConfigError> for WorkbenchError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<ProjectionError> for WorkbenchError {
    fn from(value: ProjectionError) -> Self {
        Self::Projection(value)
    }
}

impl From<LayerError> for WorkbenchError {
    fn from(value: LayerError) -> Self {
        Self::Layer(value)
    }
}

impl From<ViewportSyncError> for WorkbenchError {
    fn from(value: ViewportSyncError) -> Self {
        Self::Viewport(value)
    }
}

impl From<QueryError> for WorkbenchError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

impl From<ControlError> for WorkbenchError {
    fn from(value: ControlError) -> Self {
        Self::Control(value)
    }
}

impl From<MeasureError> for WorkbenchError {
    fn from(value: MeasureError) -> Self {
        Self::Measure(value)
    }
}

/// One map workbench session.
pub struct Workbench<S: FeatureQueryService> {
    config: WorkbenchConfig,
    registry: ProjectionRegistry,
    layers: LayerManager,
    wms_group: LayerId,
    wfs_layer: LayerId,
    sync: ViewportSyncEngine,
    binding: FeatureQueryBinding<S>,
    coordinates: CoordinateTransformControl,
    zoom: ZoomControl,
    measure: MeasureControl,
}

impl<S: FeatureQueryService> Workbench<S> {
    /// Builds registry, layer tree, viewports, query binding and controls.
    ///
    /// # Errors
    /// - `Config` when `config` fails validation.
    /// - Any component error raised while wiring the default deployment.
    pub fn bootstrap(
        config: WorkbenchConfig,
        service: S,
        engine: Box<dyn TransformEngine>,
    ) -> Result<Self, WorkbenchError> {
        info!("event=workbench_bootstrap module=workbench status=start");
        Self::build(config, service, engine).map_err(|err| {
            error!(
                "event=workbench_bootstrap module=workbench status=error error={}",
                err
            );
            err
        })
    }

    fn build(
        config: WorkbenchConfig,
        service: S,
        engine: Box<dyn TransformEngine>,
    ) -> Result<Self, WorkbenchError> {
        config.validate()?;
        let registry = ProjectionRegistry::with_defaults(engine);
        let map_projection = registry.resolve(&config.map_projection)?;

        let mut layers = LayerManager::new();
        let group = layers.group_layers(WMS_GROUP_NAME, Vec::new())?;
        let wms_group = layers.add_layer(group, None)?;
        let visibility = [
            config.layers.parcels,
            config.layers.buildings,
            config.layers.addresses,
        ];
        for (service_layer, visible) in SERVICE_LAYERS.iter().zip(visibility) {
            let descriptor = RasterServiceDescriptor::new(service_layer.url, RasterTiling::Image)
                .with_param("LAYERS", service_layer.layers)
                .with_param("STYLES", "")
                .with_param("INFO_FORMAT", WMS_INFO_FORMAT);
            let opts = LayerOptions {
                visible,
                ..LayerOptions::default()
            }
            .in_group(wms_group);
            layers.create_raster_service_layer(service_layer.name, descriptor, opts)?;
        }
        let wfs_opts = LayerOptions {
            visible: config.layers.wfs_addresses,
            ..LayerOptions::default()
        };
        let wfs_layer = layers.create_vector_layer(WFS_LAYER_NAME, wfs_opts)?;

        let zoom = ZoomControl::for_projection(map_projection)?;
        let measure = MeasureControl::new(map_projection)?;
        let mut primary = Viewport::new(
            map_projection.code.clone(),
            config.initial_view.center,
            zoom.levels().resolution_for_zoom(config.initial_view.zoom),
            config.primary_size,
        );
        primary.rotation = config.initial_view.rotation;
        let sync = ViewportSyncEngine::try_new(
            Some(primary),
            config.overview_size,
            config.magnification,
        )?;

        let store = layers.feature_store(wfs_layer.id)?;
        let binding = FeatureQueryBinding::new(service, config.query_url.clone(), wfs_layer.id, store);
        let coordinates = CoordinateTransformControl::new(
            &config.projections,
            &config.default_projection,
            &registry,
        )?;

        info!(
            "event=workbench_bootstrap module=workbench status=ok projection={} layers={}",
            sync.primary().projection,
            layers.flatten().len()
        );
        Ok(Self {
            config,
            registry,
            layers,
            wms_group,
            wfs_layer: wfs_layer.id,
            sync,
            binding,
            coordinates,
            zoom,
            measure,
        })
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    pub fn registry(&self) -> &ProjectionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ProjectionRegistry {
        &mut self.registry
    }

    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerManager {
        &mut self.layers
    }

    pub fn wms_group_id(&self) -> LayerId {
        self.wms_group
    }

    pub fn wfs_layer_id(&self) -> LayerId {
        self.wfs_layer
    }

    pub fn viewports(&self) -> &ViewportSyncEngine {
        &self.sync
    }

    pub fn viewports_mut(&mut self) -> &mut ViewportSyncEngine {
        &mut self.sync
    }

    pub fn query_binding(&self) -> &FeatureQueryBinding<S> {
        &self.binding
    }

    pub fn query_binding_mut(&mut self) -> &mut FeatureQueryBinding<S> {
        &mut self.binding
    }

    pub fn coordinate_control(&self) -> &CoordinateTransformControl {
        &self.coordinates
    }

    pub fn zoom_control(&self) -> &ZoomControl {
        &self.zoom
    }

    pub fn measure_control(&self) -> &MeasureControl {
        &self.measure
    }

    pub fn measure_control_mut(&mut self) -> &mut MeasureControl {
        &mut self.measure
    }

    /// Forwards a primary map view change to the overview.
    pub fn on_primary_view_changed(
        &mut self,
        center: Coord,
        resolution: f64,
    ) -> Result<(), WorkbenchError> {
        self.sync
            .on_primary_view_changed(center, resolution)
            .map_err(Into::into)
    }

    /// Re-measures both map panels after a split-pane drag.
    pub fn on_panel_resized(&mut self, pane: &str, layout: &dyn PanelLayout) {
        self.sync.on_panel_resized(pane, layout);
    }

    /// Issues the configured default query.
    pub fn query_default(&mut self) -> Result<RequestId, WorkbenchError> {
        let options = self.config.query.clone();
        self.binding.query(options).map_err(Into::into)
    }

    /// Selects the coordinate control projection.
    pub fn select_projection(&mut self, code: &str) -> Result<(), WorkbenchError> {
        self.coordinates
            .select_projection(code, &self.registry)
            .map_err(Into::into)
    }

    /// Primary center in the selected projection, formatted for display.
    pub fn display_center(&self) -> Result<String, WorkbenchError> {
        let center = self
            .coordinates
            .display_center(self.sync.primary(), &self.registry)?;
        Ok(self.coordinates.format_coordinate(center))
    }

    /// Parses `input` in the selected projection and recenters on it.
    pub fn recenter_from_input(&mut self, input: &str) -> Result<Coord, WorkbenchError> {
        let typed = CoordinateTransformControl::parse_coordinate(input)?;
        self.coordinates
            .recenter_from_input(typed, None, &self.registry, &mut self.sync)
            .map_err(Into::into)
    }

    /// Steps the primary zoom; positive `steps` zoom in.
    pub fn zoom_step(&mut self, steps: i32) -> Result<f64, WorkbenchError> {
        let mut zoom = self.sync.zoom(self.zoom.levels());
        for _ in 0..steps.unsigned_abs() {
            zoom = if steps > 0 {
                self.zoom.zoom_in(&mut self.sync)?
            } else {
                self.zoom.zoom_out(&mut self.sync)?
            };
        }
        Ok(zoom)
    }
}
