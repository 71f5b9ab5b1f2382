//! Layer tree model.
//!
//! # Responsibility
//! - Define renderable layers, their sources and the group tree holding them.
//! - Provide the shared feature store handle of vector layers.
//!
//! # Invariants
//! - `LayerId` is stable and never reused.
//! - A `LayerNode` is owned by exactly one parent, so the tree is acyclic by
//!   construction.
//! - Only the query binding replaces a `FeatureStore` collection.

use crate::model::feature::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use uuid::Uuid;

/// Stable layer/group identifier.
pub type LayerId = Uuid;

/// Shared, atomically replaceable feature storage of one vector layer.
///
/// Clones share the same storage. Readers take `Rc` snapshots, so a
/// replacement never exposes a half-written collection.
#[derive(Clone, Default)]
pub struct FeatureStore {
    current: Rc<RefCell<Rc<FeatureCollection>>>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current collection snapshot.
    pub fn snapshot(&self) -> Rc<FeatureCollection> {
        Rc::clone(&self.current.borrow())
    }

    pub fn len(&self) -> usize {
        self.current.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.borrow().is_empty()
    }

    /// Returns whether both handles point at the same storage.
    pub fn shares_storage_with(&self, other: &FeatureStore) -> bool {
        Rc::ptr_eq(&self.current, &other.current)
    }

    pub(crate) fn replace(&self, next: FeatureCollection) -> Rc<FeatureCollection> {
        let next = Rc::new(next);
        *self.current.borrow_mut() = Rc::clone(&next);
        next
    }
}

impl Debug for FeatureStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureStore")
            .field("features", &self.len())
            .finish()
    }
}

/// Image tiling mode of a raster service layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterTiling {
    /// One image per view (ImageWMS style).
    Image,
    /// Tiled requests (TileWMS style).
    Tiled,
}

/// Remote raster service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterServiceDescriptor {
    pub url: String,
    /// Request parameters, keys upper-cased (`LAYERS`, `STYLES`, ...).
    pub params: BTreeMap<String, String>,
    pub tiling: RasterTiling,
}

impl RasterServiceDescriptor {
    pub fn new(url: impl Into<String>, tiling: RasterTiling) -> Self {
        Self {
            url: url.into(),
            params: BTreeMap::new(),
            tiling,
        }
    }

    /// Builder-style parameter setter. Keys are case-insensitive.
    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.trim().to_ascii_uppercase(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .get(key.trim().to_ascii_uppercase().as_str())
            .map(String::as_str)
    }
}

/// Data source behind one layer.
#[derive(Debug, Clone)]
pub enum LayerSource {
    Vector(FeatureStore),
    RasterService(RasterServiceDescriptor),
}

/// One renderable layer.
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    /// `0.0..=1.0`.
    pub opacity: f64,
    pub source: LayerSource,
}

impl Layer {
    /// Creates a visible vector layer with an empty feature store.
    pub fn vector(name: impl Into<String>) -> Self {
        Self::with_source(name, LayerSource::Vector(FeatureStore::new()))
    }

    /// Creates a visible raster service layer.
    pub fn raster_service(name: impl Into<String>, descriptor: RasterServiceDescriptor) -> Self {
        Self::with_source(name, LayerSource::RasterService(descriptor))
    }

    fn with_source(name: impl Into<String>, source: LayerSource) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
            opacity: 1.0,
            source,
        }
    }

    pub fn feature_store(&self) -> Option<&FeatureStore> {
        match &self.source {
            LayerSource::Vector(store) => Some(store),
            LayerSource::RasterService(_) => None,
        }
    }

    pub fn raster_service_descriptor(&self) -> Option<&RasterServiceDescriptor> {
        match &self.source {
            LayerSource::RasterService(descriptor) => Some(descriptor),
            LayerSource::Vector(_) => None,
        }
    }
}

/// Ordered container of layers and groups.
#[derive(Debug, Clone)]
pub struct LayerGroup {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub(crate) children: Vec<LayerNode>,
}

impl LayerGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
            children: Vec::new(),
        }
    }

    /// Children in render order (first is bottom-most).
    pub fn children(&self) -> &[LayerNode] {
        &self.children
    }

    /// Name lookup ignoring surrounding whitespace.
    pub fn contains_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.children.iter().any(|child| child.name().trim() == name)
    }
}

/// One node in the layer tree.
#[derive(Debug, Clone)]
pub enum LayerNode {
    Layer(Layer),
    Group(LayerGroup),
}

impl LayerNode {
    pub fn id(&self) -> LayerId {
        match self {
            Self::Layer(layer) => layer.id,
            Self::Group(group) => group.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Layer(layer) => &layer.name,
            Self::Group(group) => &group.name,
        }
    }

    pub fn visible(&self) -> bool {
        match self {
            Self::Layer(layer) => layer.visible,
            Self::Group(group) => group.visible,
        }
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        match self {
            Self::Layer(layer) => layer.visible = visible,
            Self::Group(group) => group.visible = visible,
        }
    }

    /// Short label used by the layer tree UI.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Layer(Layer {
                source: LayerSource::Vector(_),
                ..
            }) => "vector",
            Self::Layer(Layer {
                source: LayerSource::RasterService(_),
                ..
            }) => "raster",
            Self::Group(_) => "group",
        }
    }

    pub fn as_layer(&self) -> Option<&Layer> {
        match self {
            Self::Layer(layer) => Some(layer),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&LayerGroup> {
        match self {
            Self::Group(group) => Some(group),
            Self::Layer(_) => None,
        }
    }

    /// Returns whether `id` is this node or one of its descendants.
    pub fn contains_id(&self, id: LayerId) -> bool {
        if self.id() == id {
            return true;
        }
        match self {
            Self::Layer(_) => false,
            Self::Group(group) => group.children.iter().any(|child| child.contains_id(id)),
        }
    }
}

impl From<Layer> for LayerNode {
    fn from(value: Layer) -> Self {
        Self::Layer(value)
    }
}

impl From<LayerGroup> for LayerNode {
    fn from(value: LayerGroup) -> Self {
        Self::Group(value)
    }
}
