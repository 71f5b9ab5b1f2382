//! Layer tree use-case service.
//!
//! # Responsibility
//! - Create vector and raster service layers and attach them to the map tree.
//! - Provide add, remove, move, visibility and lookup operations.
//! - Notify the tree UI about every structural or visibility change.
//!
//! # Invariants
//! - Layer names are unique within their parent group.
//! - Every node has exactly one parent; moves never create cycles.
//! - Failed operations leave the tree untouched and emit nothing.

use crate::events::{Listeners, SubscriptionId};
use crate::layer::form::NewRasterLayerForm;
use crate::model::layer::{
    FeatureStore, Layer, LayerGroup, LayerId, LayerNode, RasterServiceDescriptor,
};
use log::info;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Name of the root group owned by every map.
pub const ROOT_GROUP_NAME: &str = "Layers";

/// Errors from layer tree operations.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerError {
    /// Layer or group name is blank after trim.
    InvalidLayerName,
    /// Name already used by a sibling in the target group.
    DuplicateLayerName { name: String, parent: LayerId },
    /// Target node is not part of the tree.
    LayerNotFound(LayerId),
    /// Node (or one of its descendants) is already part of the tree.
    LayerAlreadyAttached(LayerId),
    /// Parent node does not exist.
    ParentNotFound(LayerId),
    /// Parent exists but is not a group.
    ParentMustBeGroup(LayerId),
    /// Move would place a node below itself.
    CycleDetected { node: LayerId, parent: LayerId },
    /// Root group cannot be removed or moved.
    RootGroupImmutable,
    /// Target node is a group, not a layer.
    NotALayer(LayerId),
    /// Target layer has no feature store.
    NotAVectorLayer(LayerId),
    /// Opacity outside `0.0..=1.0`.
    InvalidOpacity(f64),
    /// New-layer form input rejected.
    InvalidForm(String),
}

impl Display for LayerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLayerName => write!(f, "layer name must not be blank"),
            Self::DuplicateLayerName { name, parent } => {
                write!(f, "layer name `{name}` already used in group {parent}")
            }
            Self::LayerNotFound(id) => write!(f, "layer not found: {id}"),
            Self::LayerAlreadyAttached(id) => write!(f, "layer already attached: {id}"),
            Self::ParentNotFound(id) => write!(f, "layer parent not found: {id}"),
            Self::ParentMustBeGroup(id) => write!(f, "layer parent must be group: {id}"),
            Self::CycleDetected { node, parent } => write!(
                f,
                "move would create cycle: node {node} under parent {parent}"
            ),
            Self::RootGroupImmutable => write!(f, "root layer group cannot be removed or moved"),
            Self::NotALayer(id) => write!(f, "node is a group, not a layer: {id}"),
            Self::NotAVectorLayer(id) => write!(f, "layer has no feature store: {id}"),
            Self::InvalidOpacity(value) => write!(f, "opacity must be within 0..=1: {value}"),
            Self::InvalidForm(reason) => write!(f, "invalid layer form: {reason}"),
        }
    }
}

impl Error for LayerError {}

/// Creation options shared by the layer factories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerOptions {
    pub visible: bool,
    pub opacity: f64,
    /// Target group, map root when `None`.
    pub parent: Option<LayerId>,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
            parent: None,
        }
    }
}

impl LayerOptions {
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn in_group(mut self, parent: LayerId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Change notification consumed by the layer tree UI.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerTreeEvent {
    Added {
        id: LayerId,
        parent: LayerId,
        position: usize,
    },
    Removed {
        id: LayerId,
        parent: LayerId,
    },
    Moved {
        id: LayerId,
        from_parent: LayerId,
        to_parent: LayerId,
        position: usize,
    },
    VisibilityChanged {
        id: LayerId,
        visible: bool,
    },
    OpacityChanged {
        id: LayerId,
        opacity: f64,
    },
}

/// One row of the depth-first tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRow {
    pub id: LayerId,
    pub parent: LayerId,
    /// 0 for direct children of the root group.
    pub depth: usize,
    pub name: String,
    pub kind: &'static str,
    pub visible: bool,
}

/// Owner of one map's layer tree.
pub struct LayerManager {
    root: LayerGroup,
    listeners: Listeners<LayerTreeEvent>,
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerManager {
    /// Creates an empty tree with a root group named `Layers`.
    pub fn new() -> Self {
        Self {
            root: LayerGroup::new(ROOT_GROUP_NAME),
            listeners: Listeners::new(),
        }
    }

    pub fn root(&self) -> &LayerGroup {
        &self.root
    }

    pub fn root_id(&self) -> LayerId {
        self.root.id
    }

    /// Subscribes to layer tree changes.
    pub fn on_changed(
        &mut self,
        listener: impl FnMut(&LayerTreeEvent) + 'static,
    ) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.listeners.unsubscribe(subscription)
    }

    /// Creates a vector layer with an empty feature store and attaches it.
    ///
    /// The returned value is a snapshot; its feature store shares storage with
    /// the attached layer.
    pub fn create_vector_layer(
        &mut self,
        name: impl Into<String>,
        opts: LayerOptions,
    ) -> Result<Layer, LayerError> {
        let name = normalize_layer_name(name.into())?;
        self.attach_new(Layer::vector(name), opts)
    }

    /// Creates a raster service layer and attaches it.
    pub fn create_raster_service_layer(
        &mut self,
        name: impl Into<String>,
        descriptor: RasterServiceDescriptor,
        opts: LayerOptions,
    ) -> Result<Layer, LayerError> {
        let name = normalize_layer_name(name.into())?;
        self.attach_new(Layer::raster_service(name, descriptor), opts)
    }

    /// Handles the new raster layer form submit.
    pub fn create_raster_layer_from_form(
        &mut self,
        form: &NewRasterLayerForm,
    ) -> Result<Layer, LayerError> {
        let descriptor = form.to_descriptor()?;
        let opts = LayerOptions {
            visible: form.visible,
            opacity: 1.0,
            parent: form.parent,
        };
        self.create_raster_service_layer(form.name.clone(), descriptor, opts)
    }

    /// Builds a detached group preserving input order.
    ///
    /// Names are trimmed through the whole subtree.
    pub fn group_layers(
        &self,
        name: impl Into<String>,
        mut nodes: Vec<LayerNode>,
    ) -> Result<LayerGroup, LayerError> {
        let mut group = LayerGroup::new(normalize_layer_name(name.into())?);
        normalize_children(group.id, &mut nodes)?;
        let mut ids = HashSet::new();
        for node in &nodes {
            let mut subtree = Vec::new();
            collect_ids(node, &mut subtree);
            if let Some(id) = subtree.into_iter().find(|id| !ids.insert(*id)) {
                return Err(LayerError::LayerAlreadyAttached(id));
            }
        }
        group.children = nodes;
        Ok(group)
    }

    /// Appends `node` on top of `parent` (map root when `None`).
    pub fn add_layer(
        &mut self,
        node: impl Into<LayerNode>,
        parent: Option<LayerId>,
    ) -> Result<LayerId, LayerError> {
        let mut node = node.into();
        normalize_subtree(&mut node)?;
        let mut incoming = Vec::new();
        collect_ids(&node, &mut incoming);
        if let Some(id) = incoming.into_iter().find(|id| self.contains(*id)) {
            return Err(LayerError::LayerAlreadyAttached(id));
        }

        let parent_id = parent.unwrap_or(self.root.id);
        let group = self.group_mut(parent_id)?;
        if group.contains_name(node.name()) {
            return Err(LayerError::DuplicateLayerName {
                name: node.name().to_string(),
                parent: parent_id,
            });
        }

        let id = node.id();
        let kind = node.kind_label();
        let position = group.children.len();
        group.children.push(node);

        info!(
            "event=layer_add module=layer status=ok layer_id={} parent_id={} kind={}",
            id, parent_id, kind
        );
        self.listeners.emit(&LayerTreeEvent::Added {
            id,
            parent: parent_id,
            position,
        });
        Ok(id)
    }

    /// Detaches one node (with its subtree) and returns it.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<LayerNode, LayerError> {
        if id == self.root.id {
            return Err(LayerError::RootGroupImmutable);
        }
        let path = self.path_to(id).ok_or(LayerError::LayerNotFound(id))?;
        let parent = self.parent_of_path(&path);
        let (last, parents) = path.split_last().ok_or(LayerError::LayerNotFound(id))?;
        let group = group_at_mut(&mut self.root, parents).ok_or(LayerError::LayerNotFound(id))?;
        let removed = group.children.remove(*last);

        info!(
            "event=layer_remove module=layer status=ok layer_id={} parent_id={}",
            id, parent
        );
        self.listeners.emit(&LayerTreeEvent::Removed { id, parent });
        Ok(removed)
    }

    /// Moves one node under `new_parent` (map root when `None`).
    ///
    /// `position` is clamped to the target's child count; `None` appends.
    pub fn move_layer(
        &mut self,
        id: LayerId,
        new_parent: Option<LayerId>,
        position: Option<usize>,
    ) -> Result<(), LayerError> {
        if id == self.root.id {
            return Err(LayerError::RootGroupImmutable);
        }
        let path = self.path_to(id).ok_or(LayerError::LayerNotFound(id))?;
        let from_parent = self.parent_of_path(&path);
        let target = new_parent.unwrap_or(self.root.id);

        let node = node_at(&self.root, &path).ok_or(LayerError::LayerNotFound(id))?;
        if node.contains_id(target) {
            return Err(LayerError::CycleDetected {
                node: id,
                parent: target,
            });
        }
        let target_group = self.group(target)?;
        if target != from_parent && target_group.contains_name(node.name()) {
            return Err(LayerError::DuplicateLayerName {
                name: node.name().to_string(),
                parent: target,
            });
        }

        let (last, parents) = path.split_last().ok_or(LayerError::LayerNotFound(id))?;
        let node = group_at_mut(&mut self.root, parents)
            .ok_or(LayerError::LayerNotFound(id))?
            .children
            .remove(*last);
        let destination = self.group_mut(target)?;
        let position = position
            .unwrap_or(destination.children.len())
            .min(destination.children.len());
        destination.children.insert(position, node);

        info!(
            "event=layer_move module=layer status=ok layer_id={} from_parent={} to_parent={} position={}",
            id, from_parent, target, position
        );
        self.listeners.emit(&LayerTreeEvent::Moved {
            id,
            from_parent,
            to_parent: target,
            position,
        });
        Ok(())
    }

    /// Sets node visibility. Emits only when the flag changes.
    pub fn set_visibility(&mut self, id: LayerId, visible: bool) -> Result<(), LayerError> {
        let changed = if id == self.root.id {
            let changed = self.root.visible != visible;
            self.root.visible = visible;
            changed
        } else {
            let path = self.path_to(id).ok_or(LayerError::LayerNotFound(id))?;
            let node = node_at_mut(&mut self.root, &path).ok_or(LayerError::LayerNotFound(id))?;
            let changed = node.visible() != visible;
            node.set_visible(visible);
            changed
        };

        if changed {
            self.listeners
                .emit(&LayerTreeEvent::VisibilityChanged { id, visible });
        }
        Ok(())
    }

    /// Sets layer opacity in `0.0..=1.0`.
    pub fn set_opacity(&mut self, id: LayerId, opacity: f64) -> Result<(), LayerError> {
        validate_opacity(opacity)?;
        let path = self.path_to(id).ok_or(LayerError::LayerNotFound(id))?;
        match node_at_mut(&mut self.root, &path) {
            Some(LayerNode::Layer(layer)) => layer.opacity = opacity,
            Some(LayerNode::Group(_)) => return Err(LayerError::NotALayer(id)),
            None => return Err(LayerError::LayerNotFound(id)),
        }
        self.listeners
            .emit(&LayerTreeEvent::OpacityChanged { id, opacity });
        Ok(())
    }

    /// Returns whether `id` is the root or any node in the tree.
    pub fn contains(&self, id: LayerId) -> bool {
        id == self.root.id || self.path_to(id).is_some()
    }

    /// Looks up one non-root node.
    pub fn find(&self, id: LayerId) -> Option<&LayerNode> {
        let path = self.path_to(id)?;
        node_at(&self.root, &path)
    }

    /// Depth-first lookup by name, first match wins.
    pub fn find_by_name(&self, name: &str) -> Option<&LayerNode> {
        find_named(&self.root, name.trim())
    }

    /// Looks up a group, including the root.
    pub fn group(&self, id: LayerId) -> Result<&LayerGroup, LayerError> {
        if id == self.root.id {
            return Ok(&self.root);
        }
        match self.find(id) {
            Some(LayerNode::Group(group)) => Ok(group),
            Some(LayerNode::Layer(_)) => Err(LayerError::ParentMustBeGroup(id)),
            None => Err(LayerError::ParentNotFound(id)),
        }
    }

    /// Children of `parent` (map root when `None`) in render order.
    pub fn children(&self, parent: Option<LayerId>) -> Result<&[LayerNode], LayerError> {
        self.group(parent.unwrap_or(self.root.id))
            .map(LayerGroup::children)
    }

    /// Shared feature store handle of one vector layer.
    pub fn feature_store(&self, id: LayerId) -> Result<FeatureStore, LayerError> {
        match self.find(id) {
            Some(LayerNode::Layer(layer)) => layer
                .feature_store()
                .cloned()
                .ok_or(LayerError::NotAVectorLayer(id)),
            Some(LayerNode::Group(_)) => Err(LayerError::NotALayer(id)),
            None => Err(LayerError::LayerNotFound(id)),
        }
    }

    /// Depth-first listing of every node below the root.
    pub fn flatten(&self) -> Vec<LayerRow> {
        let mut rows = Vec::new();
        flatten_into(&self.root, 0, &mut rows);
        rows
    }

    fn attach_new(&mut self, mut layer: Layer, opts: LayerOptions) -> Result<Layer, LayerError> {
        validate_opacity(opts.opacity)?;
        layer.visible = opts.visible;
        layer.opacity = opts.opacity;
        self.add_layer(layer.clone(), opts.parent)?;
        Ok(layer)
    }

    fn group_mut(&mut self, id: LayerId) -> Result<&mut LayerGroup, LayerError> {
        if id == self.root.id {
            return Ok(&mut self.root);
        }
        let path = self.path_to(id).ok_or(LayerError::ParentNotFound(id))?;
        match node_at_mut(&mut self.root, &path) {
            Some(LayerNode::Group(group)) => Ok(group),
            Some(LayerNode::Layer(_)) => Err(LayerError::ParentMustBeGroup(id)),
            None => Err(LayerError::ParentNotFound(id)),
        }
    }

    fn path_to(&self, id: LayerId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        locate(&self.root, id, &mut path).then_some(path)
    }

    fn parent_of_path(&self, path: &[usize]) -> LayerId {
        match path.split_last() {
            Some((_, parents)) if !parents.is_empty() => node_at(&self.root, parents)
                .map(LayerNode::id)
                .unwrap_or(self.root.id),
            _ => self.root.id,
        }
    }
}

fn normalize_layer_name(value: String) -> Result<String, LayerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LayerError::InvalidLayerName);
    }
    Ok(trimmed.to_string())
}

/// Trims names through the subtree and rejects blank or sibling-duplicate names.
fn normalize_subtree(node: &mut LayerNode) -> Result<(), LayerError> {
    let name = normalize_layer_name(node.name().to_string())?;
    match node {
        LayerNode::Layer(layer) => layer.name = name,
        LayerNode::Group(group) => {
            group.name = name;
            normalize_children(group.id, &mut group.children)?;
        }
    }
    Ok(())
}

fn normalize_children(parent: LayerId, children: &mut [LayerNode]) -> Result<(), LayerError> {
    let mut names = HashSet::new();
    for child in children.iter_mut() {
        normalize_subtree(child)?;
        if !names.insert(child.name().to_string()) {
            return Err(LayerError::DuplicateLayerName {
                name: child.name().to_string(),
                parent,
            });
        }
    }
    Ok(())
}

fn validate_opacity(opacity: f64) -> Result<(), LayerError> {
    if (0.0..=1.0).contains(&opacity) {
        Ok(())
    } else {
        Err(LayerError::InvalidOpacity(opacity))
    }
}

fn collect_ids(node: &LayerNode, out: &mut Vec<LayerId>) {
    out.push(node.id());
    if let LayerNode::Group(group) = node {
        for child in &group.children {
            collect_ids(child, out);
        }
    }
}

fn locate(group: &LayerGroup, id: LayerId, path: &mut Vec<usize>) -> bool {
    for (index, child) in group.children.iter().enumerate() {
        path.push(index);
        if child.id() == id {
            return true;
        }
        if let LayerNode::Group(inner) = child {
            if locate(inner, id, path) {
                return true;
            }
        }
        path.pop();
    }
    false
}

fn node_at<'a>(root: &'a LayerGroup, path: &[usize]) -> Option<&'a LayerNode> {
    let (last, parents) = path.split_last()?;
    let mut group = root;
    for index in parents {
        group = group.children.get(*index)?.as_group()?;
    }
    group.children.get(*last)
}

fn group_at_mut<'a>(root: &'a mut LayerGroup, path: &[usize]) -> Option<&'a mut LayerGroup> {
    let mut group = root;
    for index in path {
        group = match group.children.get_mut(*index)? {
            LayerNode::Group(inner) => inner,
            LayerNode::Layer(_) => return None,
        };
    }
    Some(group)
}

fn node_at_mut<'a>(root: &'a mut LayerGroup, path: &[usize]) -> Option<&'a mut LayerNode> {
    let (last, parents) = path.split_last()?;
    group_at_mut(root, parents)?.children.get_mut(*last)
}

fn find_named<'a>(group: &'a LayerGroup, name: &str) -> Option<&'a LayerNode> {
    for child in &group.children {
        if child.name() == name {
            return Some(child);
        }
        if let LayerNode::Group(inner) = child {
            if let Some(found) = find_named(inner, name) {
                return Some(found);
            }
        }
    }
    None
}

fn flatten_into(group: &LayerGroup, depth: usize, rows: &mut Vec<LayerRow>) {
    for child in &group.children {
        rows.push(LayerRow {
            id: child.id(),
            parent: group.id,
            depth,
            name: child.name().to_string(),
            kind: child.kind_label(),
            visible: child.visible(),
        });
        if let LayerNode::Group(inner) = child {
            flatten_into(inner, depth + 1, rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerError, LayerManager, LayerOptions, LayerTreeEvent};
    use crate::model::layer::{Layer, LayerGroup, RasterServiceDescriptor, RasterTiling};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorded(manager: &mut LayerManager) -> Rc<RefCell<Vec<LayerTreeEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        manager.on_changed(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    #[test]
    fn duplicate_name_in_same_group_is_rejected_without_event() {
        let mut manager = LayerManager::new();
        let events = recorded(&mut manager);
        manager
            .create_vector_layer("Addresses", LayerOptions::default())
            .unwrap();
        let err = manager
            .create_vector_layer(" Addresses ", LayerOptions::default())
            .unwrap_err();
        assert!(matches!(err, LayerError::DuplicateLayerName { .. }));
        assert_eq!(events.borrow().len(), 1);
        assert_eq!(manager.root().children().len(), 1);
    }

    #[test]
    fn remove_non_member_does_not_mutate() {
        let mut manager = LayerManager::new();
        manager
            .create_vector_layer("kept", LayerOptions::default())
            .unwrap();
        let events = recorded(&mut manager);
        let stranger = Layer::vector("stranger");

        let err = manager.remove_layer(stranger.id).unwrap_err();
        assert_eq!(err, LayerError::LayerNotFound(stranger.id));
        assert_eq!(manager.flatten().len(), 1);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn add_rejects_already_attached_node() {
        let mut manager = LayerManager::new();
        let layer = manager
            .create_vector_layer("a", LayerOptions::default())
            .unwrap();
        let group = manager.group_layers("g", vec![layer.into()]).unwrap();
        let err = manager.add_layer(group, None).unwrap_err();
        assert!(matches!(err, LayerError::LayerAlreadyAttached(_)));
    }

    #[test]
    fn group_layers_preserves_order_and_rejects_duplicates() {
        let manager = LayerManager::new();
        let group = manager
            .group_layers(
                "WMS",
                vec![
                    Layer::vector("one").into(),
                    Layer::vector("two").into(),
                    Layer::vector("three").into(),
                ],
            )
            .unwrap();
        let names = group
            .children()
            .iter()
            .map(|child| child.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["one", "two", "three"]);

        let err = manager
            .group_layers(
                "WMS",
                vec![Layer::vector("one").into(), Layer::vector("one").into()],
            )
            .unwrap_err();
        assert!(matches!(err, LayerError::DuplicateLayerName { .. }));
    }

    #[test]
    fn move_rejects_cycles_and_reorders() {
        let mut manager = LayerManager::new();
        let outer = manager.add_layer(LayerGroup::new("outer"), None).unwrap();
        let inner = manager
            .add_layer(LayerGroup::new("inner"), Some(outer))
            .unwrap();

        let err = manager.move_layer(outer, Some(inner), None).unwrap_err();
        assert!(matches!(err, LayerError::CycleDetected { .. }));
        let err = manager.move_layer(outer, Some(outer), None).unwrap_err();
        assert!(matches!(err, LayerError::CycleDetected { .. }));

        let a = manager
            .create_vector_layer("a", LayerOptions::default())
            .unwrap();
        manager.move_layer(a.id, None, Some(0)).unwrap();
        assert_eq!(manager.root().children()[0].id(), a.id);

        manager.move_layer(inner, None, None).unwrap();
        let rows = manager.flatten();
        assert!(rows.iter().all(|row| row.depth == 0));
        assert_eq!(rows.last().map(|row| row.id), Some(inner));
    }

    #[test]
    fn move_into_group_with_same_name_fails() {
        let mut manager = LayerManager::new();
        let group = manager.add_layer(LayerGroup::new("g"), None).unwrap();
        manager
            .create_vector_layer("x", LayerOptions::default().in_group(group))
            .unwrap();
        let root_x = manager
            .create_vector_layer("x", LayerOptions::default())
            .unwrap();
        let err = manager.move_layer(root_x.id, Some(group), None).unwrap_err();
        assert!(matches!(err, LayerError::DuplicateLayerName { .. }));
    }

    #[test]
    fn visibility_and_opacity_emit_events() {
        let mut manager = LayerManager::new();
        let layer = manager
            .create_raster_service_layer(
                "GRB Parcels",
                RasterServiceDescriptor::new("https://example.test/wms", RasterTiling::Image),
                LayerOptions::default().hidden(),
            )
            .unwrap();
        let events = recorded(&mut manager);

        manager.set_visibility(layer.id, false).unwrap();
        manager.set_visibility(layer.id, true).unwrap();
        manager.set_opacity(layer.id, 0.5).unwrap();
        assert_eq!(
            manager.set_opacity(layer.id, 1.5).unwrap_err(),
            LayerError::InvalidOpacity(1.5)
        );

        assert_eq!(
            *events.borrow(),
            vec![
                LayerTreeEvent::VisibilityChanged {
                    id: layer.id,
                    visible: true
                },
                LayerTreeEvent::OpacityChanged {
                    id: layer.id,
                    opacity: 0.5
                },
            ]
        );
    }

    #[test]
    fn root_cannot_be_removed_or_moved() {
        let mut manager = LayerManager::new();
        let root = manager.root_id();
        assert_eq!(
            manager.remove_layer(root).unwrap_err(),
            LayerError::RootGroupImmutable
        );
        assert_eq!(
            manager.move_layer(root, None, None).unwrap_err(),
            LayerError::RootGroupImmutable
        );
    }

    #[test]
    fn feature_store_requires_vector_layer() {
        let mut manager = LayerManager::new();
        let vector = manager
            .create_vector_layer("v", LayerOptions::default())
            .unwrap();
        let group = manager.add_layer(LayerGroup::new("g"), None).unwrap();

        let store = manager.feature_store(vector.id).unwrap();
        assert!(store.shares_storage_with(vector.feature_store().unwrap()));
        assert_eq!(
            manager.feature_store(group).unwrap_err(),
            LayerError::NotALayer(group)
        );
    }
}
