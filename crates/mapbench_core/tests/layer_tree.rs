use mapbench_core::{
    Layer, LayerError, LayerGroup, LayerManager, LayerOptions, LayerTreeEvent, NewRasterLayerForm,
};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn duplicate_name_in_one_group_is_rejected() {
    let mut layers = LayerManager::new();
    let group = layers.group_layers("WFS", Vec::new()).unwrap();
    let group_id = layers.add_layer(group, None).unwrap();

    layers
        .create_vector_layer("Addresses", LayerOptions::default().in_group(group_id))
        .unwrap();
    let err = layers
        .create_vector_layer("Addresses", LayerOptions::default().in_group(group_id))
        .unwrap_err();

    assert_eq!(
        err,
        LayerError::DuplicateLayerName {
            name: "Addresses".to_string(),
            parent: group_id,
        }
    );
}

#[test]
fn same_name_in_different_groups_is_allowed() {
    let mut layers = LayerManager::new();
    let first = layers.group_layers("WMS", Vec::new()).unwrap();
    let first = layers.add_layer(first, None).unwrap();
    let second = layers.group_layers("WFS", Vec::new()).unwrap();
    let second = layers.add_layer(second, None).unwrap();

    layers
        .create_vector_layer("Addresses", LayerOptions::default().in_group(first))
        .unwrap();
    layers
        .create_vector_layer("Addresses", LayerOptions::default().in_group(second))
        .unwrap();

    let rows = layers.flatten();
    let addresses = rows.iter().filter(|row| row.name == "Addresses").count();
    assert_eq!(addresses, 2);
}

#[test]
fn events_describe_every_tree_mutation() {
    let mut layers = LayerManager::new();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    layers.on_changed(move |event| sink.borrow_mut().push(event.clone()));

    let root = layers.root_id();
    let layer = layers
        .create_vector_layer("Parcels", LayerOptions::default())
        .unwrap();
    layers.set_visibility(layer.id, false).unwrap();
    layers.set_visibility(layer.id, false).unwrap();
    layers.remove_layer(layer.id).unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            LayerTreeEvent::Added {
                id: layer.id,
                parent: root,
                position: 0,
            },
            LayerTreeEvent::VisibilityChanged {
                id: layer.id,
                visible: false,
            },
            LayerTreeEvent::Removed {
                id: layer.id,
                parent: root,
            },
        ]
    );
    assert_eq!(layers.remove_layer(layer.id).unwrap_err(), LayerError::LayerNotFound(layer.id));
}

#[test]
fn form_submit_creates_tiled_raster_layer() {
    let mut layers = LayerManager::new();
    let form = NewRasterLayerForm {
        name: "Orthophoto".to_string(),
        url: "https://geoservices.informatievlaanderen.be/raadpleegdiensten/omw/wms".to_string(),
        layers: "OMWRGBMRVL".to_string(),
        ..NewRasterLayerForm::default()
    };

    let layer = layers.create_raster_layer_from_form(&form).unwrap();
    let descriptor = layer.raster_service_descriptor().unwrap();
    assert_eq!(descriptor.param("LAYERS"), Some("OMWRGBMRVL"));
    assert_eq!(descriptor.param("FORMAT"), Some("image/png"));
    assert_eq!(descriptor.param("TILED"), Some("true"));

    let bad = NewRasterLayerForm {
        url: "not a url".to_string(),
        ..form
    };
    assert!(matches!(
        layers.create_raster_layer_from_form(&bad),
        Err(LayerError::InvalidForm(_))
    ));
}

#[test]
fn padded_name_counts_as_duplicate() {
    let mut layers = LayerManager::new();
    layers
        .create_vector_layer("Addresses", LayerOptions::default())
        .unwrap();

    let err = layers.add_layer(Layer::vector(" Addresses "), None).unwrap_err();
    assert_eq!(
        err,
        LayerError::DuplicateLayerName {
            name: "Addresses".to_string(),
            parent: layers.root().id,
        }
    );

    let id = layers.add_layer(Layer::vector("  Parcels "), None).unwrap();
    assert_eq!(layers.find(id).unwrap().name(), "Parcels");
}

#[test]
fn grouped_names_are_trimmed_and_checked() {
    let layers = LayerManager::new();
    let err = layers
        .group_layers(
            "WMS",
            vec![Layer::vector("Parcels").into(), Layer::vector(" Parcels").into()],
        )
        .unwrap_err();
    assert!(matches!(err, LayerError::DuplicateLayerName { ref name, .. } if name == "Parcels"));

    let inner = layers
        .group_layers("Inner", vec![Layer::vector(" a ").into()])
        .unwrap();
    let outer = layers
        .group_layers(" Outer ", vec![inner.into()])
        .unwrap();
    assert_eq!(outer.name, "Outer");
    let inner = outer.children()[0].as_group().unwrap();
    assert_eq!(inner.children()[0].name(), "a");
}

#[test]
fn move_into_group_holding_same_name_is_rejected() {
    let mut layers = LayerManager::new();
    let group = layers
        .group_layers("WFS", vec![Layer::vector("Addresses").into()])
        .unwrap();
    let group_id = layers.add_layer(group, None).unwrap();
    let loose = layers
        .create_vector_layer(" Addresses", LayerOptions::default())
        .unwrap();

    let err = layers.move_layer(loose.id, Some(group_id), None).unwrap_err();
    assert!(matches!(err, LayerError::DuplicateLayerName { parent, .. } if parent == group_id));
}
