//! Tabular projections of a feature collection.
//!
//! Geometry-valued attributes never appear in grid columns or property rows.

use crate::model::feature::{Feature, FeatureCollection, FeatureId};
use serde::Serialize;

/// One grid row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub id: FeatureId,
    /// Display text per column, empty when the feature lacks the attribute.
    pub cells: Vec<String>,
    pub selected: bool,
}

/// Feature grid contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureGrid {
    /// Union of non-geometry attribute names, first-seen order.
    pub columns: Vec<String>,
    pub rows: Vec<GridRow>,
    pub possibly_truncated: bool,
}

impl FeatureGrid {
    pub fn build(
        collection: &FeatureCollection,
        selection: &[FeatureId],
        possibly_truncated: bool,
    ) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for feature in collection {
            for (name, _) in feature.displayable_attributes() {
                if !columns.iter().any(|column| column == name) {
                    columns.push(name.to_string());
                }
            }
        }

        let rows = collection
            .iter()
            .map(|feature| GridRow {
                id: feature.id.clone(),
                cells: columns
                    .iter()
                    .map(|column| {
                        feature
                            .attribute(column)
                            .filter(|value| !value.is_geometry())
                            .map(|value| value.display_text())
                            .unwrap_or_default()
                    })
                    .collect(),
                selected: selection.contains(&feature.id),
            })
            .collect();

        Self {
            columns,
            rows,
            possibly_truncated,
        }
    }

    /// Index of the row showing `id`.
    pub fn row_index(&self, id: &FeatureId) -> Option<usize> {
        self.rows.iter().position(|row| &row.id == id)
    }
}

/// One name/value line of the feature-properties window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyRow {
    pub key: usize,
    pub name: String,
    pub value: String,
}

/// Property table of one feature, shown as one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureProperties {
    pub id: FeatureId,
    pub rows: Vec<PropertyRow>,
}

impl FeatureProperties {
    pub fn from_feature(feature: &Feature) -> Self {
        let rows = feature
            .displayable_attributes()
            .enumerate()
            .map(|(key, (name, value))| PropertyRow {
                key,
                name: name.to_string(),
                value: value.display_text(),
            })
            .collect();
        Self {
            id: feature.id.clone(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureGrid, FeatureProperties};
    use crate::model::feature::{AttributeValue, Feature, FeatureCollection, FeatureId};
    use geo::{point, Geometry};

    fn collection() -> FeatureCollection {
        FeatureCollection::try_new(vec![
            Feature::new("a")
                .with_attribute("street", AttributeValue::Text("Kerkstraat".to_string()))
                .with_geometry("pos", Geometry::Point(point! { x: 1.0, y: 1.0 })),
            Feature::new("b")
                .with_attribute("number", AttributeValue::Number(3.0))
                .with_attribute("street", AttributeValue::Text("Markt".to_string())),
        ])
        .unwrap()
    }

    #[test]
    fn columns_are_first_seen_union_without_geometry() {
        let grid = FeatureGrid::build(&collection(), &[FeatureId::from("b")], true);
        assert_eq!(grid.columns, vec!["street", "number"]);
        assert_eq!(grid.rows[0].cells, vec!["Kerkstraat", ""]);
        assert_eq!(grid.rows[1].cells, vec!["Markt", "3"]);
        assert!(!grid.rows[0].selected);
        assert!(grid.rows[1].selected);
        assert_eq!(grid.row_index(&FeatureId::from("b")), Some(1));
        assert!(grid.possibly_truncated);
    }

    #[test]
    fn property_rows_skip_geometry_and_are_keyed_in_order() {
        let collection = collection();
        let feature = collection.get(&FeatureId::from("a")).unwrap();
        let properties = FeatureProperties::from_feature(feature);
        assert_eq!(properties.rows.len(), 1);
        assert_eq!(properties.rows[0].key, 0);
        assert_eq!(properties.rows[0].name, "street");
        assert_eq!(properties.rows[0].value, "Kerkstraat");
    }
}
