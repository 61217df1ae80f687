//! Per-row filter predicates

use dv_core::{
    Field, Filter, FilterType, FilterValue, Layer, LayerColumns, PolygonFeature, Value,
};
use dv_data::DataContainer;
use serde_json::json;
use tracing::trace;

use crate::geometry::is_in_polygon;
use crate::validate::get_default_filter;

enum Test<'a> {
    /// Misconfigured or inapplicable filters keep every row
    Always,
    Range {
        field: &'a Field,
        lo: f64,
        hi: f64,
    },
    TimeRange {
        field: &'a Field,
        mapped_value: Option<&'a [f64]>,
        lo: f64,
        hi: f64,
    },
    MultiSelect {
        field: &'a Field,
        values: &'a [Value],
    },
    Select {
        field: &'a Field,
        value: Value,
    },
    Polygon {
        feature: &'a PolygonFeature,
        layers: Vec<&'a Layer>,
    },
}

/// Row predicate built from a filter, bound to one data container
pub struct FilterPredicate<'a> {
    container: &'a dyn DataContainer,
    test: Test<'a>,
}

impl<'a> FilterPredicate<'a> {
    fn always(container: &'a dyn DataContainer) -> Self {
        Self {
            container,
            test: Test::Always,
        }
    }

    /// Whether this predicate ignores its rows
    pub fn is_vacuous(&self) -> bool {
        matches!(self.test, Test::Always)
    }

    fn cell(&self, field: &Field, row: usize) -> Value {
        field.resolve(self.container.value_at(row, field.field_idx))
    }

    fn position(&self, row: usize, lat: usize, lng: usize) -> [f64; 2] {
        let coord = |column| self.container.value_at(row, column).as_f64().unwrap_or(f64::NAN);
        [coord(lng), coord(lat)]
    }

    fn layer_contains(&self, layer: &Layer, feature: &PolygonFeature, row: usize) -> bool {
        match layer.config.columns {
            LayerColumns::Point { lat, lng } => is_in_polygon(self.position(row, lat, lng), feature),
            LayerColumns::Arc { lat0, lng0, lat1, lng1 } => {
                is_in_polygon(self.position(row, lat0, lng0), feature)
                    && is_in_polygon(self.position(row, lat1, lng1), feature)
            }
            LayerColumns::None => true,
        }
    }

    pub fn matches(&self, row: usize) -> bool {
        match &self.test {
            Test::Always => true,
            Test::Range { field, lo, hi } => self
                .cell(field, row)
                .as_f64()
                .is_some_and(|v| v >= *lo && v <= *hi),
            Test::TimeRange { field, mapped_value, lo, hi } => {
                let ts = match mapped_value {
                    Some(values) => values.get(row).copied(),
                    None => dv_data::timestamp::cell_to_timestamp_ms(
                        &self.cell(field, row),
                        field.format.as_deref(),
                    ),
                };
                ts.is_some_and(|t| t >= *lo && t <= *hi)
            }
            Test::MultiSelect { field, values } => values.contains(&self.cell(field, row)),
            Test::Select { field, value } => self.cell(field, row) == *value,
            Test::Polygon { feature, layers } => layers
                .iter()
                .all(|layer| self.layer_contains(layer, feature, row)),
        }
    }
}

/// Current `[lo, hi]` of a range filter, falling back to its domain
fn range_bounds(filter: &Filter) -> Option<(f64, f64)> {
    match filter.value.as_ref().and_then(FilterValue::as_range) {
        Some([lo, hi]) => Some((lo, hi)),
        None => filter.range_domain(),
    }
}

/// Precomputed timestamps for every row of `container`, from the field or
/// else from the filter
fn row_timestamps<'a>(
    field: &'a Field,
    filter: &'a Filter,
    container: &dyn DataContainer,
) -> Option<&'a [f64]> {
    let rows = container.num_rows();
    field
        .filter_props
        .as_ref()
        .and_then(|p| p.mapped_value.as_deref())
        .into_iter()
        .chain(filter.mapped_value.as_deref())
        .find(|values| values.len() == rows)
}

/// Build the row predicate of `filter` for dataset `data_id`.
///
/// `field` is the column the filter reads in this dataset. Field filters
/// without a field or a usable value, and polygon filters with no layer on
/// this dataset, keep every row.
pub fn get_filter_function<'a>(
    field: Option<&'a Field>,
    data_id: &str,
    filter: &'a Filter,
    layers: &'a [Layer],
    container: &'a dyn DataContainer,
) -> FilterPredicate<'a> {
    let always = FilterPredicate::always(container);
    let Some(filter_type) = filter.filter_type else {
        return always;
    };

    let test = match (filter_type, field, &filter.value) {
        (FilterType::Range, Some(field), _) => match range_bounds(filter) {
            Some((lo, hi)) => Test::Range { field, lo, hi },
            None => return always,
        },
        (FilterType::TimeRange, Some(field), _) => match range_bounds(filter) {
            Some((lo, hi)) => Test::TimeRange {
                field,
                mapped_value: row_timestamps(field, filter, container),
                lo,
                hi,
            },
            None => return always,
        },
        (FilterType::MultiSelect, Some(field), Some(FilterValue::MultiSelect(values))) => {
            Test::MultiSelect { field, values }
        }
        (FilterType::Select, Some(field), Some(FilterValue::Select(value))) => Test::Select {
            field,
            value: value.as_value(),
        },
        (FilterType::Polygon, _, Some(FilterValue::Polygon(feature))) => {
            let layers: Vec<&Layer> = filter
                .layer_id
                .iter()
                .filter_map(|id| layers.iter().find(|layer| &layer.id == id))
                .filter(|layer| layer.config.data_id.as_deref() == Some(data_id))
                .collect();
            if layers.is_empty() {
                return always;
            }
            Test::Polygon { feature, layers }
        }
        _ => {
            trace!("Filter {} has no predicate for dataset {}", filter.id, data_id);
            return always;
        }
    };

    FilterPredicate { container, test }
}

/// Rows of `container` that pass every predicate
pub fn filtered_indices(container: &dyn DataContainer, predicates: &[FilterPredicate<'_>]) -> Vec<usize> {
    (0..container.num_rows())
        .filter(|&row| predicates.iter().all(|p| p.matches(row)))
        .collect()
}

/// A polygon filter over every dataset drawn by `layers`
pub fn generate_polygon_filter(layers: &[Layer], feature: &PolygonFeature) -> Filter {
    let mut data_id: Vec<String> = Vec::new();
    for id in layers.iter().filter_map(|layer| layer.config.data_id.clone()) {
        if !data_id.contains(&id) {
            data_id.push(id);
        }
    }

    let filter = get_default_filter(data_id);
    let mut value = feature.clone();
    value.set_property("filterId", json!(filter.id));
    value.set_property("isVisible", json!(true));

    Filter {
        filter_type: Some(FilterType::Polygon),
        fixed_domain: true,
        name: layers.iter().map(|layer| layer.config.label.clone()).collect(),
        layer_id: layers.iter().map(|layer| layer.id.clone()).collect(),
        value: Some(FilterValue::Polygon(value)),
        ..filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dv_core::{Domain, FieldType, SelectValue};
    use dv_data::create_data_container;
    use geo_types::{LineString, MultiPolygon, Polygon};

    fn rectangle() -> PolygonFeature {
        let ring = LineString::from(vec![
            (120.21949418752885, 23.755486652156186),
            (120.21949418752885, 23.221461105318184),
            (121.05994828909135, 23.221461105318184),
            (121.05994828909135, 23.755486652156186),
            (120.21949418752885, 23.755486652156186),
        ]);
        PolygonFeature::new("rect", MultiPolygon(vec![Polygon::new(ring, vec![])]))
    }

    fn points() -> impl DataContainer {
        let n = Value::Number;
        // lat, lng, lat1, lng1, score, city
        create_data_container(vec![
            vec![n(23.667604), n(120.47448), n(23.5), n(120.5), n(3.0), Value::from("a")],
            vec![n(23.667604), n(119.47448), n(23.5), n(120.5), n(8.0), Value::from("b")],
            vec![n(23.5), n(120.5), n(30.0), n(120.5), n(5.0), Value::Null],
        ])
    }

    fn polygon_filter(layer_ids: &[&str]) -> Filter {
        Filter {
            filter_type: Some(FilterType::Polygon),
            layer_id: layer_ids.iter().map(|s| s.to_string()).collect(),
            value: Some(FilterValue::Polygon(rectangle())),
            ..Default::default()
        }
    }

    #[test]
    fn test_polygon_filter_on_point_layer() {
        let container = points();
        let layers = vec![Layer::new("layer1")
            .with_data("puppy", "Points")
            .with_columns(LayerColumns::Point { lat: 0, lng: 1 })];
        let filter = polygon_filter(&["layer1"]);

        let predicate = get_filter_function(None, "puppy", &filter, &layers, &container);
        assert!(predicate.matches(0));
        assert!(!predicate.matches(1));
        assert!(predicate.matches(2));
    }

    #[test]
    fn test_polygon_filter_on_arc_layer_needs_both_ends() {
        let container = points();
        let layers = vec![Layer::new("arcs").with_data("puppy", "Arcs").with_columns(
            LayerColumns::Arc { lat0: 0, lng0: 1, lat1: 2, lng1: 3 },
        )];
        let filter = polygon_filter(&["arcs"]);

        let predicate = get_filter_function(None, "puppy", &filter, &layers, &container);
        assert!(predicate.matches(0));
        assert!(!predicate.matches(1));
        // destination at lat 30 is outside
        assert!(!predicate.matches(2));
    }

    #[test]
    fn test_polygon_filter_without_matching_layer_keeps_rows() {
        let container = points();
        let filter = polygon_filter(&["layer1"]);

        let no_layers = get_filter_function(None, "puppy", &filter, &[], &container);
        assert!(no_layers.is_vacuous());
        assert!(no_layers.matches(1));

        let layers = vec![Layer::new("layer1")
            .with_data("puppy", "Points")
            .with_columns(LayerColumns::Point { lat: 0, lng: 1 })];
        let other_dataset = get_filter_function(None, "puppy-2", &filter, &layers, &container);
        assert!(other_dataset.matches(1));
    }

    #[test]
    fn test_range_and_select_predicates() {
        let container = points();
        let score = Field::new("score", FieldType::Real, 4);
        let city = Field::new("city", FieldType::String, 5);

        let range = Filter {
            filter_type: Some(FilterType::Range),
            domain: Some(Domain::Range(3.0, 8.0)),
            value: Some(FilterValue::Range([4.0, 8.0])),
            ..Default::default()
        };
        let predicate = get_filter_function(Some(&score), "puppy", &range, &[], &container);
        assert_eq!(filtered_indices(&container, &[predicate]), vec![1, 2]);

        let multi = Filter {
            filter_type: Some(FilterType::MultiSelect),
            value: Some(FilterValue::MultiSelect(vec!["a".into(), "b".into()])),
            ..Default::default()
        };
        let multi = get_filter_function(Some(&city), "puppy", &multi, &[], &container);
        let range = get_filter_function(Some(&score), "puppy", &range, &[], &container);
        assert_eq!(filtered_indices(&container, &[multi, range]), vec![1]);

        let select = Filter {
            filter_type: Some(FilterType::Select),
            value: Some(FilterValue::Select(SelectValue::Value("a".into()))),
            ..Default::default()
        };
        let select = get_filter_function(Some(&city), "puppy", &select, &[], &container);
        assert_eq!(filtered_indices(&container, &[select]), vec![0]);
    }

    #[test]
    fn test_time_range_uses_mapped_values() {
        let container = create_data_container(vec![
            vec![Value::from("2016-10-01 09:45:39")],
            vec![Value::from("2016-10-01 09:45:45")],
            vec![Value::from("not a time")],
        ]);
        let field = Field::new("time", FieldType::Timestamp, 0);
        let filter = Filter {
            filter_type: Some(FilterType::TimeRange),
            value: Some(FilterValue::Range([1475315139000.0, 1475315140000.0])),
            ..Default::default()
        };

        let predicate = get_filter_function(Some(&field), "puppy", &filter, &[], &container);
        assert_eq!(filtered_indices(&container, &[predicate]), vec![0]);
    }

    #[test]
    fn test_time_range_reads_filter_mapped_values() {
        let container = create_data_container(vec![
            vec![Value::from("not a time")],
            vec![Value::from("not a time")],
        ]);
        let field = Field::new("time", FieldType::Timestamp, 0);
        let mut filter = Filter {
            filter_type: Some(FilterType::TimeRange),
            value: Some(FilterValue::Range([10.0, 20.0])),
            mapped_value: Some(vec![15.0, 25.0]),
            ..Default::default()
        };

        let predicate = get_filter_function(Some(&field), "puppy", &filter, &[], &container);
        assert_eq!(filtered_indices(&container, &[predicate]), vec![0]);

        // values for another dataset's rows are not used
        filter.mapped_value = Some(vec![15.0]);
        let predicate = get_filter_function(Some(&field), "puppy", &filter, &[], &container);
        assert!(filtered_indices(&container, &[predicate]).is_empty());
    }

    #[test]
    fn test_field_filter_without_field_keeps_rows() {
        let container = points();
        let range = Filter {
            filter_type: Some(FilterType::Range),
            value: Some(FilterValue::Range([100.0, 200.0])),
            ..Default::default()
        };
        assert!(get_filter_function(None, "puppy", &range, &[], &container).is_vacuous());
        let untyped = Filter::default();
        assert!(get_filter_function(None, "puppy", &untyped, &[], &container).is_vacuous());
    }

    #[test]
    fn test_generate_polygon_filter() {
        let layers = vec![
            Layer::new("a").with_data("puppy", "Points"),
            Layer::new("b").with_data("puppy", "Arcs"),
        ];
        let filter = generate_polygon_filter(&layers, &rectangle());

        assert_eq!(filter.filter_type, Some(FilterType::Polygon));
        assert_eq!(filter.data_id, vec!["puppy".to_string()]);
        assert_eq!(filter.layer_id, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(filter.name, vec!["Points".to_string(), "Arcs".to_string()]);
        assert!(filter.fixed_domain);
        let Some(FilterValue::Polygon(feature)) = &filter.value else {
            panic!("expected a polygon value");
        };
        assert_eq!(feature.properties["filterId"], json!(filter.id));
        assert_eq!(feature.properties["isVisible"], json!(true));
    }
}
