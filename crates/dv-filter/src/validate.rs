//! Validation of saved filters against loaded data
//!
//! Saved filters refer to datasets, fields and layers by id and name. These
//! functions resolve those references, recompute domains from the data and
//! fit the saved value into them. A filter that cannot be resolved is
//! rejected with a debug log rather than an error.

use dv_core::filter::OneOrMany;
use dv_core::{Domain, Filter, FilterConfig, FilterSpec, FilterType, Layer, TimeBins};
use dv_data::Dataset;
use serde_json::Value as Json;
use tracing::debug;

use crate::adjust::adjust_value_to_filter_domain;
use crate::domain::compare_members;
use crate::domain::get_field_domain;
use crate::domain::histogram::{pick_time_interval, time_bins_for_filter};

pub use dv_core::is_valid_filter_value;

/// Outcome of validating one filter against one dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    /// The validated filter, `None` when the filter was rejected
    pub filter: Option<Filter>,
}

impl ValidationResult {
    fn rejected(reason: &str) -> Self {
        debug!("Filter rejected: {}", reason);
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.filter.is_some()
    }
}

/// A fresh filter over `data_id` with default settings
pub fn get_default_filter(data_id: Vec<String>) -> Filter {
    Filter {
        data_id,
        ..Default::default()
    }
}

/// Column index `filter` reads in dataset `data_id`, if any
pub fn get_dataset_field_index_for_filter(data_id: &str, filter: &Filter) -> Option<usize> {
    let pos = filter.data_id.iter().position(|id| id == data_id)?;
    filter.field_idx.get(pos).copied().flatten()
}

fn parse_spec(spec: &Json) -> Option<FilterSpec> {
    match serde_json::from_value(spec.clone()) {
        Ok(spec) => Some(spec),
        Err(e) => {
            debug!("Malformed filter spec: {}", e);
            None
        }
    }
}

/// Id of a saved polygon filter that has none: the `filterId` its feature
/// was drawn with, else the feature id
fn polygon_filter_id(value: &Json) -> Option<String> {
    let id = value
        .pointer("/properties/filterId")
        .filter(|id| !id.is_null())
        .or_else(|| value.get("id"))?;
    match id {
        Json::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Validate a spatial filter.
///
/// The filter must name at least one layer, carry a polygon value, list
/// `dataset` in its `dataId`, and reference at least one of `layers`.
/// Polygon filters read no column, so the result has an empty `field_idx`.
/// A filter saved without an id takes one from its feature, so validating
/// the same filter twice yields the same id.
pub fn validate_polygon_filter(dataset: &Dataset, spec: &Json, layers: &[Layer]) -> ValidationResult {
    if spec.as_object().map_or(true, |o| o.is_empty()) {
        return ValidationResult::rejected("empty polygon filter");
    }
    let Some(mut spec) = parse_spec(spec) else {
        return ValidationResult::rejected("malformed polygon filter");
    };

    let Some(layer_id) = spec.layer_id.clone() else {
        return ValidationResult::rejected("polygon filter without layerId");
    };
    if spec.filter_type != Some(FilterType::Polygon) {
        return ValidationResult::rejected("not a polygon filter");
    }
    if !is_valid_filter_value(spec.filter_type, &spec.value) {
        return ValidationResult::rejected("polygon filter without a usable geometry");
    }

    let data_id = spec.data_id.clone().map(OneOrMany::into_vec).unwrap_or_default();
    if !data_id.contains(&dataset.id) {
        return ValidationResult::rejected("polygon filter does not apply to dataset");
    }
    if !layers.iter().any(|layer| layer_id.contains(&layer.id)) {
        return ValidationResult::rejected("polygon filter references no known layer");
    }

    if spec.id.is_none() {
        spec.id = polygon_filter_id(&spec.value);
    }
    match Filter::try_from(spec) {
        Ok(mut filter) => {
            filter.field_idx = Vec::new();
            ValidationResult { filter: Some(filter) }
        }
        Err(e) => ValidationResult::rejected(&e.to_string()),
    }
}

fn compatible(declared: FilterType, derived: FilterType) -> bool {
    let set_based = |t| matches!(t, FilterType::Select | FilterType::MultiSelect);
    declared == derived || (set_based(declared) && set_based(derived))
}

fn merge_domain(current: &Domain, other: &Domain) -> Domain {
    match (current, other) {
        (Domain::Range(a0, a1), Domain::Range(b0, b1)) => Domain::Range(a0.min(*b0), a1.max(*b1)),
        (Domain::Set(a), Domain::Set(b)) => {
            let mut members = a.clone();
            for v in b {
                if !members.contains(v) {
                    members.push(v.clone());
                }
            }
            members.sort_by(compare_members);
            Domain::Set(members)
        }
        _ => other.clone(),
    }
}

/// Point `filter` at column `field_name` of `dataset`.
///
/// `dataset_pos` is the dataset's position in `filter.data_id`. The first
/// dataset replaces the filter's domain with the field's, later datasets
/// widen it; a fixed domain is kept as is. Returns `None` when the dataset
/// has no such field.
pub fn apply_filter_field_name(
    mut filter: Filter,
    dataset: &Dataset,
    field_name: &str,
    dataset_pos: usize,
    config: &FilterConfig,
) -> Option<Filter> {
    let Some(field) = dataset.field(field_name) else {
        debug!("Dataset {} has no field {}", dataset.id, field_name);
        return None;
    };
    let props = field
        .filter_props
        .clone()
        .unwrap_or_else(|| get_field_domain(dataset.data_container.as_ref(), field, config));

    let filter_type = match filter.filter_type {
        Some(declared) if compatible(declared, props.filter_type) => declared,
        _ => props.filter_type,
    };
    filter.filter_type = Some(filter_type);
    filter.domain = Some(match filter.domain.take() {
        Some(domain) if filter.fixed_domain => domain,
        Some(domain) if dataset_pos > 0 => merge_domain(&domain, &props.domain),
        _ => props.domain,
    });
    filter.step = match (filter.step, props.step) {
        (Some(current), Some(step)) if dataset_pos > 0 => Some(current.min(step)),
        (current, step) => step.or(current),
    };
    if props.mapped_value.is_some() {
        filter.mapped_value = props.mapped_value;
    }
    if props.default_time_format.is_some() {
        filter.default_time_format = props.default_time_format;
    }
    if filter_type == FilterType::Range {
        filter.histogram = Some(props.histogram);
        filter.enlarged_histogram = Some(props.enlarged_histogram);
    }
    filter.field_type = Some(props.field_type);

    if filter.name.len() <= dataset_pos {
        filter.name.resize(dataset_pos + 1, String::new());
    }
    filter.name[dataset_pos] = field.name.clone();
    if filter.field_idx.len() <= dataset_pos {
        filter.field_idx.resize(dataset_pos + 1, None);
    }
    filter.field_idx[dataset_pos] = Some(field.field_idx);
    filter.is_animating = false;

    if filter_type == FilterType::TimeRange {
        if filter.plot_type.interval.is_none() {
            if let Some((lo, hi)) = filter.range_domain() {
                filter.plot_type.interval = Some(pick_time_interval(hi - lo, config.max_time_bins));
            }
        }
        let bins = time_bins_for_filter(&filter, std::slice::from_ref(dataset), config);
        filter.time_bins.get_or_insert_with(TimeBins::new).extend(bins);
    }

    Some(filter)
}

/// Validate a field based filter against `dataset`.
///
/// Resolves the filter's field in the dataset, recomputes its domain and
/// adjusts the saved value into it.
pub fn validate_filter(dataset: &Dataset, spec: &Json, config: &FilterConfig) -> ValidationResult {
    let Some(spec) = parse_spec(spec) else {
        return ValidationResult::rejected("malformed filter");
    };

    let data_id = spec.data_id.clone().map(OneOrMany::into_vec).unwrap_or_default();
    let Some(pos) = data_id.iter().position(|id| id == &dataset.id) else {
        return ValidationResult::rejected("filter does not apply to dataset");
    };
    let names = spec.name.clone().map(OneOrMany::into_vec).unwrap_or_default();
    let Some(field_name) = names.get(pos).cloned() else {
        return ValidationResult::rejected("filter names no field for dataset");
    };

    // the saved value is adjusted once the domain is known, and a domain
    // that is not fixed is recomputed from the data
    let raw_value = spec.value.clone();
    let domain = if spec.fixed_domain == Some(true) { spec.domain.clone() } else { Json::Null };
    let base = match Filter::try_from(FilterSpec { value: Json::Null, domain, ..spec }) {
        Ok(filter) => filter,
        Err(e) => return ValidationResult::rejected(&e.to_string()),
    };

    let Some(mut filter) = apply_filter_field_name(base, dataset, &field_name, pos, config) else {
        return ValidationResult::rejected("field not found");
    };
    match adjust_value_to_filter_domain(&raw_value, &filter) {
        Some(value) => filter.value = Some(value),
        None => return ValidationResult::rejected("value does not fit the field domain"),
    }

    ValidationResult { filter: Some(filter) }
}

/// Validate a filter with the validator for its type
pub fn validate_filter_with_data(
    dataset: &Dataset,
    spec: &Json,
    layers: &[Layer],
    config: &FilterConfig,
) -> ValidationResult {
    let filter_type = spec
        .get("type")
        .and_then(|t| serde_json::from_value::<FilterType>(t.clone()).ok());
    match filter_type {
        Some(FilterType::Polygon) => validate_polygon_filter(dataset, spec, layers),
        _ => validate_filter(dataset, spec, config),
    }
}
