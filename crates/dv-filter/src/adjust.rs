//! Fit a saved filter value into a freshly computed domain

use dv_core::{Filter, FilterType, FilterValue, SelectValue, Value};
use serde_json::Value as Json;

/// Adjust a raw filter value to the filter's current domain.
///
/// Range endpoints outside the domain (or not numbers) are replaced by the
/// corresponding domain bound, and a value that is not a pair becomes the
/// whole domain. Set values keep only domain members; an unknown select
/// value becomes unset. Returns `None` when the filter has no usable
/// domain, and always for polygon filters.
pub fn adjust_value_to_filter_domain(value: &Json, filter: &Filter) -> Option<FilterValue> {
    let domain = filter.domain.as_ref()?;

    match filter.filter_type? {
        FilterType::Range | FilterType::TimeRange => {
            let (lo, hi) = domain.as_range()?;
            let bounds = [lo, hi];
            let [a, b] = match value.as_array().map(Vec::as_slice) {
                Some([first, second]) => {
                    let fit = |v: &Json, i: usize| {
                        v.as_f64()
                            .filter(|v| *v >= lo && *v <= hi)
                            .unwrap_or(bounds[i])
                    };
                    [fit(first, 0), fit(second, 1)]
                }
                _ => bounds,
            };
            Some(FilterValue::Range(if a <= b { [a, b] } else { [b, a] }))
        }
        FilterType::MultiSelect => {
            let members = domain.as_set()?;
            let selected = value
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::from_json)
                        .filter(|v| !v.is_null() && members.contains(v))
                        .collect()
                })
                .unwrap_or_default();
            Some(FilterValue::MultiSelect(selected))
        }
        FilterType::Select => {
            let members = domain.as_set()?;
            let selected = match Value::from_json(value) {
                Some(v) if !v.is_null() && members.contains(&v) => SelectValue::Value(v),
                _ => SelectValue::Unset,
            };
            Some(FilterValue::Select(selected))
        }
        FilterType::Polygon => None,
    }
}
