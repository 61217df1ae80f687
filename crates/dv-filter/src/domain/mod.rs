//! Field domain calculation
//!
//! Domains, slider steps and histograms for every field type. Timestamp
//! fields also get the per-row `mapped_value` array used by time filters
//! and time histograms.

use std::cmp::Ordering;

use dv_core::{Bin, Domain, Field, FieldDomain, FieldType, FilterConfig, FilterProps, Value};
use dv_data::{timestamp_accessor, DataContainer};
use serde::Serialize;
use tracing::trace;

pub mod histogram;

use histogram::histogram_from_domain;

/// Domain of a timestamp field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampFieldDomain {
    pub domain: [f64; 2],
    /// Row aligned timestamps in ms; NaN where a row has no usable time
    pub mapped_value: Vec<f64>,
    pub step: f64,
    pub default_time_format: String,
}

/// Domain of a numeric field with its histograms
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericFieldDomain {
    pub domain: [f64; 2],
    pub step: f64,
    pub histogram: Vec<Bin>,
    pub enlarged_histogram: Vec<Bin>,
}

/// `[min, max]` over the finite values, `None` when there are none
fn linear_domain(values: &[f64]) -> Option<[f64; 2]> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some([v, v]),
            Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
        })
}

/// Domain, mapped values and slider step of a timestamp field.
///
/// `accessor` returns ms since epoch for a row index, NaN when the row has
/// no usable timestamp. A zero span is padded after the step is chosen, so
/// equal timestamps always report the finest step.
pub fn get_timestamp_field_domain(
    container: &dyn DataContainer,
    accessor: impl Fn(usize) -> f64,
    config: &FilterConfig,
) -> TimestampFieldDomain {
    let mapped_value: Vec<f64> = (0..container.num_rows()).map(accessor).collect();
    let mut domain = linear_domain(&mapped_value).unwrap_or([0.0, 0.0]);

    let span = domain[1] - domain[0];
    let step = config.timestamp_step(span);
    if span == 0.0 {
        domain[1] = domain[0] + config.equal_timestamp_padding_ms;
    }

    trace!("timestamp domain {:?} over {} rows, step {}", domain, mapped_value.len(), step);

    TimestampFieldDomain {
        domain,
        mapped_value,
        step,
        default_time_format: config.default_time_format.clone(),
    }
}

/// Slider step for a numeric span
pub fn get_numeric_step_size(span: f64) -> f64 {
    let span = span.abs();
    if span > 100.0 {
        1.0
    } else if span > 3.0 {
        0.01
    } else if span > 1.0 {
        0.001
    } else {
        // order of magnitude of a thousandth of the span
        let exponent = format!("{:e}", span / 1000.0)
            .split('e')
            .nth(1)
            .and_then(|e| e.parse::<i32>().ok())
            .unwrap_or(0);
        format!("1e{exponent}").parse().unwrap_or(1.0)
    }
}

/// Domain, step and histograms of a numeric field
pub fn get_numeric_field_domain(
    container: &dyn DataContainer,
    accessor: impl Fn(usize) -> f64,
    config: &FilterConfig,
) -> NumericFieldDomain {
    let values: Vec<f64> = (0..container.num_rows()).map(accessor).collect();
    let domain = linear_domain(&values).unwrap_or([0.0, 0.0]);
    numeric_domain_over(domain, &values, config)
}

fn numeric_domain_over(mut domain: [f64; 2], values: &[f64], config: &FilterConfig) -> NumericFieldDomain {
    if domain[1] == domain[0] {
        domain[1] = domain[0] + 1.0;
    }

    let step = get_numeric_step_size(domain[1] - domain[0]);
    NumericFieldDomain {
        domain,
        step,
        histogram: histogram_from_domain(domain, values, config.histogram_bins),
        enlarged_histogram: histogram_from_domain(domain, values, config.enlarged_histogram_bins),
    }
}

/// Ordering used for categorical domains: text order of the displayed value
pub(crate) fn compare_members(a: &Value, b: &Value) -> Ordering {
    a.to_string().cmp(&b.to_string())
}

/// Filter properties of a field computed from the container.
///
/// Numbers get a range domain with histograms, timestamps a time range
/// domain with mapped values, strings the sorted distinct non-null members,
/// and booleans `[true, false]`. A numeric field carrying upstream
/// statistics gets the range of those statistics, widened by the loaded
/// rows.
pub fn get_field_domain(
    container: &dyn DataContainer,
    field: &Field,
    config: &FilterConfig,
) -> FilterProps {
    let mut props = FilterProps {
        domain: Domain::Set(Vec::new()),
        step: None,
        mapped_value: None,
        default_time_format: None,
        histogram: Vec::new(),
        enlarged_histogram: Vec::new(),
        filter_type: field.field_type.default_filter_type(),
        field_type: field.field_type,
    };

    match field.field_type {
        FieldType::Integer | FieldType::Real => {
            let accessor = |row| {
                field
                    .resolve(container.value_at(row, field.field_idx))
                    .as_f64()
                    .unwrap_or(f64::NAN)
            };
            let numeric = match field.domain.as_ref().and_then(FieldDomain::extent) {
                Some(extent) => {
                    let values: Vec<f64> = (0..container.num_rows()).map(accessor).collect();
                    let domain = match linear_domain(&values) {
                        Some([lo, hi]) => [lo.min(extent[0]), hi.max(extent[1])],
                        None => extent,
                    };
                    numeric_domain_over(domain, &values, config)
                }
                None => get_numeric_field_domain(container, accessor, config),
            };
            props.domain = Domain::Range(numeric.domain[0], numeric.domain[1]);
            props.step = Some(numeric.step);
            props.histogram = numeric.histogram;
            props.enlarged_histogram = numeric.enlarged_histogram;
        }
        FieldType::Timestamp => {
            let time = get_timestamp_field_domain(
                container,
                timestamp_accessor(container, field),
                config,
            );
            props.domain = Domain::Range(time.domain[0], time.domain[1]);
            props.step = Some(time.step);
            props.mapped_value = Some(time.mapped_value);
            props.default_time_format = Some(time.default_time_format);
        }
        FieldType::String => {
            let mut members: Vec<Value> = Vec::new();
            for row in 0..container.num_rows() {
                let value = field.resolve(container.value_at(row, field.field_idx));
                if !value.is_null() && !members.contains(&value) {
                    members.push(value);
                }
            }
            members.sort_by(compare_members);
            props.domain = Domain::Set(members);
        }
        FieldType::Boolean => {
            props.domain = Domain::Set(vec![Value::Bool(true), Value::Bool(false)]);
        }
    }

    props
}

/// Position of `source` within `destination`, as percentages
pub fn scale_source_domain_to_destination(source: [f64; 2], destination: [f64; 2]) -> [f64; 2] {
    let size = destination[1] - destination[0];
    [
        (source[0] - destination[0]) / size * 100.0,
        (source[1] - destination[0]) / size * 100.0,
    ]
}
