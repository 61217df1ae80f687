//! Numeric and time histograms

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use dv_core::{Bin, Filter, FilterConfig, TimeBins, TimeInterval};
use dv_data::{timestamp_accessor, DataContainer, Dataset};
use indexmap::IndexMap;
use tracing::debug;

/// 1970-01-04, the first Sunday after the epoch, in ms
const FIRST_SUNDAY_MS: f64 = 3.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Equal width histogram of `values` over `domain`.
///
/// Always returns `bins` bins; the last bin is closed on the right. Values
/// outside the domain or not finite are skipped.
pub fn histogram_from_domain(domain: [f64; 2], values: &[f64], bins: usize) -> Vec<Bin> {
    if bins == 0 {
        return Vec::new();
    }
    let [lo, hi] = domain;
    let width = (hi - lo) / bins as f64;

    let mut histogram: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            count: 0,
            indexes: Vec::new(),
            x0: lo + i as f64 * width,
            x1: if i == bins - 1 { hi } else { lo + (i + 1) as f64 * width },
        })
        .collect();

    for (index, &v) in values.iter().enumerate() {
        if !v.is_finite() || v < lo || v > hi {
            continue;
        }
        let i = if width > 0.0 {
            (((v - lo) / width).floor() as usize).min(bins - 1)
        } else {
            0
        };
        histogram[i].count += 1;
        histogram[i].indexes.push(index);
    }
    histogram
}

fn date_ms(date: NaiveDate) -> f64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis() as f64
}

/// UTC bounds `[x0, x1)` of the interval containing `ts`
fn interval_bounds(ts: f64, interval: TimeInterval) -> Option<(f64, f64)> {
    match interval {
        TimeInterval::OneMonth | TimeInterval::OneYear => {
            let dt = Utc.timestamp_millis_opt(ts.floor() as i64).single()?;
            let (start, end) = if interval == TimeInterval::OneYear {
                (
                    NaiveDate::from_ymd_opt(dt.year(), 1, 1)?,
                    NaiveDate::from_ymd_opt(dt.year() + 1, 1, 1)?,
                )
            } else if dt.month() == 12 {
                (
                    NaiveDate::from_ymd_opt(dt.year(), 12, 1)?,
                    NaiveDate::from_ymd_opt(dt.year() + 1, 1, 1)?,
                )
            } else {
                (
                    NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1)?,
                    NaiveDate::from_ymd_opt(dt.year(), dt.month() + 1, 1)?,
                )
            };
            Some((date_ms(start), date_ms(end)))
        }
        _ => {
            let len = interval.nominal_ms();
            // weeks start on Sunday
            let offset = if interval == TimeInterval::OneWeek { FIRST_SUNDAY_MS } else { 0.0 };
            let x0 = ((ts - offset) / len).floor() * len + offset;
            Some((x0, x0 + len))
        }
    }
}

/// Group row timestamps into calendar intervals.
///
/// Only intervals holding at least one row are returned, in ascending
/// order. NaN entries are skipped.
pub fn bin_by_time(mapped_value: &[f64], interval: TimeInterval) -> Vec<Bin> {
    let mut bins: BTreeMap<i64, Bin> = BTreeMap::new();
    for (index, &ts) in mapped_value.iter().enumerate() {
        if !ts.is_finite() {
            continue;
        }
        let Some((x0, x1)) = interval_bounds(ts, interval) else {
            continue;
        };
        let bin = bins.entry(x0 as i64).or_insert_with(|| Bin {
            count: 0,
            indexes: Vec::new(),
            x0,
            x1,
        });
        bin.count += 1;
        bin.indexes.push(index);
    }
    bins.into_values().collect()
}

/// Finest interval that splits `span` ms into at most `max_bins` bins
pub fn pick_time_interval(span: f64, max_bins: usize) -> TimeInterval {
    TimeInterval::ALL
        .into_iter()
        .find(|interval| span / interval.nominal_ms() <= max_bins as f64)
        .unwrap_or(TimeInterval::OneYear)
}

/// Time histograms of a time filter for each of its datasets.
///
/// Uses the filter's plot interval, or picks one from the domain span.
/// Datasets the filter names but that are missing, or that lack the
/// filtered column, get no entry.
pub fn time_bins_for_filter(filter: &Filter, datasets: &[Dataset], config: &FilterConfig) -> TimeBins {
    let mut time_bins = TimeBins::new();
    let Some((lo, hi)) = filter.range_domain() else {
        return time_bins;
    };
    let interval = filter
        .plot_type
        .interval
        .unwrap_or_else(|| pick_time_interval(hi - lo, config.max_time_bins));

    for (pos, data_id) in filter.data_id.iter().enumerate() {
        let Some(dataset) = datasets.iter().find(|d| &d.id == data_id) else {
            debug!("No dataset {} for time filter {}", data_id, filter.id);
            continue;
        };
        let Some(field) = filter
            .field_idx
            .get(pos)
            .copied()
            .flatten()
            .and_then(|idx| dataset.fields.iter().find(|f| f.field_idx == idx))
        else {
            continue;
        };

        let mapped_value: Cow<[f64]> =
            match field.filter_props.as_ref().and_then(|p| p.mapped_value.as_deref()) {
                Some(values) => Cow::Borrowed(values),
                None => {
                    let container = dataset.data_container.as_ref();
                    Cow::Owned((0..container.num_rows()).map(timestamp_accessor(container, field)).collect())
                }
            };

        let mut per_interval = IndexMap::new();
        per_interval.insert(interval.id().to_string(), bin_by_time(&mapped_value, interval));
        time_bins.insert(data_id.clone(), per_interval);
    }
    time_bins
}
