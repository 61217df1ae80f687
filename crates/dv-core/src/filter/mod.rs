//! Filter specifications

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as Json;
use std::fmt;

use crate::{FieldType, FilterError};

mod interval;
mod record;
mod value;

pub use interval::TimeInterval;
pub use record::{FilterBucket, FilterRecord, FilterRecordOptions};
pub use value::{is_valid_filter_value, Domain, FilterValue, SelectValue, SELECT_UNSET_SENTINEL};

/// Kinds of filter supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    Range,
    Select,
    MultiSelect,
    TimeRange,
    Polygon,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterType::Range => "range",
            FilterType::Select => "select",
            FilterType::MultiSelect => "multiSelect",
            FilterType::TimeRange => "timeRange",
            FilterType::Polygon => "polygon",
        };
        f.write_str(name)
    }
}

/// How a time filter window moves during animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationWindow {
    #[default]
    Free,
    Incremental,
    Point,
    Interval,
}

/// Which end of the filter value drives the layer timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncTimelineMode {
    Start,
    #[default]
    End,
}

impl SyncTimelineMode {
    pub fn from_code(code: u8) -> Self {
        if code == 0 {
            SyncTimelineMode::Start
        } else {
            SyncTimelineMode::End
        }
    }

    pub fn code(self) -> u8 {
        match self {
            SyncTimelineMode::Start => 0,
            SyncTimelineMode::End => 1,
        }
    }
}

impl Serialize for SyncTimelineMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlotKind {
    #[default]
    Histogram,
    LineChart,
}

/// Chart drawn under the filter slider
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlotType {
    #[serde(rename = "type")]
    pub kind: PlotKind,
    pub interval: Option<TimeInterval>,
    pub default_time_format: Option<String>,
    pub aggregation: Option<String>,
}

/// One histogram bin with the rows that fall in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub count: usize,
    pub indexes: Vec<usize>,
    pub x0: f64,
    pub x1: f64,
}

/// Time histograms keyed by dataset id, then by interval id
pub type TimeBins = IndexMap<String, IndexMap<String, Vec<Bin>>>;

/// A user defined filter.
///
/// `data_id` and `field_idx` are parallel: `field_idx[i]` is the column the
/// filter reads in dataset `data_id[i]`, `None` when that dataset has no
/// such column. Spatial filters carry no field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "FilterSpec")]
pub struct Filter {
    pub id: String,
    pub data_id: Vec<String>,
    pub layer_id: Vec<String>,
    pub name: Vec<String>,
    #[serde(rename = "type")]
    pub filter_type: Option<FilterType>,
    pub field_idx: Vec<Option<usize>>,
    pub domain: Option<Domain>,
    pub value: Option<FilterValue>,
    pub step: Option<f64>,
    pub mapped_value: Option<Vec<f64>>,
    pub default_time_format: Option<String>,
    pub field_type: Option<FieldType>,
    pub histogram: Option<Vec<Bin>>,
    pub enlarged_histogram: Option<Vec<Bin>>,
    pub plot_type: PlotType,
    pub time_bins: Option<TimeBins>,
    pub fixed_domain: bool,
    pub enlarged: bool,
    pub is_animating: bool,
    pub animation_window: AnimationWindow,
    pub speed: f64,
    pub gpu: bool,
    pub gpu_channel: Vec<usize>,
    pub synced_with_layer_timeline: bool,
    pub sync_timeline_mode: SyncTimelineMode,
}

/// Random short filter id
pub fn generate_filter_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            id: generate_filter_id(),
            data_id: Vec::new(),
            layer_id: Vec::new(),
            name: Vec::new(),
            filter_type: None,
            field_idx: Vec::new(),
            domain: None,
            value: None,
            step: None,
            mapped_value: None,
            default_time_format: None,
            field_type: None,
            histogram: None,
            enlarged_histogram: None,
            plot_type: PlotType::default(),
            time_bins: None,
            fixed_domain: false,
            enlarged: false,
            is_animating: false,
            animation_window: AnimationWindow::default(),
            speed: 1.0,
            gpu: false,
            gpu_channel: Vec::new(),
            synced_with_layer_timeline: false,
            sync_timeline_mode: SyncTimelineMode::default(),
        }
    }
}

impl Filter {
    /// Whether the current value has the shape the filter type needs
    pub fn has_valid_value(&self) -> bool {
        match (self.filter_type, &self.value) {
            (Some(filter_type), Some(value)) => value.is_valid_for(filter_type),
            _ => false,
        }
    }

    pub fn range_domain(&self) -> Option<(f64, f64)> {
        self.domain.as_ref().and_then(Domain::as_range)
    }
}

/// A single string or a list of strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Permissive wire form of a filter.
///
/// Everything is optional; `domain` and `value` stay raw until the filter
/// type is known.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub filter_type: Option<FilterType>,
    pub data_id: Option<OneOrMany>,
    pub layer_id: Option<Vec<String>>,
    pub name: Option<OneOrMany>,
    /// Negative entries mean the dataset has no such column
    pub field_idx: Option<Vec<Option<i64>>>,
    pub domain: Json,
    pub value: Json,
    pub step: Option<f64>,
    pub mapped_value: Option<Vec<Option<f64>>>,
    pub default_time_format: Option<String>,
    pub field_type: Option<FieldType>,
    pub histogram: Option<Vec<Bin>>,
    pub enlarged_histogram: Option<Vec<Bin>>,
    pub plot_type: Option<PlotType>,
    pub time_bins: Option<TimeBins>,
    pub fixed_domain: Option<bool>,
    pub enlarged: Option<bool>,
    pub is_animating: Option<bool>,
    pub animation_window: Option<AnimationWindow>,
    pub speed: Option<f64>,
    pub gpu: Option<bool>,
    pub gpu_channel: Option<Vec<usize>>,
    pub synced_with_layer_timeline: Option<bool>,
    pub sync_timeline_mode: Option<u8>,
}

impl TryFrom<FilterSpec> for Filter {
    type Error = FilterError;

    fn try_from(spec: FilterSpec) -> Result<Self, Self::Error> {
        let typed = |json: &Json, what: &str| -> Result<Option<FilterType>, FilterError> {
            match (spec.filter_type, json.is_null()) {
                (_, true) => Ok(None),
                (Some(t), false) => Ok(Some(t)),
                (None, false) => Err(FilterError::InvalidSpec(format!("{what} without a filter type"))),
            }
        };

        let domain = match typed(&spec.domain, "domain")? {
            Some(t) => Some(Domain::from_json(t, &spec.domain).ok_or_else(|| {
                FilterError::InvalidSpec(format!("domain does not fit a {t} filter"))
            })?),
            None => None,
        };
        let value = match typed(&spec.value, "value")? {
            Some(t) => Some(FilterValue::from_json(t, &spec.value).ok_or(
                FilterError::InvalidValue {
                    filter_type: t.to_string(),
                },
            )?),
            None => None,
        };

        let defaults = Filter::default();
        Ok(Filter {
            id: spec.id.unwrap_or(defaults.id),
            data_id: spec.data_id.map(OneOrMany::into_vec).unwrap_or_default(),
            layer_id: spec.layer_id.unwrap_or_default(),
            name: spec.name.map(OneOrMany::into_vec).unwrap_or_default(),
            filter_type: spec.filter_type,
            field_idx: spec
                .field_idx
                .unwrap_or_default()
                .into_iter()
                .map(|idx| idx.and_then(|i| usize::try_from(i).ok()))
                .collect(),
            domain,
            value,
            step: spec.step,
            mapped_value: spec
                .mapped_value
                .map(|values| values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()),
            default_time_format: spec.default_time_format,
            field_type: spec.field_type,
            histogram: spec.histogram,
            enlarged_histogram: spec.enlarged_histogram,
            plot_type: spec.plot_type.unwrap_or_default(),
            time_bins: spec.time_bins,
            fixed_domain: spec.fixed_domain.unwrap_or(defaults.fixed_domain),
            enlarged: spec.enlarged.unwrap_or(defaults.enlarged),
            is_animating: spec.is_animating.unwrap_or(defaults.is_animating),
            animation_window: spec.animation_window.unwrap_or(defaults.animation_window),
            speed: spec.speed.unwrap_or(defaults.speed),
            gpu: spec.gpu.unwrap_or(defaults.gpu),
            gpu_channel: spec.gpu_channel.unwrap_or_default(),
            synced_with_layer_timeline: spec
                .synced_with_layer_timeline
                .unwrap_or(defaults.synced_with_layer_timeline),
            sync_timeline_mode: spec
                .sync_timeline_mode
                .map(SyncTimelineMode::from_code)
                .unwrap_or(defaults.sync_timeline_mode),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_from_wire_form() {
        let filter: Filter = serde_json::from_value(json!({
            "id": "daqu9ulv",
            "dataId": "fe42",
            "name": ["DateTime"],
            "type": "timeRange",
            "fieldIdx": [0, -1],
            "domain": [1564176748230.0, 1564184336370.0],
            "value": [1564176936089.6848, 1564178316089.6846],
            "plotType": {"interval": "1-minute", "type": "histogram", "aggregation": "sum"},
            "yAxis": null,
            "gpu": true,
            "syncTimelineMode": 0
        }))
        .unwrap();

        assert_eq!(filter.data_id, vec!["fe42".to_string()]);
        assert_eq!(filter.field_idx, vec![Some(0), None]);
        assert_eq!(filter.filter_type, Some(FilterType::TimeRange));
        assert_eq!(filter.domain, Some(Domain::Range(1564176748230.0, 1564184336370.0)));
        assert_eq!(filter.plot_type.interval, Some(TimeInterval::OneMinute));
        assert_eq!(filter.sync_timeline_mode, SyncTimelineMode::Start);
        assert!(filter.gpu);
        assert!(filter.has_valid_value());
    }

    #[test]
    fn test_value_must_fit_type() {
        let result: Result<Filter, _> =
            serde_json::from_value(json!({"type": "range", "value": "a"}));
        assert!(result.is_err());
        let result: Result<Filter, _> = serde_json::from_value(json!({"value": [0, 1]}));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialized_shape_is_camel_case() {
        let filter = Filter {
            id: "f1".to_string(),
            filter_type: Some(FilterType::MultiSelect),
            value: Some(FilterValue::MultiSelect(vec!["a".into()])),
            ..Default::default()
        };
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["type"], json!("multiSelect"));
        assert_eq!(json["value"], json!(["a"]));
        assert_eq!(json["animationWindow"], json!("free"));
        assert_eq!(json["syncTimelineMode"], json!(1));
    }

    #[test]
    fn test_default_filter_ids_are_short_and_distinct() {
        let a = Filter::default();
        let b = Filter::default();
        assert_eq!(a.id.len(), 8);
        assert_ne!(a.id, b.id);
    }
}
