//! Typed filter domains and values

use serde::{Serialize, Serializer};
use serde_json::Value as Json;

use super::FilterType;
use crate::{PolygonFeature, Value};

/// External representation of an unset select value.
///
/// A select filter without a usable value reports the boolean `true`, which
/// is indistinguishable from a boolean field's `true` member once
/// serialized.
pub const SELECT_UNSET_SENTINEL: bool = true;

/// Values a filter can range over
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Domain {
    /// `[min, max]` of a numeric or time field
    Range(f64, f64),
    /// Enumerated members of a categorical field
    Set(Vec<Value>),
}

impl Domain {
    pub fn from_json(filter_type: FilterType, json: &Json) -> Option<Self> {
        let items = json.as_array()?;
        match filter_type {
            FilterType::Range | FilterType::TimeRange => match items.as_slice() {
                [lo, hi] => Some(Domain::Range(lo.as_f64()?, hi.as_f64()?)),
                _ => None,
            },
            FilterType::Select | FilterType::MultiSelect => {
                Some(Domain::Set(items.iter().filter_map(Value::from_json).collect()))
            }
            FilterType::Polygon => None,
        }
    }

    pub fn as_range(&self) -> Option<(f64, f64)> {
        match self {
            Domain::Range(lo, hi) => Some((*lo, *hi)),
            Domain::Set(_) => None,
        }
    }

    pub fn as_set(&self) -> Option<&[Value]> {
        match self {
            Domain::Set(values) => Some(values),
            Domain::Range(..) => None,
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Domain::Range(lo, hi) => value.as_f64().is_some_and(|v| v >= *lo && v <= *hi),
            Domain::Set(values) => values.contains(value),
        }
    }
}

/// Current value of a select filter
#[derive(Debug, Clone, PartialEq)]
pub enum SelectValue {
    Unset,
    Value(Value),
}

impl SelectValue {
    /// The value a row is compared against
    pub fn as_value(&self) -> Value {
        match self {
            SelectValue::Unset => Value::Bool(SELECT_UNSET_SENTINEL),
            SelectValue::Value(v) => v.clone(),
        }
    }
}

impl Serialize for SelectValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SelectValue::Unset => serializer.serialize_bool(SELECT_UNSET_SENTINEL),
            SelectValue::Value(v) => v.serialize(serializer),
        }
    }
}

/// Current value of a filter, shaped by its type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Range([f64; 2]),
    Select(SelectValue),
    MultiSelect(Vec<Value>),
    Polygon(PolygonFeature),
}

impl FilterValue {
    /// Convert a raw JSON value for the given filter type
    pub fn from_json(filter_type: FilterType, json: &Json) -> Option<Self> {
        match filter_type {
            FilterType::Range | FilterType::TimeRange => match json.as_array()?.as_slice() {
                [lo, hi] => Some(FilterValue::Range([lo.as_f64()?, hi.as_f64()?])),
                _ => None,
            },
            FilterType::Select => match Value::from_json(json)? {
                Value::Null => None,
                v => Some(FilterValue::Select(SelectValue::Value(v))),
            },
            FilterType::MultiSelect => Some(FilterValue::MultiSelect(
                json.as_array()?.iter().filter_map(Value::from_json).collect(),
            )),
            FilterType::Polygon => PolygonFeature::from_json(json).ok().map(FilterValue::Polygon),
        }
    }

    /// Whether this value is usable by a filter of `filter_type`
    pub fn is_valid_for(&self, filter_type: FilterType) -> bool {
        match (filter_type, self) {
            (FilterType::Range | FilterType::TimeRange, FilterValue::Range(_)) => true,
            (FilterType::Select, FilterValue::Select(_)) => true,
            (FilterType::MultiSelect, FilterValue::MultiSelect(values)) => !values.is_empty(),
            (FilterType::Polygon, FilterValue::Polygon(_)) => true,
            _ => false,
        }
    }

    pub fn as_range(&self) -> Option<[f64; 2]> {
        match self {
            FilterValue::Range(range) => Some(*range),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Json {
        serde_json::to_value(self).unwrap_or(Json::Null)
    }
}

/// Check a raw filter value against the shape its type requires
pub fn is_valid_filter_value(filter_type: Option<FilterType>, value: &Json) -> bool {
    let Some(filter_type) = filter_type else {
        return false;
    };
    match filter_type {
        FilterType::Select => matches!(value, Json::Bool(_) | Json::String(_) | Json::Number(_)),
        FilterType::Range | FilterType::TimeRange => value
            .as_array()
            .is_some_and(|items| items.iter().all(Json::is_number)),
        FilterType::MultiSelect => value.as_array().is_some_and(|items| !items.is_empty()),
        FilterType::Polygon => PolygonFeature::from_json(value).is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_valid_filter_value() {
        assert!(!is_valid_filter_value(None, &json!(true)));
        assert!(is_valid_filter_value(Some(FilterType::Select), &json!(true)));
        assert!(is_valid_filter_value(Some(FilterType::Select), &json!(false)));
        assert!(!is_valid_filter_value(Some(FilterType::TimeRange), &json!(false)));
        assert!(is_valid_filter_value(Some(FilterType::TimeRange), &json!([])));
        assert!(is_valid_filter_value(Some(FilterType::TimeRange), &json!([1])));
        assert!(!is_valid_filter_value(Some(FilterType::MultiSelect), &json!(true)));
        assert!(!is_valid_filter_value(Some(FilterType::MultiSelect), &json!([])));
        assert!(is_valid_filter_value(Some(FilterType::MultiSelect), &json!([1])));
    }

    #[test]
    fn test_unset_select_serializes_as_sentinel() {
        let value = FilterValue::Select(SelectValue::Unset);
        assert_eq!(value.to_json(), json!(true));
        assert_eq!(SelectValue::Unset.as_value(), Value::Bool(true));
    }

    #[test]
    fn test_domain_from_json() {
        assert_eq!(
            Domain::from_json(FilterType::Range, &json!([0, 1])),
            Some(Domain::Range(0.0, 1.0))
        );
        assert_eq!(Domain::from_json(FilterType::Range, &json!([0])), None);
        assert_eq!(
            Domain::from_json(FilterType::MultiSelect, &json!(["a", "b"])),
            Some(Domain::Set(vec![Value::from("a"), Value::from("b")]))
        );
        assert_eq!(serde_json::to_value(Domain::Range(0.0, 1.0)).unwrap(), json!([0.0, 1.0]));
    }
}
