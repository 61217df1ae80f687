use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::filter::{Bin, Domain, FilterType};
use crate::Value;

/// Semantic type of a dataset column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Real,
    Timestamp,
    String,
    Boolean,
}

impl FieldType {
    /// Filter type created by default for a field of this type
    pub fn default_filter_type(self) -> FilterType {
        match self {
            FieldType::Integer | FieldType::Real => FilterType::Range,
            FieldType::Timestamp => FilterType::TimeRange,
            FieldType::String => FilterType::MultiSelect,
            FieldType::Boolean => FilterType::Select,
        }
    }
}

/// Index lookup for columns whose cells hold keys rather than values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexBy {
    pub format: String,
    pub mapped_value: IndexMap<String, Value>,
}

/// Domain metadata attached to a field by upstream statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldDomain {
    ZoomStops { stops: Vec<f64>, z: Vec<f64> },
    Quantiles { quantiles: Vec<f64>, z: Vec<f64> },
}

impl FieldDomain {
    /// `[min, max]` of the finite stops or quantiles
    pub fn extent(&self) -> Option<[f64; 2]> {
        let values = match self {
            FieldDomain::ZoomStops { stops, .. } => stops,
            FieldDomain::Quantiles { quantiles, .. } => quantiles,
        };
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some([v, v]),
                Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
            })
    }
}

/// Domain calculation cached on a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterProps {
    pub domain: Domain,
    pub step: Option<f64>,
    pub mapped_value: Option<Vec<f64>>,
    pub default_time_format: Option<String>,
    /// Numeric histograms; empty for non-numeric fields
    pub histogram: Vec<Bin>,
    pub enlarged_histogram: Vec<Bin>,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    pub field_type: FieldType,
}

/// Column descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub field_idx: usize,
    /// Parse format for timestamp strings (chrono syntax)
    pub format: Option<String>,
    pub index_by: Option<IndexBy>,
    /// Statistics computed upstream, e.g. for tiled data
    pub domain: Option<FieldDomain>,
    #[serde(default, skip_deserializing)]
    pub filter_props: Option<FilterProps>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType, field_idx: usize) -> Self {
        Self {
            name: name.into(),
            field_type,
            field_idx,
            format: None,
            index_by: None,
            domain: None,
            filter_props: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_domain(mut self, domain: FieldDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_index(mut self, index_by: IndexBy) -> Self {
        self.index_by = Some(index_by);
        self
    }

    pub fn is_indexed(&self) -> bool {
        self.index_by.is_some()
    }

    /// Resolve a raw cell through the field index, if any
    pub fn resolve(&self, raw: Value) -> Value {
        match &self.index_by {
            Some(index) => index
                .mapped_value
                .get(&raw.to_string())
                .cloned()
                .unwrap_or(Value::Null),
            None => raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_field_resolves_keys() {
        let mut mapped_value = IndexMap::new();
        mapped_value.insert("7".to_string(), Value::from("seven"));
        let field = Field::new("id", FieldType::String, 0).with_index(IndexBy {
            format: "key".to_string(),
            mapped_value,
        });

        assert!(field.is_indexed());
        assert_eq!(field.resolve(Value::Number(7.0)), Value::from("seven"));
        assert_eq!(field.resolve(Value::Number(8.0)), Value::Null);
        let plain = Field::new("n", FieldType::Real, 1);
        assert_eq!(plain.resolve(Value::Number(8.0)), Value::Number(8.0));
    }

    #[test]
    fn test_field_domain_variants_deserialize() {
        let stops: FieldDomain = serde_json::from_str(r#"{"stops":[1,2],"z":[3,4]}"#).unwrap();
        assert!(matches!(stops, FieldDomain::ZoomStops { .. }));
        let quantiles: FieldDomain =
            serde_json::from_str(r#"{"quantiles":[1,2],"z":[3,4]}"#).unwrap();
        assert!(matches!(quantiles, FieldDomain::Quantiles { .. }));
        assert_eq!(stops.extent(), Some([1.0, 2.0]));
    }

    #[test]
    fn test_field_from_wire_form() {
        let field: Field = serde_json::from_str(
            r#"{"name":"score","type":"real","fieldIdx":2,"domain":{"quantiles":[4,1,9],"z":[0,1,2]}}"#,
        )
        .unwrap();
        assert_eq!(field.field_idx, 2);
        assert_eq!(field.domain.as_ref().and_then(FieldDomain::extent), Some([1.0, 9.0]));
        assert!(field.filter_props.is_none());
    }
}
