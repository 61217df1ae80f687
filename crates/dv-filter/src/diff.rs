//! Change detection between two filter records

use ahash::{AHashMap, AHashSet};
use dv_core::{Filter, FilterBucket, FilterRecord};
use indexmap::IndexMap;
use serde::Serialize;

/// How a filter changed between two records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterChange {
    Added,
    Deleted,
    NameChanged,
    ValueChanged,
    DataIdChanged,
}

/// Changes by filter id, `None` when a bucket is unchanged
pub type BucketDiff = Option<IndexMap<String, FilterChange>>;

/// Per bucket changes of a filter record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDiff {
    pub dynamic_domain: BucketDiff,
    pub fixed_domain: BucketDiff,
    pub cpu: BucketDiff,
    pub gpu: BucketDiff,
}

impl FilterDiff {
    pub fn get(&self, bucket: FilterBucket) -> Option<&IndexMap<String, FilterChange>> {
        match bucket {
            FilterBucket::DynamicDomain => self.dynamic_domain.as_ref(),
            FilterBucket::FixedDomain => self.fixed_domain.as_ref(),
            FilterBucket::Cpu => self.cpu.as_ref(),
            FilterBucket::Gpu => self.gpu.as_ref(),
        }
    }

    fn slot(&mut self, bucket: FilterBucket) -> &mut BucketDiff {
        match bucket {
            FilterBucket::DynamicDomain => &mut self.dynamic_domain,
            FilterBucket::FixedDomain => &mut self.fixed_domain,
            FilterBucket::Cpu => &mut self.cpu,
            FilterBucket::Gpu => &mut self.gpu,
        }
    }

    /// Whether no bucket changed
    pub fn is_empty(&self) -> bool {
        FilterBucket::ALL.iter().all(|bucket| self.get(*bucket).is_none())
    }
}

fn diff_bucket(filters: &[Filter], old: &[Filter]) -> BucketDiff {
    let old_by_id: AHashMap<&str, &Filter> = old.iter().map(|f| (f.id.as_str(), f)).collect();
    let current: AHashSet<&str> = filters.iter().map(|f| f.id.as_str()).collect();

    let mut changes = IndexMap::new();
    for filter in filters {
        // one change per filter: name, then value, then dataId
        let change = match old_by_id.get(filter.id.as_str()) {
            None => Some(FilterChange::Added),
            Some(prior) if prior.name != filter.name => Some(FilterChange::NameChanged),
            Some(prior) if prior.value != filter.value => Some(FilterChange::ValueChanged),
            Some(prior) if prior.data_id != filter.data_id => Some(FilterChange::DataIdChanged),
            Some(_) => None,
        };
        if let Some(change) = change {
            changes.insert(filter.id.clone(), change);
        }
    }
    for prior in old {
        if !current.contains(prior.id.as_str()) {
            changes.insert(prior.id.clone(), FilterChange::Deleted);
        }
    }

    (!changes.is_empty()).then_some(changes)
}

/// Compare `record` with the previous record, bucket by bucket.
///
/// A missing previous record counts as empty, so every filter is added.
pub fn diff_filters(record: &FilterRecord, old: Option<&FilterRecord>) -> FilterDiff {
    let mut diff = FilterDiff::default();
    for bucket in FilterBucket::ALL {
        let prior = old.map(|o| o.get(bucket)).unwrap_or(&[]);
        *diff.slot(bucket) = diff_bucket(record.get(bucket), prior);
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use dv_core::{FilterType, FilterValue, SelectValue};
    use serde_json::json;

    fn filter(id: &str, name: &str, value: &str) -> Filter {
        Filter {
            id: id.to_string(),
            name: vec![name.to_string()],
            filter_type: Some(FilterType::Select),
            value: Some(FilterValue::Select(SelectValue::Value(value.into()))),
            ..Default::default()
        }
    }

    #[test]
    fn test_diff_filters() {
        let record = FilterRecord {
            dynamic_domain: vec![filter("aa", "hello", "bb")],
            fixed_domain: vec![filter("bb", "ab", "ab")],
            cpu: vec![filter("dd", "hey", "ee"), filter("ee", "ee", "ff")],
            gpu: vec![],
        };
        let old = FilterRecord {
            dynamic_domain: vec![filter("aa", "hello", "bb")],
            fixed_domain: vec![filter("bb", "cd", "ab"), filter("cc", "world", "dd")],
            cpu: vec![filter("ee", "ee", "gg")],
            gpu: vec![],
        };

        let diff = diff_filters(&record, Some(&old));

        let mut fixed = IndexMap::new();
        fixed.insert("bb".to_string(), FilterChange::NameChanged);
        fixed.insert("cc".to_string(), FilterChange::Deleted);
        let mut cpu = IndexMap::new();
        cpu.insert("dd".to_string(), FilterChange::Added);
        cpu.insert("ee".to_string(), FilterChange::ValueChanged);
        assert_eq!(
            diff,
            FilterDiff {
                dynamic_domain: None,
                fixed_domain: Some(fixed),
                cpu: Some(cpu),
                gpu: None,
            }
        );
        assert_eq!(
            serde_json::to_value(&diff).unwrap(),
            json!({
                "dynamicDomain": null,
                "fixedDomain": {"bb": "name_changed", "cc": "deleted"},
                "cpu": {"dd": "added", "ee": "value_changed"},
                "gpu": null
            })
        );
    }

    #[test]
    fn test_diff_against_nothing_adds_everything() {
        let record = FilterRecord {
            cpu: vec![filter("aa", "n", "v")],
            ..Default::default()
        };
        let diff = diff_filters(&record, None);
        assert_eq!(diff.get(FilterBucket::Cpu).unwrap()["aa"], FilterChange::Added);
        assert!(diff.get(FilterBucket::Gpu).is_none());
    }

    #[test]
    fn test_self_diff_is_empty() {
        let record = FilterRecord {
            dynamic_domain: vec![filter("aa", "n", "v")],
            cpu: vec![filter("aa", "n", "v")],
            ..Default::default()
        };
        assert!(diff_filters(&record, Some(&record)).is_empty());
    }

    #[test]
    fn test_data_id_change() {
        let mut moved = filter("aa", "n", "v");
        moved.data_id = vec!["other".to_string()];
        let record = FilterRecord {
            gpu: vec![moved],
            ..Default::default()
        };
        let old = FilterRecord {
            gpu: vec![filter("aa", "n", "v")],
            ..Default::default()
        };
        let diff = diff_filters(&record, Some(&old));
        assert_eq!(diff.gpu.unwrap()["aa"], FilterChange::DataIdChanged);
    }
}
