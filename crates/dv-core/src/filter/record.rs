use serde::Serialize;

use super::Filter;

/// The four buckets of a filter record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterBucket {
    DynamicDomain,
    FixedDomain,
    Cpu,
    Gpu,
}

impl FilterBucket {
    pub const ALL: [FilterBucket; 4] = [
        FilterBucket::DynamicDomain,
        FilterBucket::FixedDomain,
        FilterBucket::Cpu,
        FilterBucket::Gpu,
    ];
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FilterRecordOptions {
    /// Send every filter to the cpu bucket
    pub cpu_only: bool,
    /// Treat every filter as fixed domain
    pub ignore_domain: bool,
}

/// Active filters of one dataset, grouped by domain class and by
/// evaluation class. Every filter appears in exactly one bucket of each axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRecord {
    pub dynamic_domain: Vec<Filter>,
    pub fixed_domain: Vec<Filter>,
    pub cpu: Vec<Filter>,
    pub gpu: Vec<Filter>,
}

impl FilterRecord {
    /// Group the valid filters that apply to `data_id`
    pub fn for_dataset(data_id: &str, filters: &[Filter], options: FilterRecordOptions) -> Self {
        let mut record = FilterRecord::default();
        for filter in filters {
            if !filter.has_valid_value() || !filter.data_id.iter().any(|d| d == data_id) {
                continue;
            }
            if filter.fixed_domain || options.ignore_domain {
                record.fixed_domain.push(filter.clone());
            } else {
                record.dynamic_domain.push(filter.clone());
            }
            if filter.gpu && !options.cpu_only {
                record.gpu.push(filter.clone());
            } else {
                record.cpu.push(filter.clone());
            }
        }
        record
    }

    pub fn get(&self, bucket: FilterBucket) -> &[Filter] {
        match bucket {
            FilterBucket::DynamicDomain => &self.dynamic_domain,
            FilterBucket::FixedDomain => &self.fixed_domain,
            FilterBucket::Cpu => &self.cpu,
            FilterBucket::Gpu => &self.gpu,
        }
    }
}
