//! Filter evaluation and domain reconciliation
//!
//! Given datasets, layers and user filters this crate computes field
//! domains and histograms, validates and adjusts saved filters, builds
//! per-row predicates, diffs filter records and keeps a time filter in
//! step with the layer animation timeline.

pub mod adjust;
pub mod diff;
pub mod domain;
pub mod geometry;
pub mod predicate;
pub mod timeline;
pub mod validate;

// Re-exports
pub use adjust::adjust_value_to_filter_domain;
pub use diff::{diff_filters, FilterChange, FilterDiff};
pub use domain::{
    get_field_domain, get_numeric_field_domain, get_numeric_step_size,
    get_timestamp_field_domain, scale_source_domain_to_destination, NumericFieldDomain,
    TimestampFieldDomain,
};
pub use domain::histogram::{bin_by_time, histogram_from_domain, time_bins_for_filter};
pub use geometry::is_in_polygon;
pub use predicate::{filtered_indices, generate_polygon_filter, get_filter_function, FilterPredicate};
pub use timeline::{merge_filter_with_timeline, MergedTimeline};
pub use validate::{
    apply_filter_field_name, get_dataset_field_index_for_filter, get_default_filter,
    is_valid_filter_value, validate_filter, validate_filter_with_data, validate_polygon_filter,
    ValidationResult,
};
