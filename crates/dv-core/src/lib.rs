//! Core data model for the filter engine
//!
//! This crate provides the plain data types shared by the data and filter
//! crates: cell values, field descriptors, layers, filters and their typed
//! domains/values, filter records, animation state and configuration.

pub mod config;
pub mod error;
pub mod field;
pub mod filter;
pub mod geometry;
pub mod layer;
pub mod state;
pub mod value;

// Re-export commonly used types
pub use config::{FilterConfig, StepBreakpoint};
pub use error::FilterError;
pub use field::{Field, FieldDomain, FieldType, FilterProps, IndexBy};
pub use filter::{
    is_valid_filter_value, AnimationWindow, Bin, Domain, Filter, FilterBucket, FilterRecord,
    FilterRecordOptions, FilterSpec, FilterType, FilterValue, PlotKind, PlotType, SelectValue,
    SyncTimelineMode, TimeBins, TimeInterval, SELECT_UNSET_SENTINEL,
};
pub use geometry::{GeometryKind, PolygonFeature};
pub use layer::{Layer, LayerColumns, LayerConfig};
pub use state::AnimationConfig;
pub use value::Value;
