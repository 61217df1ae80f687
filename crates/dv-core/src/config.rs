//! Engine configuration defaults

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::FilterError;

/// One slider-granularity breakpoint: spans below `max_span` use `step`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepBreakpoint {
    pub max_span: f64,
    pub step: f64,
}

/// Defaults used by domain calculation and histogram binning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    /// Time format reported with every timestamp domain
    pub default_time_format: String,

    /// Timestamp step breakpoints, checked in order
    pub timestamp_steps: Vec<StepBreakpoint>,

    /// Step used when the span exceeds every breakpoint
    pub fallback_timestamp_step: f64,

    /// Padding added to a timestamp domain whose bounds are equal (ms)
    pub equal_timestamp_padding_ms: f64,

    /// Bin count of the default numeric histogram
    pub histogram_bins: usize,

    /// Bin count of the enlarged numeric histogram
    pub enlarged_histogram_bins: usize,

    /// Upper bound on time bins when picking an interval automatically
    pub max_time_bins: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_time_format: "L LTS".to_string(),
            timestamp_steps: vec![
                StepBreakpoint { max_span: 1.0, step: 0.05 },
                StepBreakpoint { max_span: 10.0, step: 0.1 },
                StepBreakpoint { max_span: 100.0, step: 1.0 },
                StepBreakpoint { max_span: 1000.0, step: 5.0 },
            ],
            fallback_timestamp_step: 1000.0,
            equal_timestamp_padding_ms: 1000.0,
            histogram_bins: 30,
            enlarged_histogram_bins: 100,
            max_time_bins: 100,
        }
    }
}

impl FilterConfig {
    /// Parse a configuration from JSON; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, FilterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading filter config {}", path.display()))?;
        let config = Self::from_json_str(&text)
            .with_context(|| format!("parsing filter config {}", path.display()))?;
        tracing::debug!("Loaded filter config from {}", path.display());
        Ok(config)
    }

    /// Step for a timestamp domain of the given span
    pub fn timestamp_step(&self, span: f64) -> f64 {
        self.timestamp_steps
            .iter()
            .find(|b| span < b.max_span)
            .map(|b| b.step)
            .unwrap_or(self.fallback_timestamp_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_step_breakpoints() {
        let config = FilterConfig::default();
        assert_eq!(config.timestamp_step(0.0), 0.05);
        assert_eq!(config.timestamp_step(1.0), 0.1);
        assert_eq!(config.timestamp_step(20.0), 1.0);
        assert_eq!(config.timestamp_step(200.0), 5.0);
        assert_eq!(config.timestamp_step(6000.0), 1000.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = FilterConfig::from_json_str(r#"{"defaultTimeFormat": "LLL"}"#).unwrap();
        assert_eq!(config.default_time_format, "LLL");
        assert_eq!(config.histogram_bins, 30);
        assert!(FilterConfig::from_json_str("not json").is_err());
    }
}
