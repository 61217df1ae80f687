//! Animation state

use serde::{Deserialize, Serialize};

/// Playback state of the layer timeline.
///
/// Kept separately from any filter; the active time filter is reconciled
/// with it by the timeline merger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationConfig {
    /// Timeline extent in ms since epoch
    pub domain: Option<[f64; 2]>,
    pub current_time: Option<f64>,
    pub speed: f64,
    pub is_animating: bool,
    /// Discrete timestamps for layers that animate in fixed steps
    pub time_steps: Option<Vec<f64>>,
    pub time_format: Option<String>,
    pub timezone: Option<String>,
    pub default_time_format: Option<String>,
    pub duration: Option<f64>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            domain: None,
            current_time: None,
            speed: 1.0,
            is_animating: false,
            time_steps: None,
            time_format: None,
            timezone: None,
            default_time_format: None,
            duration: None,
        }
    }
}
