//! Reconcile a time filter with the layer animation timeline

use dv_core::{AnimationConfig, Domain, Filter, FilterType, SyncTimelineMode};
use tracing::debug;

/// Filter and animation config after reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTimeline {
    pub filter: Filter,
    pub animation_config: AnimationConfig,
}

/// Smallest positive gap between sorted time steps
fn min_step(time_steps: &[f64]) -> Option<f64> {
    time_steps
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > 0.0)
        .fold(None, |acc: Option<f64>, gap| Some(acc.map_or(gap, |m| m.min(gap))))
}

/// Merge a time filter's domain with the animation timeline.
///
/// Both sides receive the union of the two domains, or the one domain when
/// only one side has it. A filter synced with the layer timeline also moves
/// the timeline cursor to its start or end, takes its step from the layer
/// time steps, and keeps only the time bins of its plot interval. Anything
/// but a time range filter is returned as is, as are a filter and timeline
/// that both lack a domain.
pub fn merge_filter_with_timeline(filter: &Filter, animation_config: &AnimationConfig) -> MergedTimeline {
    let mut filter = filter.clone();
    let mut animation_config = animation_config.clone();

    if filter.filter_type != Some(FilterType::TimeRange) {
        debug!("Filter {} is not a time range filter", filter.id);
        return MergedTimeline { filter, animation_config };
    }

    let domain = match (filter.range_domain(), animation_config.domain) {
        (Some((lo, hi)), Some([a_lo, a_hi])) => [lo.min(a_lo), hi.max(a_hi)],
        (Some((lo, hi)), None) => [lo, hi],
        (None, Some(animation_domain)) => animation_domain,
        (None, None) => {
            debug!("Filter {} has no time domain to merge", filter.id);
            return MergedTimeline { filter, animation_config };
        }
    };
    filter.domain = Some(Domain::Range(domain[0], domain[1]));
    animation_config.domain = Some(domain);

    if filter.synced_with_layer_timeline {
        if let Some([start, end]) = filter.value.as_ref().and_then(|v| v.as_range()) {
            let anchor = match filter.sync_timeline_mode {
                SyncTimelineMode::Start => start,
                SyncTimelineMode::End => end,
            };
            animation_config.current_time = Some(anchor.clamp(domain[0], domain[1]));
        }
        if let Some(step) = animation_config.time_steps.as_deref().and_then(min_step) {
            filter.step = Some(step);
        }
        if let (Some(interval), Some(time_bins)) = (filter.plot_type.interval, filter.time_bins.as_mut()) {
            for bins in time_bins.values_mut() {
                bins.retain(|id, _| id == interval.id());
            }
        }
    }

    MergedTimeline { filter, animation_config }
}
