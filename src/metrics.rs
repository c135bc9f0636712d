//! Metrics instrumentation.
//!
//! The [resolver][crate::resolver] and the [refresh loop][crate::refresh] report into a
//! [`MetricsSink`]. [`FacadeMetrics`] forwards everything to the [`metrics`] facade; whichever
//! recorder the process installs (the Prometheus one when the [status API][crate::api] is enabled)
//! picks the values up. All metric names are prefixed with `nomad_dns_`.

use crate::resolver::ResolutionOutcome;
use metrics::{counter, gauge};
use std::sync::Arc;
use time::OffsetDateTime;

/// `DynMetricsSink` is a type alias for a [`MetricsSink`] shared by every component.
#[allow(clippy::module_name_repetitions)]
pub type DynMetricsSink = Arc<dyn MetricsSink + Send + Sync>;

/// Counters and gauges the core reports into.
#[allow(clippy::module_name_repetitions)]
pub trait MetricsSink {
    /// One query was resolved with the given outcome.
    fn query(&self, outcome: &ResolutionOutcome);

    /// A refresh cycle published a snapshot.
    fn refresh_succeeded(&self, jobs: usize, addresses: usize, at: OffsetDateTime);

    /// A refresh cycle was abandoned and the previous snapshot kept.
    fn refresh_failed(&self);

    /// A refresh cycle skipped allocations whose node couldn't be resolved.
    fn orphaned_allocations(&self, count: usize);
}

/// Forwards to the process-wide [`metrics`] recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacadeMetrics;

impl MetricsSink for FacadeMetrics {
    fn query(&self, outcome: &ResolutionOutcome) {
        counter!("nomad_dns_requests_total").increment(1);
        match outcome {
            ResolutionOutcome::Answered { .. } => {
                counter!("nomad_dns_answered_total").increment(1);
            }
            negative => {
                counter!("nomad_dns_nxdomain_total", "outcome" => negative.label()).increment(1);
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn refresh_succeeded(&self, jobs: usize, addresses: usize, at: OffsetDateTime) {
        gauge!("nomad_dns_last_refresh_timestamp_seconds").set(at.unix_timestamp() as f64);
        gauge!("nomad_dns_snapshot_jobs").set(jobs as f64);
        gauge!("nomad_dns_snapshot_addresses").set(addresses as f64);
    }

    fn refresh_failed(&self) {
        counter!("nomad_dns_refresh_failures_total").increment(1);
    }

    fn orphaned_allocations(&self, count: usize) {
        counter!("nomad_dns_orphaned_allocations_total").increment(count as u64);
    }
}
