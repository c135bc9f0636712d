//! Periodic placement state refresh.
//!
//! The [`RefreshLoop`] is the only writer of the shared [`SnapshotCell`]. Once per
//! [`Config::refresh_interval`][crate::config::Config::refresh_interval] it pulls nodes, jobs and
//! allocations from the orchestrator, builds a fresh snapshot and publishes it in one atomic swap.
//! A failed fetch abandons the cycle and keeps the previous snapshot; the next tick retries.

use crate::error::Error;
use crate::metrics::DynMetricsSink;
use crate::orchestrator::{DynOrchestrator, NodeDescriptor};
use crate::snapshot::{self, JobAllocations, JobChange, SnapshotCell};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct RefreshLoop {
    orchestrator: DynOrchestrator,
    snapshots: SnapshotCell,
    metrics: DynMetricsSink,
    interval: Duration,
    stop: CancellationToken,
}

impl RefreshLoop {
    #[must_use]
    pub fn new(
        orchestrator: DynOrchestrator,
        snapshots: SnapshotCell,
        metrics: DynMetricsSink,
        interval: Duration,
        stop: CancellationToken,
    ) -> Self {
        RefreshLoop {
            orchestrator,
            snapshots,
            metrics,
            interval,
            stop,
        }
    }

    /// Refresh until the stop token is cancelled. The first cycle runs immediately.
    ///
    /// The token is checked between cycles only; a cycle in flight runs to completion (or to its
    /// request timeout) before the loop notices.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if self.stop.is_cancelled() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {}
                () = self.stop.cancelled() => break,
            }

            match self.refresh_once().await {
                Ok(changes) => {
                    for change in &changes {
                        info!("{change}");
                    }
                }
                Err(err) => {
                    warn!("refresh failed, keeping previous snapshot: {err}");
                }
            }
        }
        debug!("refresh loop stopped");
    }

    /// Run one fetch-build-publish cycle, returning how the published snapshot differs from the
    /// one it replaced.
    ///
    /// # Errors
    ///
    /// Returns whatever the orchestrator failed with. Nothing is published in that case.
    pub async fn refresh_once(&self) -> Result<Vec<JobChange>, Error> {
        let (nodes, jobs) = match self.fetch().await {
            Ok(fetched) => fetched,
            Err(err) => {
                self.metrics.refresh_failed();
                return Err(err);
            }
        };

        let (next, stats) = snapshot::build_with_stats(&nodes, &jobs);
        if stats.orphaned > 0 {
            self.metrics.orphaned_allocations(stats.orphaned);
        }

        let changes = snapshot::diff(&self.snapshots.load(), &next);
        self.snapshots.publish(next);
        self.metrics.refresh_succeeded(
            stats.jobs,
            stats.addresses,
            self.snapshots
                .last_refresh()
                .unwrap_or_else(OffsetDateTime::now_utc),
        );
        debug!(
            jobs = stats.jobs,
            addresses = stats.addresses,
            orphaned = stats.orphaned,
            "published snapshot"
        );
        Ok(changes)
    }

    async fn fetch(&self) -> Result<(Vec<NodeDescriptor>, Vec<JobAllocations>), Error> {
        let nodes = self.orchestrator.list_nodes().await?;
        let job_list = self.orchestrator.list_jobs().await?;

        let mut jobs = Vec::with_capacity(job_list.len());
        for job in job_list {
            let allocations = self.orchestrator.list_allocations(&job.id).await?;
            jobs.push((job.id, allocations));
        }
        Ok((nodes, jobs))
    }
}
