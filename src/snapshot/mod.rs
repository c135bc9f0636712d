//! Point-in-time placement state.
//!
//! A [`PlacementSnapshot`] maps job names to the IPv4 addresses of the nodes running their live
//! allocations. Snapshots are produced by [`builder::build`] once per refresh cycle, published
//! through a [`cell::SnapshotCell`], and never mutated afterwards: the next cycle supersedes a
//! snapshot instead of editing it.

use serde::Serialize;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

pub mod builder;
pub mod cell;
pub mod diff;

pub use builder::{build, build_with_stats, BuildStats, JobAllocations};
pub use cell::SnapshotCell;
pub use diff::{diff, JobChange};

/// An immutable job → addresses mapping.
///
/// Every job present has at least one address. Addresses keep allocation enumeration order, and
/// an address appears once per running allocation on its node.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct PlacementSnapshot {
    jobs: BTreeMap<String, Vec<Ipv4Addr>>,
}

impl PlacementSnapshot {
    /// The addresses of a job's live allocations, or `None` when the job has none.
    #[must_use]
    pub fn get(&self, job: &str) -> Option<&[Ipv4Addr]> {
        self.jobs.get(job).map(Vec::as_slice)
    }

    /// Number of jobs with at least one address.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Total number of addresses across all jobs.
    #[must_use]
    pub fn address_count(&self) -> usize {
        self.jobs.values().map(Vec::len).sum()
    }

    /// Jobs and their addresses, ordered by job name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Ipv4Addr])> {
        self.jobs
            .iter()
            .map(|(job, addrs)| (job.as_str(), addrs.as_slice()))
    }
}

impl FromIterator<(String, Vec<Ipv4Addr>)> for PlacementSnapshot {
    /// Collect a snapshot, dropping jobs without addresses so the non-empty invariant holds.
    fn from_iter<I: IntoIterator<Item = (String, Vec<Ipv4Addr>)>>(iter: I) -> Self {
        PlacementSnapshot {
            jobs: iter
                .into_iter()
                .filter(|(_, addrs)| !addrs.is_empty())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_without_addresses_are_dropped() {
        let snapshot: PlacementSnapshot = [
            ("web".to_string(), vec![Ipv4Addr::new(10, 0, 0, 5)]),
            ("idle".to_string(), vec![]),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("idle").is_none());
        assert_eq!(snapshot.get("web"), Some(&[Ipv4Addr::new(10, 0, 0, 5)][..]));
    }

    #[test]
    fn serializes_as_a_plain_map() {
        let snapshot: PlacementSnapshot = [(
            "web".to_string(),
            vec![Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 6)],
        )]
        .into_iter()
        .collect();

        assert_eq!(
            serde_json::to_string(&snapshot).unwrap(),
            r#"{"web":["10.0.0.5","10.0.0.6"]}"#
        );
    }
}
