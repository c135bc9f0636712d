use crate::orchestrator::{AllocationDescriptor, NodeDescriptor};
use crate::snapshot::PlacementSnapshot;
use std::collections::{BTreeMap, HashMap};
use std::net::Ipv4Addr;
use tracing::warn;

/// A job ID and every allocation the orchestrator reported for it.
pub type JobAllocations = (String, Vec<AllocationDescriptor>);

/// Counts describing one [`build_with_stats`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub jobs: usize,
    pub addresses: usize,
    /// Running allocations dropped because their node was unknown or had no IPv4 address.
    pub orphaned: usize,
}

/// Node name → address, rebuilt from scratch for every cycle. `None` marks a node whose
/// reported address isn't an IPv4 literal.
struct NodeAddressTable<'a>(HashMap<&'a str, Option<Ipv4Addr>>);

impl<'a> NodeAddressTable<'a> {
    fn new(nodes: &'a [NodeDescriptor]) -> Self {
        // Duplicate names: the last descriptor wins.
        NodeAddressTable(
            nodes
                .iter()
                .map(|node| (node.name.as_str(), node.address.parse().ok()))
                .collect(),
        )
    }

    fn lookup(&self, node: &str) -> Option<Option<Ipv4Addr>> {
        self.0.get(node).copied()
    }
}

/// Build a [`PlacementSnapshot`] from one cycle's nodes and job allocations.
#[must_use]
pub fn build(nodes: &[NodeDescriptor], jobs: &[JobAllocations]) -> PlacementSnapshot {
    build_with_stats(nodes, jobs).0
}

/// Build a [`PlacementSnapshot`], also reporting what went into it.
///
/// Only allocations in the `running` state count. A running allocation on a node missing from
/// `nodes` (or on a node without an IPv4 address) is logged and skipped; it never fails the
/// build. Jobs left with no addresses are absent from the result.
#[must_use]
pub fn build_with_stats(
    nodes: &[NodeDescriptor],
    jobs: &[JobAllocations],
) -> (PlacementSnapshot, BuildStats) {
    let table = NodeAddressTable::new(nodes);
    let mut orphaned = 0;
    let mut placements: BTreeMap<String, Vec<Ipv4Addr>> = BTreeMap::new();

    for (job, allocations) in jobs {
        for alloc in allocations.iter().filter(|a| a.is_running()) {
            match table.lookup(&alloc.node_name) {
                Some(Some(addr)) => placements.entry(job.clone()).or_default().push(addr),
                Some(None) => {
                    orphaned += 1;
                    warn!(job = %job, node = %alloc.node_name, "skipping allocation on node without an IPv4 address");
                }
                None => {
                    orphaned += 1;
                    warn!(job = %job, node = %alloc.node_name, "skipping allocation on unknown node");
                }
            }
        }
    }

    let snapshot: PlacementSnapshot = placements.into_iter().collect();
    let stats = BuildStats {
        jobs: snapshot.len(),
        addresses: snapshot.address_count(),
        orphaned,
    };
    (snapshot, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    fn job(id: &str, allocs: &[(&str, &str)]) -> JobAllocations {
        (
            id.to_string(),
            allocs
                .iter()
                .map(|(node, state)| AllocationDescriptor::new(*node, *state))
                .collect(),
        )
    }

    #[test]
    fn running_allocation_on_known_node_resolves() {
        let nodes = [NodeDescriptor::new("n1", "10.0.0.5")];
        let snapshot = build(&nodes, &[job("web", &[("n1", "running")])]);
        assert_eq!(snapshot.get("web"), Some(&[ip("10.0.0.5")][..]));
    }

    #[test]
    fn non_running_allocations_are_ignored() {
        let nodes = [NodeDescriptor::new("n1", "10.0.0.5")];
        let snapshot = build(
            &nodes,
            &[job(
                "web",
                &[("n1", "failed"), ("n1", "pending"), ("n1", "complete")],
            )],
        );
        assert!(snapshot.is_empty());
    }

    #[test]
    fn duplicate_allocations_keep_duplicate_addresses_in_order() {
        let nodes = [
            NodeDescriptor::new("n1", "10.0.0.5"),
            NodeDescriptor::new("n2", "10.0.0.6"),
        ];
        let snapshot = build(
            &nodes,
            &[job(
                "web",
                &[("n2", "running"), ("n1", "running"), ("n2", "running")],
            )],
        );
        assert_eq!(
            snapshot.get("web"),
            Some(&[ip("10.0.0.6"), ip("10.0.0.5"), ip("10.0.0.6")][..])
        );
    }

    // Each orphan is counted at the same point its warning is emitted, so `orphaned` is the
    // number of warnings logged.
    #[test]
    fn orphaned_allocation_is_skipped_with_one_warning_each() {
        let nodes = [NodeDescriptor::new("n1", "10.0.0.5")];
        let (snapshot, stats) = build_with_stats(
            &nodes,
            &[
                job("web", &[("n2", "running")]),
                job("api", &[("n1", "running"), ("n2", "running")]),
            ],
        );
        assert!(snapshot.get("web").is_none());
        assert_eq!(snapshot.get("api"), Some(&[ip("10.0.0.5")][..]));
        assert_eq!(
            stats,
            BuildStats {
                jobs: 1,
                addresses: 1,
                orphaned: 2
            }
        );
    }

    #[test]
    fn last_duplicate_node_name_wins() {
        let nodes = [
            NodeDescriptor::new("n1", "10.0.0.5"),
            NodeDescriptor::new("n1", "10.0.0.9"),
        ];
        let snapshot = build(&nodes, &[job("web", &[("n1", "running")])]);
        assert_eq!(snapshot.get("web"), Some(&[ip("10.0.0.9")][..]));
    }

    #[test]
    fn node_without_ipv4_address_counts_as_orphan() {
        let nodes = [NodeDescriptor::new("n1", "fd00::1")];
        let (snapshot, stats) = build_with_stats(&nodes, &[job("web", &[("n1", "running")])]);
        assert!(snapshot.is_empty());
        assert_eq!(stats.orphaned, 1);
    }

    #[test]
    fn build_is_idempotent() {
        let nodes = [
            NodeDescriptor::new("n1", "10.0.0.5"),
            NodeDescriptor::new("n2", "10.0.0.6"),
        ];
        let jobs = [
            job("web", &[("n1", "running"), ("n2", "running")]),
            job("api", &[("n2", "running"), ("n3", "running")]),
            job("batch", &[("n1", "complete")]),
        ];
        assert_eq!(build(&nodes, &jobs), build(&nodes, &jobs));
    }
}
