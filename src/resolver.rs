//! Query resolution against the current placement snapshot.
//!
//! A [`Resolver`] answers `A` queries for `<job><suffix>` names from whatever
//! [`PlacementSnapshot`][crate::snapshot::PlacementSnapshot] is current when the query arrives.
//! It never talks to the orchestrator and never waits for a refresh, so its latency is a suffix
//! comparison plus a map lookup regardless of orchestrator health.

use crate::config::DomainSuffix;
use crate::metrics::DynMetricsSink;
use crate::snapshot::SnapshotCell;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, info};

/// The record type a query asked for, as far as resolution cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// An IPv4 address record.
    A,
    /// Anything else, carrying the numeric record type for logging.
    Other(u16),
}

/// One inbound question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionQuery {
    /// The fully-qualified requested name, with or without a trailing root dot.
    pub name: String,
    pub record_type: QueryType,
    /// Where the query came from. Only used for logging.
    pub client: IpAddr,
}

/// What a query resolved to. Exactly one applies per query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Answered { addresses: Vec<Ipv4Addr>, ttl: u32 },
    EmptyResult,
    OutOfDomain,
    UnsupportedType,
}

impl ResolutionOutcome {
    /// A short stable name for logs and metric labels.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionOutcome::Answered { .. } => "answered",
            ResolutionOutcome::EmptyResult => "empty",
            ResolutionOutcome::OutOfDomain => "out_of_domain",
            ResolutionOutcome::UnsupportedType => "unsupported_type",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::A => f.write_str("A"),
            QueryType::Other(code) => write!(f, "TYPE{code}"),
        }
    }
}

#[derive(Clone)]
pub struct Resolver {
    snapshots: SnapshotCell,
    suffix: DomainSuffix,
    ttl: u32,
    metrics: DynMetricsSink,
}

impl Resolver {
    #[must_use]
    pub fn new(
        snapshots: SnapshotCell,
        suffix: DomainSuffix,
        ttl: u32,
        metrics: DynMetricsSink,
    ) -> Self {
        Resolver {
            snapshots,
            suffix,
            ttl,
            metrics,
        }
    }

    /// Resolve one query and report its outcome to the metrics sink.
    #[must_use]
    pub fn resolve(&self, query: &ResolutionQuery) -> ResolutionOutcome {
        let outcome = self.outcome(query);
        self.metrics.query(&outcome);
        match &outcome {
            ResolutionOutcome::Answered { addresses, .. } => {
                info!("[{}] Resolved {} to {:?}", query.client, query.name, addresses);
            }
            ResolutionOutcome::OutOfDomain => {
                info!(
                    "[{}] NXDOMAIN (outside {} domain) for {}",
                    query.client, self.suffix, query.name
                );
            }
            ResolutionOutcome::UnsupportedType => {
                debug!(
                    "[{}] NXDOMAIN (unsupported type {}) for {}",
                    query.client, query.record_type, query.name
                );
            }
            ResolutionOutcome::EmptyResult => {
                info!("[{}] NXDOMAIN for {}", query.client, query.name);
            }
        }
        outcome
    }

    fn outcome(&self, query: &ResolutionQuery) -> ResolutionOutcome {
        if query.record_type != QueryType::A {
            return ResolutionOutcome::UnsupportedType;
        }
        let Some(service) = self.suffix.strip(&query.name) else {
            return ResolutionOutcome::OutOfDomain;
        };
        match self.snapshots.load().get(service) {
            Some(addresses) if !addresses.is_empty() => ResolutionOutcome::Answered {
                addresses: addresses.to_vec(),
                ttl: self.ttl,
            },
            _ => ResolutionOutcome::EmptyResult,
        }
    }
}
