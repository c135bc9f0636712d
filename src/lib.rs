//! nomad-dns
//!
//! A small DNS server answering `A` queries for [Nomad] jobs. A query for `<job>.service.nomad`
//! resolves to the addresses of the nodes running the job's live allocations.
//!
//! Two activities run side by side for the lifetime of the process:
//!
//! * the [refresh loop][refresh] pulls nodes, jobs and allocations from Nomad on a fixed interval,
//!   compacts them into an immutable [`PlacementSnapshot`][snapshot::PlacementSnapshot] and
//!   swaps it into a shared [`SnapshotCell`][snapshot::SnapshotCell];
//! * the [resolver] answers each query from whichever snapshot is current, without ever waiting
//!   on Nomad.
//!
//! When Nomad is unreachable the last good snapshot keeps being served, and the
//! `nomad_dns_last_refresh_timestamp_seconds` [metric][metrics] stops advancing.
//!
//! [Nomad]: https://www.nomadproject.io/
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod dns;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod refresh;
pub mod resolver;
pub mod snapshot;

pub use config::{Config, DomainSuffix, SharedConfig};
pub use orchestrator::{NomadClient, StaticOrchestrator};
pub use refresh::RefreshLoop;
pub use resolver::{ResolutionOutcome, ResolutionQuery, Resolver};
pub use snapshot::{PlacementSnapshot, SnapshotCell};
