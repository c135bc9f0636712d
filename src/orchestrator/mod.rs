//! Cluster placement state sources.
//!
//! Supports a generic interface for listing the nodes, jobs and per-job allocations of a cluster
//! orchestrator. The [refresh loop][crate::refresh] pulls from an [`OrchestratorClient`] once per
//! cycle and never from the DNS query path.
//!
//! Two implementations are provided, [`nomad::NomadClient`] and [`memory::StaticOrchestrator`].
//! The former talks to the Nomad HTTP API. The latter serves fixed, replaceable contents and is
//! useful for tests and local development.

use crate::error::Error;
use serde::Deserialize;
use std::sync::Arc;

pub mod memory;
pub mod nomad;

#[allow(clippy::module_name_repetitions)]
pub use memory::StaticOrchestrator;
pub use nomad::NomadClient;

/// `DynOrchestrator` is a type alias for an [`OrchestratorClient`] shared between the refresh
/// loop and anything else that wants to query the cluster.
pub type DynOrchestrator = Arc<dyn OrchestratorClient + Send + Sync>;

/// The run-state Nomad reports for an allocation whose tasks are live.
pub const RUNNING: &str = "running";

/// A cluster member and the address its workloads are reachable on.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Address")]
    pub address: String,
}

/// A job known to the orchestrator.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    #[serde(rename = "ID")]
    pub id: String,
}

/// One scheduled instance of a job.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AllocationDescriptor {
    #[serde(rename = "NodeName")]
    pub node_name: String,
    #[serde(rename = "ClientStatus")]
    pub run_state: String,
}

impl AllocationDescriptor {
    #[must_use]
    pub fn new(node_name: impl Into<String>, run_state: impl Into<String>) -> Self {
        AllocationDescriptor {
            node_name: node_name.into(),
            run_state: run_state.into(),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run_state == RUNNING
    }
}

impl NodeDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        NodeDescriptor {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// An async trait describing the three orchestrator queries a refresh cycle needs.
///
/// Any call may fail; the refresh loop treats every failure as "skip this cycle".
#[async_trait::async_trait]
pub trait OrchestratorClient {
    /// List every node currently registered with the cluster.
    async fn list_nodes(&self) -> Result<Vec<NodeDescriptor>, Error>;

    /// List every job currently registered with the cluster.
    async fn list_jobs(&self) -> Result<Vec<JobDescriptor>, Error>;

    /// List the allocations of one job, in any run-state.
    async fn list_allocations(&self, job_id: &str) -> Result<Vec<AllocationDescriptor>, Error>;
}
