use crate::error::Error;
use crate::orchestrator::{AllocationDescriptor, JobDescriptor, NodeDescriptor, OrchestratorClient};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory stand-in for a cluster orchestrator. Clones share the same contents, so a test
/// can hand one clone to the refresh loop and keep mutating the cluster through another.
#[derive(Default, Debug, Clone)]
pub struct StaticOrchestrator {
    inner: Arc<RwLock<Cluster>>,
}

#[derive(Default, Debug)]
struct Cluster {
    nodes: Vec<NodeDescriptor>,
    allocations: BTreeMap<String, Vec<AllocationDescriptor>>,
    failure: Option<String>,
}

impl StaticOrchestrator {
    #[must_use]
    pub fn new(
        nodes: Vec<NodeDescriptor>,
        allocations: BTreeMap<String, Vec<AllocationDescriptor>>,
    ) -> Self {
        StaticOrchestrator {
            inner: Arc::new(RwLock::new(Cluster {
                nodes,
                allocations,
                failure: None,
            })),
        }
    }

    /// Replace the node list.
    pub async fn set_nodes(&self, nodes: Vec<NodeDescriptor>) {
        self.inner.write().await.nodes = nodes;
    }

    /// Replace the allocations of one job, registering the job if it's new.
    pub async fn set_allocations(&self, job_id: &str, allocations: Vec<AllocationDescriptor>) {
        self.inner
            .write()
            .await
            .allocations
            .insert(job_id.to_string(), allocations);
    }

    /// Deregister a job.
    pub async fn remove_job(&self, job_id: &str) {
        self.inner.write().await.allocations.remove(job_id);
    }

    /// Make every subsequent call fail with [`Error::Unavailable`] until [`Self::recover`].
    pub async fn fail(&self, reason: &str) {
        self.inner.write().await.failure = Some(reason.to_string());
    }

    pub async fn recover(&self) {
        self.inner.write().await.failure = None;
    }

    async fn check(&self) -> Result<(), Error> {
        match &self.inner.read().await.failure {
            Some(reason) => Err(Error::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl OrchestratorClient for StaticOrchestrator {
    async fn list_nodes(&self) -> Result<Vec<NodeDescriptor>, Error> {
        self.check().await?;
        Ok(self.inner.read().await.nodes.clone())
    }

    async fn list_jobs(&self) -> Result<Vec<JobDescriptor>, Error> {
        self.check().await?;
        Ok(self
            .inner
            .read()
            .await
            .allocations
            .keys()
            .map(|id| JobDescriptor { id: id.clone() })
            .collect())
    }

    async fn list_allocations(&self, job_id: &str) -> Result<Vec<AllocationDescriptor>, Error> {
        self.check().await?;
        Ok(self
            .inner
            .read()
            .await
            .allocations
            .get(job_id)
            .cloned()
            .unwrap_or_default())
    }
}
