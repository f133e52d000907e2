//! Persistence layer for cluster records

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteClusterStore;

use crate::core::Cluster;
use anyhow::Result;

/// Trait for cluster record backends.
#[async_trait::async_trait]
pub trait ClusterStore: Send + Sync {
    /// Insert or replace a cluster record.
    async fn save(&self, cluster: &Cluster) -> Result<()>;

    /// Load a cluster by id; `Ok(None)` if the id is unknown.
    async fn get(&self, cluster_id: &str) -> Result<Option<Cluster>>;

    /// All stored clusters, newest first.
    async fn list_all(&self) -> Result<Vec<Cluster>>;

    /// Delete a cluster record.
    async fn delete(&self, cluster_id: &str) -> Result<()>;
}

/// In-memory store (for testing or ephemeral use)
pub struct InMemoryClusterStore {
    clusters: tokio::sync::RwLock<std::collections::HashMap<String, Cluster>>,
}

impl InMemoryClusterStore {
    pub fn new() -> Self {
        Self {
            clusters: tokio::sync::RwLock::new(std::collections::HashMap::new()),
        }
    }
}

impl Default for InMemoryClusterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ClusterStore for InMemoryClusterStore {
    async fn save(&self, cluster: &Cluster) -> Result<()> {
        let mut clusters = self.clusters.write().await;
        clusters.insert(cluster.id.clone(), cluster.clone());
        Ok(())
    }

    async fn get(&self, cluster_id: &str) -> Result<Option<Cluster>> {
        let clusters = self.clusters.read().await;
        Ok(clusters.get(cluster_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Cluster>> {
        let clusters = self.clusters.read().await;
        let mut all: Vec<Cluster> = clusters.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn delete(&self, cluster_id: &str) -> Result<()> {
        let mut clusters = self.clusters.write().await;
        clusters.remove(cluster_id);
        Ok(())
    }
}
