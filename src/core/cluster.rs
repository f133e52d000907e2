//! Cluster record model

use crate::core::{Provider, ProvisionConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a stored cluster record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterState {
    /// Pipeline is (or was last seen) in flight.
    Provisioning,
    /// Pre-provisioning completed successfully.
    Ready,
    /// Pipeline failed; completed steps were rolled back.
    Failed,
}

impl ClusterState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterState::Provisioning => "provisioning",
            ClusterState::Ready => "ready",
            ClusterState::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "provisioning" => Some(ClusterState::Provisioning),
            "ready" => Some(ClusterState::Ready),
            "failed" => Some(ClusterState::Failed),
            _ => None,
        }
    }
}

/// A provisioned (or failed) cluster, as persisted by the cluster store.
///
/// Carries the final provisioning configuration so the created cloud
/// resources remain attributable after the run ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub provider: Provider,
    pub region: String,
    pub state: ClusterState,
    pub created_at: DateTime<Utc>,
    pub config: ProvisionConfig,
}

impl Cluster {
    /// Short random id for a new cluster record.
    pub fn short_id() -> String {
        let id = Uuid::new_v4().simple().to_string();
        id[..8].to_string()
    }

    pub fn from_config(config: ProvisionConfig, state: ClusterState) -> Self {
        Self {
            id: config.cluster_id.clone(),
            name: config.cluster_name.clone(),
            provider: config.provider,
            region: config.region.clone(),
            state,
            created_at: Utc::now(),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_is_eight_chars() {
        let id = Cluster::short_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_state_roundtrip() {
        for state in [
            ClusterState::Provisioning,
            ClusterState::Ready,
            ClusterState::Failed,
        ] {
            assert_eq!(ClusterState::parse(state.as_str()), Some(state));
        }
        assert_eq!(ClusterState::parse("bogus"), None);
    }

    #[test]
    fn test_from_config_copies_identity() {
        let cfg = ProvisionConfig::new(Provider::Aws, "abc12345", "demo", "us-east-1");
        let cluster = Cluster::from_config(cfg, ClusterState::Ready);
        assert_eq!(cluster.id, "abc12345");
        assert_eq!(cluster.name, "demo");
        assert_eq!(cluster.provider, Provider::Aws);
    }
}
