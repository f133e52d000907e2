//! Per-run provisioning configuration and the YAML cluster spec

use crate::core::Provider;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default CIDR block for the cluster VPC on AWS.
pub const DEFAULT_VPC_CIDR: &str = "10.2.0.0/16";

/// Default address space for the cluster virtual network on Azure.
pub const DEFAULT_VNET_CIDR: &str = "10.0.0.0/16";

/// The single piece of mutable state threaded through an entire pipeline run.
///
/// Steps read fields written by earlier steps and record their own outputs
/// (created resource ids) for later steps to consume. One instance exists
/// per provisioning request; it is owned by that run's task and never shared
/// across concurrent runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionConfig {
    pub provider: Provider,
    pub cluster_id: String,
    pub cluster_name: String,
    pub region: String,

    /// Public key imported into the cloud for node SSH access.
    #[serde(default)]
    pub ssh_public_key: String,

    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub azure: AzureConfig,
}

impl ProvisionConfig {
    pub fn new(
        provider: Provider,
        cluster_id: impl Into<String>,
        cluster_name: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            cluster_id: cluster_id.into(),
            cluster_name: cluster_name.into(),
            region: region.into(),
            ssh_public_key: String::new(),
            aws: AwsConfig::default(),
            azure: AzureConfig::default(),
        }
    }

    /// Reject semantically invalid configs before any step runs.
    ///
    /// A failure here is a deployment defect, not a transient condition.
    pub fn validate(&self) -> Result<(), String> {
        if self.cluster_id.trim().is_empty() {
            return Err("cluster id is empty".to_string());
        }
        if self.cluster_name.trim().is_empty() {
            return Err("cluster name is empty".to_string());
        }
        if self.region.trim().is_empty() {
            return Err("region is empty".to_string());
        }
        Ok(())
    }
}

/// Outputs of the AWS pre-provision steps, written as each step succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsConfig {
    pub vpc_cidr: String,
    pub vpc_id: Option<String>,
    pub image_id: Option<String>,
    pub masters_security_group_id: Option<String>,
    pub nodes_security_group_id: Option<String>,
    pub masters_instance_profile: Option<String>,
    pub nodes_instance_profile: Option<String>,
    pub key_pair_name: Option<String>,
    pub key_fingerprint: Option<String>,
    pub internet_gateway_id: Option<String>,
    /// Availability zone -> subnet id, one subnet per zone.
    pub subnets: BTreeMap<String, String>,
    pub route_table_id: Option<String>,
    pub route_table_associations: Vec<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            vpc_cidr: DEFAULT_VPC_CIDR.to_string(),
            vpc_id: None,
            image_id: None,
            masters_security_group_id: None,
            nodes_security_group_id: None,
            masters_instance_profile: None,
            nodes_instance_profile: None,
            key_pair_name: None,
            key_fingerprint: None,
            internet_gateway_id: None,
            subnets: BTreeMap::new(),
            route_table_id: None,
            route_table_associations: Vec::new(),
        }
    }
}

/// Outputs of the Azure pre-provision steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AzureConfig {
    pub vnet_cidr: String,
    pub resource_group: Option<String>,
    pub virtual_network: Option<String>,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            vnet_cidr: DEFAULT_VNET_CIDR.to_string(),
            resource_group: None,
            virtual_network: None,
        }
    }
}

/// A provisioning request as written by an operator, loadable from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub name: String,
    pub provider: Provider,
    pub region: String,

    #[serde(default)]
    pub ssh_public_key: Option<String>,

    #[serde(default)]
    pub vpc_cidr: Option<String>,

    #[serde(default)]
    pub vnet_cidr: Option<String>,
}

impl ClusterSpec {
    /// Load a cluster spec from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a cluster spec from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let spec: ClusterSpec = serde_yaml::from_str(yaml)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Validate the spec.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("cluster name is empty");
        }
        if self.region.trim().is_empty() {
            anyhow::bail!("region is empty");
        }
        if let Some(cidr) = &self.vpc_cidr {
            if !cidr.contains('/') {
                anyhow::bail!("vpc_cidr {:?} is not a CIDR block", cidr);
            }
        }
        Ok(())
    }

    /// Build the per-run configuration for a new cluster id.
    pub fn into_config(self, cluster_id: impl Into<String>) -> ProvisionConfig {
        let mut cfg = ProvisionConfig::new(self.provider, cluster_id, self.name, self.region);
        if let Some(key) = self.ssh_public_key {
            cfg.ssh_public_key = key;
        }
        if let Some(cidr) = self.vpc_cidr {
            cfg.aws.vpc_cidr = cidr;
        }
        if let Some(cidr) = self.vnet_cidr {
            cfg.azure.vnet_cidr = cidr;
        }
        cfg
    }
}
