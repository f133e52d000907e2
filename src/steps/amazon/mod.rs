//! AWS pre-provision steps
//!
//! Together these create the network prerequisites a cluster needs on AWS:
//! AMI lookup, VPC, security groups, instance profiles, key pair, internet
//! gateway, per-zone subnets, and the route table wiring them together.

pub mod ami;
pub mod internet_gateway;
pub mod instance_profiles;
pub mod key_pair;
pub mod route_table;
pub mod security_groups;
pub mod subnets;
pub mod vpc;

pub use ami::FindAmi;
pub use instance_profiles::CreateInstanceProfiles;
pub use internet_gateway::CreateInternetGateway;
pub use key_pair::ImportKeyPair;
pub use route_table::{AssociateRouteTable, CreateRouteTable};
pub use security_groups::CreateSecurityGroups;
pub use subnets::CreateSubnets;
pub use vpc::CreateVpc;

use crate::cloud::AwsApi;
use crate::execution::StepRegistry;
use std::sync::Arc;

pub const STEP_FIND_AMI: &str = "awsFindAmi";
pub const STEP_CREATE_VPC: &str = "awsCreateVpc";
pub const STEP_CREATE_SECURITY_GROUPS: &str = "awsCreateSecurityGroups";
pub const STEP_CREATE_INSTANCE_PROFILES: &str = "awsCreateInstanceProfiles";
pub const STEP_IMPORT_KEY_PAIR: &str = "awsImportKeyPair";
pub const STEP_CREATE_INTERNET_GATEWAY: &str = "awsCreateInternetGateway";
pub const STEP_CREATE_SUBNETS: &str = "awsCreateSubnets";
pub const STEP_CREATE_ROUTE_TABLE: &str = "awsCreateRouteTable";
pub const STEP_ASSOCIATE_ROUTE_TABLE: &str = "awsAssociateRouteTable";

/// Register every AWS step against the shared client handle.
pub fn register(registry: &mut StepRegistry, aws: &Arc<dyn AwsApi>) {
    registry.register(Arc::new(FindAmi::new(aws.clone())));
    registry.register(Arc::new(CreateVpc::new(aws.clone())));
    registry.register(Arc::new(CreateSecurityGroups::new(aws.clone())));
    registry.register(Arc::new(CreateInstanceProfiles::new(aws.clone())));
    registry.register(Arc::new(ImportKeyPair::new(aws.clone())));
    registry.register(Arc::new(CreateInternetGateway::new(aws.clone())));
    registry.register(Arc::new(CreateSubnets::new(aws.clone())));
    registry.register(Arc::new(CreateRouteTable::new(aws.clone())));
    registry.register(Arc::new(AssociateRouteTable::new(aws.clone())));
}

fn masters_group_name(cluster: &str) -> String {
    format!("{}-masters", cluster)
}

fn nodes_group_name(cluster: &str) -> String {
    format!("{}-nodes", cluster)
}

fn masters_profile_name(cluster: &str) -> String {
    format!("{}-master-profile", cluster)
}

fn nodes_profile_name(cluster: &str) -> String {
    format!("{}-node-profile", cluster)
}

fn key_pair_name(cluster: &str) -> String {
    format!("{}-key", cluster)
}
