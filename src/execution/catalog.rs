//! Pipeline catalog - the fixed provisioning order per provider
//!
//! The orderings here encode real infrastructure dependency order (the VPC
//! must exist before subnets, subnets before the route-table association)
//! and must be preserved exactly per provider.

use crate::core::Provider;
use crate::steps::{amazon, azure};

/// Stage name for the pre-provisioning phase, used in error attribution.
pub const PRE_PROVISION: &str = "preProvision";

/// The ordered step names that prepare a provider's infrastructure for a
/// cluster.
///
/// Providers with no registered steps yield an empty pipeline, which runs as
/// a successful no-op.
pub fn pre_provision_steps(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::Aws => &[
            amazon::STEP_FIND_AMI,
            amazon::STEP_CREATE_VPC,
            amazon::STEP_CREATE_SECURITY_GROUPS,
            amazon::STEP_CREATE_INSTANCE_PROFILES,
            amazon::STEP_IMPORT_KEY_PAIR,
            amazon::STEP_CREATE_INTERNET_GATEWAY,
            amazon::STEP_CREATE_SUBNETS,
            amazon::STEP_CREATE_ROUTE_TABLE,
            amazon::STEP_ASSOCIATE_ROUTE_TABLE,
        ],
        Provider::Azure => &[azure::STEP_CREATE_RESOURCE_GROUP, azure::STEP_CREATE_VIRTUAL_NETWORK],
        Provider::DigitalOcean | Provider::Gce => &[],
    }
}
