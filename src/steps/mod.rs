//! Provisioning step implementations
//!
//! Each provider package registers its steps into the [`StepRegistry`];
//! the catalog in `execution::catalog` fixes the order they run in.

pub mod amazon;
pub mod azure;
pub mod provider;

pub use provider::PreProvision;

use crate::cloud::CloudClients;
use crate::execution::StepRegistry;
use std::sync::Arc;

/// Build the registry of every built-in step, wired against the given cloud
/// clients.
///
/// The `preProvision` composite resolves its sub-pipeline against a snapshot
/// of the provider steps registered before it; since registration only
/// happens here, at startup, the snapshot and the live registry agree.
pub fn builtin_registry(clients: &CloudClients) -> StepRegistry {
    let mut registry = StepRegistry::new();
    amazon::register(&mut registry, &clients.aws);
    azure::register(&mut registry, &clients.azure);

    let provider_steps = Arc::new(registry.clone());
    registry.register(Arc::new(PreProvision::new(provider_steps)));
    registry
}
