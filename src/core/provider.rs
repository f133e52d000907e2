//! Cloud provider identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of cloud providers a cluster can be provisioned on.
///
/// Provider identifiers select which pipeline the engine runs; the set is
/// closed so the per-provider pipeline table can be matched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Azure,
    DigitalOcean,
    Gce,
}

impl Provider {
    /// All known providers, in display order.
    pub const ALL: [Provider; 4] = [
        Provider::Aws,
        Provider::Azure,
        Provider::DigitalOcean,
        Provider::Gce,
    ];

    /// Stable string form, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Azure => "azure",
            Provider::DigitalOcean => "digitalocean",
            Provider::Gce => "gce",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised at the string boundary for an identifier outside the closed set.
///
/// This is a fatal configuration error, never a retryable condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider: {0:?}")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aws" => Ok(Provider::Aws),
            "azure" => Ok(Provider::Azure),
            "digitalocean" => Ok(Provider::DigitalOcean),
            "gce" => Ok(Provider::Gce),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}
