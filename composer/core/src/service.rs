//! The validated form of a service claim.
//!
//! Values of these types are only produced by the claim validator, so every later stage may rely
//! on their invariants (non-empty names, known sizing tier, `min <= max`, ...) without rechecking.

use crate::{Feature, SizingTier};
use std::{fmt, num::NonZeroU16};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceSpec {
    pub identity: Identity,
    pub image: String,
    pub sizing_tier: SizingTier,
    pub messaging: MessagingBinding,
    pub secret_bindings: Vec<SecretBinding>,
    pub init_task: Feature<InitTask>,
    pub network_exposure: Feature<NetworkExposure>,
    pub autoscaling: Feature<Autoscaling>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    pub name: String,
    pub namespace: String,
}

/// The message stream a service consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessagingBinding {
    pub url: String,
    pub topic: String,
    pub group: String,
}

/// A reference to credential material stored outside the composition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretBinding {
    pub secret_name: String,
    pub explicit_mappings: Vec<KeyMapping>,
    pub bulk_import: bool,
}

/// Exposes a single secret field as an environment variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMapping {
    pub secret_field: String,
    pub env_name: String,
}

/// A task that runs to completion before the service starts, e.g. a schema migration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitTask {
    pub command: Vec<String>,
    pub args: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkExposure {
    pub hostname: String,
    pub port: NonZeroU16,
    pub ingress_class_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Autoscaling {
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub metric: MetricBinding,
}

/// The signal an autoscaler follows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetricBinding {
    /// Pending messages on the service's consumer.
    MessageLag {
        lag_threshold: u32,
        monitoring_endpoint: String,
        account: String,
    },

    /// Average CPU utilization, as a percentage of the request.
    Cpu { utilization: u8 },
}

// === impl Identity ===

impl Identity {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Name of the token secret minted for the workload's service account.
    pub fn token_secret_name(&self) -> String {
        format!("{}-token", self.name)
    }

    /// Secret names the composition generates for the workload's own identity materials. A claim
    /// may not bulk-import any of these.
    pub fn generated_secret_names(&self) -> Vec<String> {
        vec![self.token_secret_name()]
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

// === impl MetricBinding ===

impl MetricBinding {
    pub const DEFAULT_LAG_THRESHOLD: u32 = 10;
    pub const DEFAULT_ACCOUNT: &'static str = "$G";
    pub const DEFAULT_CPU_UTILIZATION: u8 = 80;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_materials() {
        let id = Identity::new("shop", "orders");
        assert_eq!(id.to_string(), "shop/orders");
        assert_eq!(id.generated_secret_names(), vec!["orders-token".to_string()]);
    }
}
