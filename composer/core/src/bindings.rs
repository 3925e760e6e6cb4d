//! Synthesizes a workload's environment from its messaging binding and secret bindings.
//!
//! The messaging variables are always assembled first, in a fixed order, followed by each explicit
//! secret mapping in claim order. Bulk imports are collected separately, also in claim order.
//! Nothing is sorted: identical input order always yields identical output order.

use crate::{
    env::{BulkImportList, EnvSource, EnvVar, EnvironmentAssembly},
    service::{MessagingBinding, ServiceSpec},
    Error,
};
use tracing::{debug, trace};

pub const NATS_URL: &str = "NATS_URL";
pub const NATS_STREAM_NAME: &str = "NATS_STREAM_NAME";
pub const NATS_CONSUMER_GROUP: &str = "NATS_CONSUMER_GROUP";

/// The environment shared by every container of a workload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings {
    pub env: EnvironmentAssembly,
    pub bulk_imports: BulkImportList,
}

pub fn synthesize(spec: &ServiceSpec) -> Result<Bindings, Error> {
    let mut env = EnvironmentAssembly::default();
    for var in messaging_vars(&spec.messaging) {
        env.push(var)?;
    }

    let reserved = spec.identity.generated_secret_names();
    let mut bulk_imports = BulkImportList::default();

    for (index, binding) in spec.secret_bindings.iter().enumerate() {
        let source = EnvSource::Secret {
            index,
            secret_name: binding.secret_name.clone(),
        };

        for mapping in &binding.explicit_mappings {
            trace!(%source, env = %mapping.env_name, key = %mapping.secret_field, "Mapping secret key");
            env.push(EnvVar::secret_key_ref(
                mapping.env_name.clone(),
                binding.secret_name.clone(),
                mapping.secret_field.clone(),
                source.clone(),
            ))?;
        }

        if binding.bulk_import {
            if reserved.contains(&binding.secret_name) {
                return Err(Error::SelfReferentialBulkImport {
                    index,
                    secret_name: binding.secret_name.clone(),
                });
            }
            if !bulk_imports.push(binding.secret_name.clone()) {
                debug!(%source, "Secret is already bulk-imported");
            }
        }
    }

    debug!(env = env.len(), bulk_imports = bulk_imports.len(), "Synthesized bindings");
    Ok(Bindings { env, bulk_imports })
}

fn messaging_vars(messaging: &MessagingBinding) -> [EnvVar; 3] {
    [
        EnvVar::literal(NATS_URL, messaging.url.clone(), EnvSource::Messaging),
        EnvVar::literal(NATS_STREAM_NAME, messaging.topic.clone(), EnvSource::Messaging),
        EnvVar::literal(NATS_CONSUMER_GROUP, messaging.group.clone(), EnvSource::Messaging),
    ]
}

#[cfg(test)]
mod tests;
