//! Wraps a resource set in provider-kubernetes `Object`s, the form Crossplane compositions use to
//! compose arbitrary Kubernetes resources.

use crate::{
    baseline::standard_labels,
    k8s::{
        object::{ForProvider, ObjectSpec, ProviderConfigRef},
        KubernetesObject,
    },
    DesiredResourceSet, ResourceKey,
};
use std::collections::BTreeMap;

pub const COMPOSITION_RESOURCE_NAME: &str = "crossplane.io/composition-resource-name";

/// Returns one `Object` per resource, in key order.
///
/// `Object`s are cluster-scoped, so each is named `<namespace>.<name>-<key>`. Namespaces are DNS
/// labels and never contain a dot, which keeps names distinct across claims; the result is at
/// most 136 characters and always a valid DNS subdomain.
pub fn wrap_objects(
    set: &DesiredResourceSet,
    provider_config: Option<&str>,
) -> serde_json::Result<Vec<KubernetesObject>> {
    let id = set.identity();
    let labels = standard_labels(id);

    set.iter()
        .map(|(key, resource)| {
            let mut object = KubernetesObject::new(
                &object_name(&id.namespace, &id.name, key),
                ObjectSpec {
                    for_provider: ForProvider {
                        manifest: serde_json::to_value(resource)?,
                    },
                    provider_config_ref: provider_config.map(|name| ProviderConfigRef {
                        name: name.to_string(),
                    }),
                },
            );
            object.metadata.labels = Some(labels.to_map());
            object.metadata.annotations = Some(BTreeMap::from([(
                COMPOSITION_RESOURCE_NAME.to_string(),
                key.to_string(),
            )]));
            Ok(object)
        })
        .collect()
}

fn object_name(namespace: &str, name: &str, key: ResourceKey) -> String {
    format!("{namespace}.{name}-{key}")
}
