use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A provider-kubernetes `Object`: wraps an arbitrary manifest so that Crossplane can compose it.
#[derive(Clone, Debug, PartialEq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "kubernetes.crossplane.io",
    version = "v1alpha2",
    kind = "Object",
    root = "KubernetesObject",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSpec {
    pub for_provider: ForProvider,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigRef>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct ForProvider {
    pub manifest: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct ProviderConfigRef {
    pub name: String,
}
