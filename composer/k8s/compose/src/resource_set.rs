use crate::{
    k8s::{Deployment, Ingress, ScaledObject, Service, ServiceAccount},
    optional::{Exposure, OptionalResources},
    workload::Workload,
};
use serde::Serialize;
use service_composer_core::{service::Identity, Feature};
use std::{collections::BTreeMap, fmt};

/// Keys of a [`DesiredResourceSet`], in emission order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKey {
    Identity,
    Workload,
    Service,
    Route,
    Scaler,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    ServiceAccount(ServiceAccount),
    Deployment(Box<Deployment>),
    Service(Service),
    Ingress(Ingress),
    ScaledObject(ScaledObject),
}

/// The frozen output of a composition: one resource document per key.
///
/// A set is only ever produced whole. It has no mutation API; callers that need a different set
/// compose again.
#[derive(Clone, Debug, PartialEq)]
pub struct DesiredResourceSet {
    identity: Identity,
    resources: BTreeMap<ResourceKey, Resource>,
}

/// Accumulates resources until the set is frozen.
#[derive(Debug)]
pub(crate) struct ResourceSetBuilder {
    identity: Identity,
    resources: BTreeMap<ResourceKey, Resource>,
}

/// Folds the bound workload and the included optional resources into a set.
pub(crate) fn merge(
    id: Identity,
    identity: ServiceAccount,
    workload: Workload,
    optional: OptionalResources,
) -> DesiredResourceSet {
    let OptionalResources {
        init_task,
        exposure,
        scaler,
    } = optional;

    let mut workload = workload;
    if let Feature::Included(init) = init_task {
        workload = workload.with_init_container(init);
    }
    if scaler.is_included() {
        workload = workload.without_replicas();
    }

    let (service, route) = match exposure {
        Feature::Included(Exposure { service, route }) => {
            (Feature::Included(service), Feature::Included(route))
        }
        Feature::Absent => (Feature::Absent, Feature::Absent),
    };

    ResourceSetBuilder::new(id)
        .with(ResourceKey::Identity, identity)
        .with(ResourceKey::Workload, workload.into_deployment())
        .with_feature(ResourceKey::Service, service)
        .with_feature(ResourceKey::Route, route)
        .with_feature(ResourceKey::Scaler, scaler)
        .freeze()
}

// === impl ResourceKey ===

impl ResourceKey {
    pub const ALL: [Self; 5] = [
        Self::Identity,
        Self::Workload,
        Self::Service,
        Self::Route,
        Self::Scaler,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Workload => "workload",
            Self::Service => "service",
            Self::Route => "route",
            Self::Scaler => "scaler",
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

// === impl Resource ===

impl Resource {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServiceAccount(_) => "ServiceAccount",
            Self::Deployment(_) => "Deployment",
            Self::Service(_) => "Service",
            Self::Ingress(_) => "Ingress",
            Self::ScaledObject(_) => "ScaledObject",
        }
    }

    pub fn as_service_account(&self) -> Option<&ServiceAccount> {
        match self {
            Self::ServiceAccount(sa) => Some(sa),
            _ => None,
        }
    }

    pub fn as_deployment(&self) -> Option<&Deployment> {
        match self {
            Self::Deployment(deploy) => Some(&**deploy),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&Service> {
        match self {
            Self::Service(svc) => Some(svc),
            _ => None,
        }
    }

    pub fn as_ingress(&self) -> Option<&Ingress> {
        match self {
            Self::Ingress(ingress) => Some(ingress),
            _ => None,
        }
    }

    pub fn as_scaled_object(&self) -> Option<&ScaledObject> {
        match self {
            Self::ScaledObject(so) => Some(so),
            _ => None,
        }
    }
}

impl From<ServiceAccount> for Resource {
    fn from(sa: ServiceAccount) -> Self {
        Self::ServiceAccount(sa)
    }
}

impl From<Deployment> for Resource {
    fn from(deploy: Deployment) -> Self {
        Self::Deployment(Box::new(deploy))
    }
}

impl From<Service> for Resource {
    fn from(svc: Service) -> Self {
        Self::Service(svc)
    }
}

impl From<Ingress> for Resource {
    fn from(ingress: Ingress) -> Self {
        Self::Ingress(ingress)
    }
}

impl From<ScaledObject> for Resource {
    fn from(so: ScaledObject) -> Self {
        Self::ScaledObject(so)
    }
}

// === impl DesiredResourceSet ===

impl DesiredResourceSet {
    /// The service the set was composed for.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn get(&self, key: ResourceKey) -> Option<&Resource> {
        self.resources.get(&key)
    }

    pub fn contains_key(&self, key: ResourceKey) -> bool {
        self.resources.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.resources.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKey, &Resource)> + '_ {
        self.resources.iter().map(|(k, r)| (*k, r))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl Serialize for DesiredResourceSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.resources.serialize(serializer)
    }
}

// === impl ResourceSetBuilder ===

impl ResourceSetBuilder {
    pub(crate) fn new(identity: Identity) -> Self {
        Self {
            identity,
            resources: BTreeMap::new(),
        }
    }

    pub(crate) fn with(mut self, key: ResourceKey, resource: impl Into<Resource>) -> Self {
        self.resources.insert(key, resource.into());
        self
    }

    /// Adds the resource only if the feature is included; an absent feature writes no key.
    pub(crate) fn with_feature<R: Into<Resource>>(self, key: ResourceKey, feature: Feature<R>) -> Self {
        match feature {
            Feature::Included(resource) => self.with(key, resource),
            Feature::Absent => self,
        }
    }

    pub(crate) fn freeze(self) -> DesiredResourceSet {
        DesiredResourceSet {
            identity: self.identity,
            resources: self.resources,
        }
    }
}
