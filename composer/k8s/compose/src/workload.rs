use crate::{
    baseline::object_meta,
    k8s::{
        labels, Capabilities, Container, Deployment, DeploymentSpec, EnvFromSource, EnvVar,
        EnvVarSource, LabelSelector, Labels, ObjectMeta, PodSpec, PodTemplateSpec, Quantity,
        ResourceRequirements, SeccompProfile, SecretEnvSource, SecretKeySelector,
        SecurityContext,
    },
};
use service_composer_core::{
    bindings::Bindings,
    env::{EnvValue, EnvironmentAssembly},
    service::ServiceSpec,
    SizingTier,
};
use std::collections::BTreeMap;

/// Non-root UID that all workload containers run as.
pub const RUN_AS_USER: i64 = 1000;

const DEFAULT_REPLICAS: i32 = 1;

/// The `workload` Deployment while it is being composed.
///
/// The workload is kept in a typed form until it is merged so that later stages can read its main
/// container instead of recomputing it.
#[derive(Clone, Debug)]
pub(crate) struct Workload {
    metadata: ObjectMeta,
    labels: Labels,
    service_account_name: String,
    main: Container,
    init: Option<Container>,
    replicas: Option<i32>,
}

// === impl Workload ===

impl Workload {
    pub(crate) fn new(spec: &ServiceSpec, labels: Labels) -> Self {
        let id = &spec.identity;
        Self {
            metadata: object_meta(id, &labels),
            labels,
            service_account_name: id.name.clone(),
            main: Container {
                name: id.name.clone(),
                image: Some(spec.image.clone()),
                resources: Some(resources(spec.sizing_tier)),
                security_context: Some(restricted_security_context()),
                ..Default::default()
            },
            init: None,
            replicas: Some(DEFAULT_REPLICAS),
        }
    }

    /// Writes the synthesized environment onto the main container.
    pub(crate) fn with_bindings(mut self, bindings: &Bindings) -> Self {
        self.main.env = Some(env_vars(&bindings.env));
        self.main.env_from = env_from(bindings.bulk_imports.iter());
        self
    }

    pub(crate) fn main_container(&self) -> &Container {
        &self.main
    }

    pub(crate) fn labels(&self) -> &Labels {
        &self.labels
    }

    pub(crate) fn name(&self) -> &str {
        &self.main.name
    }

    pub(crate) fn with_init_container(mut self, init: Container) -> Self {
        self.init = Some(init);
        self
    }

    /// Leaves the replica count to an autoscaler.
    pub(crate) fn without_replicas(mut self) -> Self {
        self.replicas = None;
        self
    }

    pub(crate) fn into_deployment(self) -> Deployment {
        let Self {
            metadata,
            labels: pod_labels,
            service_account_name,
            main,
            init,
            replicas,
        } = self;

        Deployment {
            metadata,
            spec: Some(DeploymentSpec {
                replicas,
                selector: LabelSelector {
                    match_labels: Some(pod_labels.select(&[labels::NAME])),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(pod_labels.to_map()),
                        ..Default::default()
                    }),
                    spec: Some(PodSpec {
                        service_account_name: Some(service_account_name),
                        automount_service_account_token: Some(false),
                        init_containers: init.map(|c| vec![c]),
                        containers: vec![main],
                        ..Default::default()
                    }),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

pub(crate) fn restricted_security_context() -> SecurityContext {
    SecurityContext {
        run_as_non_root: Some(true),
        run_as_user: Some(RUN_AS_USER),
        allow_privilege_escalation: Some(false),
        capabilities: Some(Capabilities {
            drop: Some(vec!["ALL".to_string()]),
            ..Default::default()
        }),
        seccomp_profile: Some(SeccompProfile {
            type_: "RuntimeDefault".to_string(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn resources(tier: SizingTier) -> ResourceRequirements {
    let q = tier.quantities();
    let quantities = |cpu: &str, memory: &str| {
        BTreeMap::from([
            ("cpu".to_string(), Quantity(cpu.to_string())),
            ("memory".to_string(), Quantity(memory.to_string())),
        ])
    };
    ResourceRequirements {
        requests: Some(quantities(q.cpu_request, q.memory_request)),
        limits: Some(quantities(q.cpu_limit, q.memory_limit)),
        ..Default::default()
    }
}

fn env_vars(env: &EnvironmentAssembly) -> Vec<EnvVar> {
    env.iter()
        .map(|var| match &var.value {
            EnvValue::Literal(value) => EnvVar {
                name: var.name.clone(),
                value: Some(value.clone()),
                ..Default::default()
            },
            EnvValue::SecretKeyRef { secret_name, key } => EnvVar {
                name: var.name.clone(),
                value_from: Some(EnvVarSource {
                    secret_key_ref: Some(SecretKeySelector {
                        name: secret_name.clone(),
                        key: key.clone(),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            },
        })
        .collect()
}

/// Returns `None` rather than an empty list so that no `envFrom` field is written.
fn env_from<'s>(secrets: impl Iterator<Item = &'s str>) -> Option<Vec<EnvFromSource>> {
    let sources = secrets
        .map(|name| EnvFromSource {
            secret_ref: Some(SecretEnvSource {
                name: name.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        })
        .collect::<Vec<_>>();
    if sources.is_empty() {
        None
    } else {
        Some(sources)
    }
}
