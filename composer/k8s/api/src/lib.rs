#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod claim;
pub mod keda;
pub mod labels;
pub mod object;

pub use self::{
    claim::{EventDrivenService, EventDrivenServiceSpec},
    keda::ScaledObject,
    labels::Labels,
    object::KubernetesObject,
};
pub use k8s_openapi::{
    api::{
        self,
        apps::v1::{Deployment, DeploymentSpec},
        core::v1::{
            Capabilities, Container, EnvFromSource, EnvVar, EnvVarSource, PodSpec,
            PodTemplateSpec, ResourceRequirements, SeccompProfile, SecretEnvSource,
            SecretKeySelector, SecurityContext, Service, ServiceAccount, ServicePort,
        },
        networking::v1::{
            HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
            IngressServiceBackend, IngressSpec, ServiceBackendPort,
        },
    },
    apimachinery::pkg::{
        api::resource::Quantity, apis::meta::v1::LabelSelector, util::intstr::IntOrString,
    },
};
pub use kube::{core::ObjectMeta, Resource};
