//! Builds the resources for features a claim may enable.
//!
//! Every builder reads the already-bound workload, so optional resources share its image and its
//! environment rather than recomputing them.

use crate::{
    baseline::object_meta,
    k8s::{
        api::core::v1::ServiceSpec as K8sServiceSpec,
        keda::{ScaleTargetRef, ScaleTrigger, ScaledObjectSpec},
        labels,
        Container, HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
        IngressServiceBackend, IngressSpec, IntOrString, ScaledObject, Service, ServiceBackendPort,
        ServicePort,
    },
    workload::{restricted_security_context, Workload},
};
use service_composer_core::{
    service::{Autoscaling, InitTask, MessagingBinding, MetricBinding, NetworkExposure, ServiceSpec},
    Feature,
};
use std::collections::BTreeMap;

pub const INIT_CONTAINER_NAME: &str = "run-migrations";

/// The name of the port on the `service` resource.
pub const SERVICE_PORT_NAME: &str = "http";
pub const SERVICE_PORT: i32 = 80;

#[derive(Clone, Debug)]
pub(crate) struct OptionalResources {
    pub init_task: Feature<Container>,
    pub exposure: Feature<Exposure>,
    pub scaler: Feature<ScaledObject>,
}

/// Network exposure produces a pair of resources: a cluster service and a route to it.
#[derive(Clone, Debug)]
pub(crate) struct Exposure {
    pub service: Service,
    pub route: Ingress,
}

pub(crate) fn assemble(spec: &ServiceSpec, workload: &Workload) -> OptionalResources {
    OptionalResources {
        init_task: spec
            .init_task
            .as_ref()
            .map(|task| init_container(task, workload)),
        exposure: spec
            .network_exposure
            .as_ref()
            .map(|exposure| Exposure {
                service: service(spec, exposure, workload),
                route: route(spec, exposure, workload),
            }),
        scaler: spec
            .autoscaling
            .as_ref()
            .map(|autoscaling| scaled_object(spec, autoscaling, workload)),
    }
}

/// The init task observes exactly the main container's image and environment.
fn init_container(task: &InitTask, workload: &Workload) -> Container {
    let main = workload.main_container();
    Container {
        name: INIT_CONTAINER_NAME.to_string(),
        image: main.image.clone(),
        command: Some(task.command.clone()),
        args: if task.args.is_empty() {
            None
        } else {
            Some(task.args.clone())
        },
        env: main.env.clone(),
        env_from: main.env_from.clone(),
        security_context: Some(restricted_security_context()),
        ..Default::default()
    }
}

fn service(spec: &ServiceSpec, exposure: &NetworkExposure, workload: &Workload) -> Service {
    Service {
        metadata: object_meta(&spec.identity, workload.labels()),
        spec: Some(K8sServiceSpec {
            selector: Some(workload.labels().select(&[labels::NAME])),
            ports: Some(vec![ServicePort {
                name: Some(SERVICE_PORT_NAME.to_string()),
                port: SERVICE_PORT,
                target_port: Some(IntOrString::Int(exposure.port.get().into())),
                protocol: Some("TCP".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn route(spec: &ServiceSpec, exposure: &NetworkExposure, workload: &Workload) -> Ingress {
    Ingress {
        metadata: object_meta(&spec.identity, workload.labels()),
        spec: Some(IngressSpec {
            ingress_class_name: exposure.ingress_class_name.clone(),
            rules: Some(vec![IngressRule {
                host: Some(exposure.hostname.clone()),
                http: Some(HTTPIngressRuleValue {
                    paths: vec![HTTPIngressPath {
                        path: Some("/".to_string()),
                        path_type: "Prefix".to_string(),
                        backend: IngressBackend {
                            service: Some(IngressServiceBackend {
                                name: workload.name().to_string(),
                                port: Some(ServiceBackendPort {
                                    name: Some(SERVICE_PORT_NAME.to_string()),
                                    ..Default::default()
                                }),
                            }),
                            ..Default::default()
                        },
                    }],
                }),
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn scaled_object(spec: &ServiceSpec, autoscaling: &Autoscaling, workload: &Workload) -> ScaledObject {
    let mut scaler = ScaledObject::new(
        workload.name(),
        ScaledObjectSpec {
            scale_target_ref: ScaleTargetRef {
                api_version: Some("apps/v1".to_string()),
                kind: Some("Deployment".to_string()),
                name: workload.name().to_string(),
            },
            min_replica_count: replica_count(autoscaling.min_replicas),
            max_replica_count: replica_count(autoscaling.max_replicas),
            triggers: vec![trigger(&autoscaling.metric, &spec.messaging)],
        },
    );
    scaler.metadata = object_meta(&spec.identity, workload.labels());
    scaler
}

fn trigger(metric: &MetricBinding, messaging: &MessagingBinding) -> ScaleTrigger {
    match metric {
        MetricBinding::MessageLag {
            lag_threshold,
            monitoring_endpoint,
            account,
        } => ScaleTrigger {
            type_: ScaleTrigger::NATS_JETSTREAM.to_string(),
            metric_type: None,
            metadata: BTreeMap::from([
                (
                    "natsServerMonitoringEndpoint".to_string(),
                    monitoring_endpoint.clone(),
                ),
                ("account".to_string(), account.clone()),
                ("stream".to_string(), messaging.topic.clone()),
                ("consumer".to_string(), messaging.group.clone()),
                ("lagThreshold".to_string(), lag_threshold.to_string()),
            ]),
        },
        MetricBinding::Cpu { utilization } => ScaleTrigger {
            type_: ScaleTrigger::CPU.to_string(),
            metric_type: Some("Utilization".to_string()),
            metadata: BTreeMap::from([("value".to_string(), utilization.to_string())]),
        },
    }
}

/// Replica bounds originate from `i32` claim fields.
fn replica_count(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
