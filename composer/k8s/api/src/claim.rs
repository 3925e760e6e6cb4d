//! The `EventDrivenService` claim, as submitted by a platform consumer.
//!
//! Every field is optional on the wire so that a claim with missing fields still decodes; the
//! claim validator reports what is missing with the offending field's path.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Describes a service that consumes a NATS stream.
#[derive(Clone, Debug, Default, PartialEq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "platform.composer.dev",
    version = "v1alpha1",
    kind = "EventDrivenService",
    derive = "PartialEq",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct EventDrivenServiceSpec {
    /// The container image reference for the service and its init task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// The sizing tier: one of `small`, `medium` or `large`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nats: Option<NatsBinding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_refs: Option<Vec<SecretRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_container: Option<InitContainer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_exposure: Option<NetworkExposure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscaling: Option<Autoscaling>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NatsBinding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer: Option<String>,
}

/// References a secret, either field by field (`env`) or as a whole (`envFrom`).
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<EnvKeyMapping>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_from: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvKeyMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitContainer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
}

/// Publishes the service under a public hostname.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkExposure {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// The port the service listens on. Defaults to 8080.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_class_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Autoscaling {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_replicas: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_replicas: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_binding: Option<MetricBinding>,
}

/// The signal that drives the autoscaler.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MetricBinding {
    /// Scales on the number of messages pending for the service's consumer.
    #[serde(rename_all = "camelCase")]
    MessageLag {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lag_threshold: Option<i32>,

        /// The NATS server's monitoring endpoint, e.g. `nats.nats.svc:8222`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        monitoring_endpoint: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        account: Option<String>,
    },

    /// Scales on average CPU utilization.
    Cpu {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        utilization: Option<i32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_claim() {
        let claim: EventDrivenService = serde_yaml::from_str(
            r#"
apiVersion: platform.composer.dev/v1alpha1
kind: EventDrivenService
metadata:
  name: orders
  namespace: shop
spec:
  image: registry.example.com/orders:1.0.0
  size: medium
  nats:
    url: nats://nats.nats.svc:4222
    stream: ORDERS
    consumer: orders-workers
  secretRefs:
    - name: db-creds
      env:
        - secretKey: host
          envName: DB_HOST
    - name: llm-keys
      envFrom: true
  initContainer:
    command: [migrate]
  networkExposure:
    enabled: true
    hostname: orders.example.com
  autoscaling:
    enabled: true
    maxReplicas: 5
    metricBinding:
      type: messageLag
      lagThreshold: 25
      monitoringEndpoint: nats.nats.svc:8222
"#,
        )
        .expect("claim must decode");

        let spec = &claim.spec;
        assert_eq!(spec.size.as_deref(), Some("medium"));
        let refs = spec.secret_refs.as_ref().unwrap();
        assert_eq!(refs[0].env.as_ref().unwrap()[0].env_name.as_deref(), Some("DB_HOST"));
        assert_eq!(refs[1].env_from, Some(true));
        assert_eq!(
            spec.init_container.as_ref().unwrap().command,
            Some(vec!["migrate".to_string()])
        );
        assert!(spec.network_exposure.as_ref().unwrap().enabled);
        assert_eq!(
            spec.autoscaling.as_ref().unwrap().metric_binding,
            Some(MetricBinding::MessageLag {
                lag_threshold: Some(25),
                monitoring_endpoint: Some("nats.nats.svc:8222".to_string()),
                account: None,
            })
        );
    }

    #[test]
    fn missing_fields_decode_as_none() {
        let spec: EventDrivenServiceSpec =
            serde_yaml::from_str("networkExposure: { hostname: a.example.com }").unwrap();
        assert_eq!(spec.image, None);
        assert_eq!(spec.nats, None);
        assert!(!spec.network_exposure.unwrap().enabled);
    }

    #[test]
    fn unknown_metric_binding_is_a_decode_error() {
        let res = serde_yaml::from_str::<EventDrivenServiceSpec>(
            "autoscaling: { enabled: true, metricBinding: { type: memory } }",
        );
        assert!(res.is_err());
    }
}
