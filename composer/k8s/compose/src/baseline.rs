//! The resources every composition produces, whatever the claim enables.

use crate::{
    k8s::{labels, Labels, ObjectMeta, ServiceAccount},
    workload::Workload,
};
use service_composer_core::{service::Identity, service::ServiceSpec, MANAGER_NAME};

/// Value of `app.kubernetes.io/component` on composed resources.
pub const COMPONENT: &str = "event-driven-service";

pub(crate) struct Baseline {
    pub identity: ServiceAccount,
    pub workload: Workload,
}

pub(crate) fn build(spec: &ServiceSpec) -> Baseline {
    let labels = standard_labels(&spec.identity);
    Baseline {
        identity: service_account(&spec.identity, &labels),
        workload: Workload::new(spec, labels),
    }
}

/// The labels carried by every resource composed for a service.
pub fn standard_labels(id: &Identity) -> Labels {
    Labels::from_iter([
        (labels::NAME.to_string(), id.name.clone()),
        (labels::INSTANCE.to_string(), id.name.clone()),
        (labels::PART_OF.to_string(), id.namespace.clone()),
        (labels::MANAGED_BY.to_string(), MANAGER_NAME.to_string()),
        (labels::COMPONENT.to_string(), COMPONENT.to_string()),
    ])
}

/// Builds the workload's own identity. Its token is never mounted automatically; workloads that
/// need it read the `<name>-token` secret.
fn service_account(id: &Identity, labels: &Labels) -> ServiceAccount {
    ServiceAccount {
        metadata: object_meta(id, labels),
        automount_service_account_token: Some(false),
        ..Default::default()
    }
}

pub(crate) fn object_meta(id: &Identity, labels: &Labels) -> ObjectMeta {
    ObjectMeta {
        name: Some(id.name.clone()),
        namespace: Some(id.namespace.clone()),
        labels: Some(labels.to_map()),
        ..Default::default()
    }
}
