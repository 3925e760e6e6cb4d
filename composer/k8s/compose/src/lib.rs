//! Composes an `EventDrivenService` claim into the Kubernetes resources that run it.
//!
//! Composition is a pure, single-pass function of the claim:
//!
//! 1. The claim is validated and converted into a typed [`ServiceSpec`].
//! 2. The static transform builds the `identity` ServiceAccount and the `workload` Deployment.
//! 3. The workload's environment is synthesized from the messaging and secret bindings.
//! 4. Each optional feature (init task, network exposure, autoscaling) is decided exactly once.
//! 5. Everything is merged into a frozen [`DesiredResourceSet`].
//!
//! Any failure aborts the whole composition; no partially built set is ever returned.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod baseline;
pub mod decode;
pub mod objects;
mod optional;
mod resource_set;
pub mod validate;
mod workload;


pub use self::{
    baseline::standard_labels,
    resource_set::{DesiredResourceSet, Resource, ResourceKey},
};
pub use service_composer_core::{service::ServiceSpec, Deadline, Error, Stage};
pub use service_composer_k8s_api as k8s;

use service_composer_core::bindings;
use tracing::{debug, info, info_span};

/// Validates a claim and composes its desired resource set.
pub fn compose(
    claim: &k8s::EventDrivenService,
    deadline: Deadline,
) -> Result<DesiredResourceSet, Error> {
    let span = info_span!(
        "compose",
        namespace = claim.metadata.namespace.as_deref().unwrap_or_default(),
        name = claim.metadata.name.as_deref().unwrap_or_default(),
    );
    let _enter = span.enter();

    deadline.check(Stage::Validate)?;
    let spec = validate::validate(claim)?;
    debug!("Claim is valid");
    compose_spec(&spec, deadline)
}

/// Composes the desired resource set for an already validated spec.
pub fn compose_spec(spec: &ServiceSpec, deadline: Deadline) -> Result<DesiredResourceSet, Error> {
    deadline.check(Stage::StaticTransform)?;
    let baseline::Baseline { identity, workload } = baseline::build(spec);

    deadline.check(Stage::Bindings)?;
    let bindings = bindings::synthesize(spec)?;
    let workload = workload.with_bindings(&bindings);

    deadline.check(Stage::Conditional)?;
    let optional = optional::assemble(spec, &workload);
    debug!(
        init_task = optional.init_task.is_included(),
        network_exposure = optional.exposure.is_included(),
        autoscaling = optional.scaler.is_included(),
        "Assembled optional resources"
    );

    deadline.check(Stage::Emit)?;
    let set = resource_set::merge(spec.identity.clone(), identity, workload, optional);
    info!(resources = ?set.keys().collect::<Vec<_>>(), "Composed desired resources");
    Ok(set)
}
