//! Service Composer core
//!
//! Models a validated service claim and the parts of the composition pipeline that do not depend
//! on Kubernetes types. The pipeline turns a claim into a desired resource set in a single pass:
//!
//! ```text
//! [ claim ] -> validate -> static transform -> bindings -> optional resources -> merge -> [ set ]
//! ```
//!
//! This crate owns the typed [`ServiceSpec`](service::ServiceSpec), the environment binding
//! synthesizer, the per-feature [`Feature`] toggle and the error taxonomy. Translation to and from
//! Kubernetes documents lives in `service-composer-k8s-compose`.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod bindings;
mod deadline;
pub mod env;
mod error;
mod feature;
pub mod service;
mod sizing;

pub use self::{
    deadline::Deadline,
    error::{Error, Stage},
    feature::Feature,
    sizing::{ResourceQuantities, SizingTier, UnknownSizingTier},
};

/// The value written to `app.kubernetes.io/managed-by` on every composed resource.
pub const MANAGER_NAME: &str = "service-composer";
