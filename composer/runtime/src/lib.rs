//! The `service-composer` command line: reads claims, composes them and renders the results.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use service_composer_k8s_compose as compose;

mod args;
pub mod batch;
pub mod input;
pub mod log;
pub mod render;
pub mod report;

pub use self::args::Args;
