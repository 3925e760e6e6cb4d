//! Composes a batch of claims concurrently.
//!
//! Each claim is an independent invocation on the blocking pool: there is no state shared between
//! them, and results are returned in input order regardless of completion order.

use crate::{
    input::{self, Source},
    render::{self, Format, Mode},
    report::{self, claim_name},
};
use anyhow::{Context, Result};
use futures::future;
use service_composer_k8s_compose::{
    compose, k8s::EventDrivenService, validate, Deadline, DesiredResourceSet, Error, ServiceSpec,
};
use std::{io::Write, time::Duration};
use tracing::{debug, info};

#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
    pub mode: Mode,
    pub format: Format,
    pub provider_config: Option<String>,

    /// The time budget of each composition. `None` disables the deadline.
    pub budget: Option<Duration>,
}

/// Decodes, composes and renders every claim in `sources`, writing the rendered resources to
/// `out`. Each failure is written to `reports` and counted; the rest of the batch still renders.
pub async fn render_sources(
    sources: &[Source],
    options: &RenderOptions,
    out: &mut impl Write,
    reports: &mut impl Write,
) -> Result<usize> {
    let (claims, mut failures) = decode_claims(sources, reports)?;
    let names = claims.iter().map(claim_name).collect::<Vec<_>>();
    debug!(claims = claims.len(), budget = ?options.budget, "Composing");

    let mut sets = Vec::with_capacity(claims.len());
    for (name, result) in names.iter().zip(compose_all(claims, options.budget).await?) {
        match result {
            Ok(set) => sets.push(set),
            Err(error) => {
                failures += 1;
                report::write_failure(reports, name, &error)?;
            }
        }
    }

    let rendered = render::render(
        &sets,
        options.mode,
        options.format,
        options.provider_config.as_deref(),
    )?;
    out.write_all(rendered.as_bytes())
        .and_then(|()| out.flush())
        .context("failed to write rendered resources")?;

    info!(rendered = sets.len(), failed = failures, "Rendered claims");
    Ok(failures)
}

/// Decodes and validates every claim in `sources`, writing one `<namespace>/<name>: valid` line
/// per valid claim to `out`. Each failure is written to `reports` and counted.
pub fn validate_sources(
    sources: &[Source],
    out: &mut impl Write,
    reports: &mut impl Write,
) -> Result<usize> {
    let (claims, mut failures) = decode_claims(sources, reports)?;

    for (claim, result) in claims.iter().zip(validate_all(&claims)) {
        let name = claim_name(claim);
        match result {
            Ok(_) => writeln!(out, "{name}: valid").context("failed to write result")?,
            Err(error) => {
                failures += 1;
                report::write_failure(reports, &name, &error)?;
            }
        }
    }

    info!(claims = claims.len(), failed = failures, "Validated claims");
    Ok(failures)
}

pub async fn compose_all(
    claims: Vec<EventDrivenService>,
    budget: Option<Duration>,
) -> Result<Vec<Result<DesiredResourceSet, Error>>> {
    let tasks = claims.into_iter().map(|claim| {
        // The deadline starts when the invocation does, not when the batch was queued.
        tokio::task::spawn_blocking(move || compose(&claim, deadline(budget)))
    });

    future::join_all(tasks)
        .await
        .into_iter()
        .map(|res| res.context("composition task failed"))
        .collect()
}

pub fn validate_all(claims: &[EventDrivenService]) -> Vec<Result<ServiceSpec, Error>> {
    claims.iter().map(validate::validate).collect()
}

/// Decodes every document. Documents that fail to decode are reported and counted.
fn decode_claims(
    sources: &[Source],
    reports: &mut impl Write,
) -> Result<(Vec<EventDrivenService>, usize)> {
    let mut claims = Vec::new();
    let mut failures = 0;
    for decoded in input::decode_sources(sources) {
        match decoded.claim {
            Ok(claim) => claims.push(claim),
            Err(error) => {
                failures += 1;
                report::write_failure(reports, &decoded.origin, &error)?;
            }
        }
    }
    Ok((claims, failures))
}

fn deadline(budget: Option<Duration>) -> Deadline {
    budget.map(Deadline::after).unwrap_or_default()
}
