use anyhow::{Context, Result};
use serde::Serialize;
use service_composer_k8s_compose::{k8s::EventDrivenService, Error};
use std::io::Write;
use tracing::warn;

/// A composition failure, as written to standard error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub claim: String,
    pub reason: &'static str,
    pub message: String,
}

impl FailureReport {
    pub fn new(claim: impl Into<String>, error: &Error) -> Self {
        Self {
            claim: claim.into(),
            reason: error.reason(),
            message: error.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Logs a failure and writes its report to `reports` as one line of JSON.
pub fn write_failure(reports: &mut impl Write, claim: &str, error: &Error) -> Result<()> {
    warn!(%claim, reason = error.reason(), %error, "Claim failed");
    let report = FailureReport::new(claim, error)
        .to_json()
        .context("failed to encode failure report")?;
    writeln!(reports, "{report}").context("failed to write failure report")
}

/// Names a claim as `<namespace>/<name>`, tolerating claims that lack either.
pub fn claim_name(claim: &EventDrivenService) -> String {
    let meta = &claim.metadata;
    format!(
        "{}/{}",
        meta.namespace.as_deref().unwrap_or("<unknown>"),
        meta.name.as_deref().unwrap_or("<unknown>"),
    )
}
