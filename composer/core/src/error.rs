use crate::env::EnvSource;
use std::{fmt, time::Duration};

/// Reasons a composition is aborted. Every variant is fatal: no resources are emitted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The claim is structurally invalid.
    #[error("invalid {field}: {reason}")]
    SchemaViolation { field: String, reason: String },

    /// Two bindings define the same environment variable.
    #[error("environment variable {env_name} from {second} is already defined by {first}")]
    ConflictingBinding {
        env_name: String,
        first: EnvSource,
        second: EnvSource,
    },

    /// A bulk import names a secret that the composition generates for the workload itself.
    #[error(
        "spec.secretRefs[{index}] bulk-imports {secret_name:?}, which is reserved for the \
         workload's own identity"
    )]
    SelfReferentialBulkImport { index: usize, secret_name: String },

    /// The caller's deadline expired before the composition finished.
    #[error("composition exceeded its {budget:?} deadline before the {stage} stage")]
    Timeout { stage: Stage, budget: Duration },
}

/// Pipeline stages, in execution order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Validate,
    StaticTransform,
    Bindings,
    Conditional,
    Emit,
}

// === impl Error ===

impl Error {
    pub fn schema(field: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::SchemaViolation {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// A stable, machine-readable name for the error kind.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::SchemaViolation { .. } => "SchemaViolation",
            Self::ConflictingBinding { .. } => "ConflictingBinding",
            Self::SelfReferentialBulkImport { .. } => "SelfReferentialBulkImport",
            Self::Timeout { .. } => "Timeout",
        }
    }
}

// === impl Stage ===

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validate => "validate".fmt(f),
            Self::StaticTransform => "static-transform".fmt(f),
            Self::Bindings => "bindings".fmt(f),
            Self::Conditional => "conditional".fmt(f),
            Self::Emit => "emit".fmt(f),
        }
    }
}
