//! Ordered environment assemblies for a workload's containers.

use crate::Error;
use std::fmt;

/// Where an environment variable's definition came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EnvSource {
    Messaging,
    Secret { index: usize, secret_name: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EnvValue {
    Literal(String),
    SecretKeyRef { secret_name: String, key: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnvVar {
    pub name: String,
    pub value: EnvValue,
    pub source: EnvSource,
}

/// An ordered list of environment variables with unique names.
///
/// Insertion order is preserved exactly; the assembly is never sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvironmentAssembly(Vec<EnvVar>);

/// An ordered list of secrets whose entire contents are imported into the environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BulkImportList(Vec<String>);

// === impl EnvSource ===

impl fmt::Display for EnvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Messaging => "the messaging binding".fmt(f),
            Self::Secret { index, secret_name } => {
                write!(f, "spec.secretRefs[{}] ({})", index, secret_name)
            }
        }
    }
}

// === impl EnvVar ===

impl EnvVar {
    pub fn literal(name: impl Into<String>, value: impl Into<String>, source: EnvSource) -> Self {
        Self {
            name: name.into(),
            value: EnvValue::Literal(value.into()),
            source,
        }
    }

    pub fn secret_key_ref(
        name: impl Into<String>,
        secret_name: impl Into<String>,
        key: impl Into<String>,
        source: EnvSource,
    ) -> Self {
        Self {
            name: name.into(),
            value: EnvValue::SecretKeyRef {
                secret_name: secret_name.into(),
                key: key.into(),
            },
            source,
        }
    }
}

// === impl EnvironmentAssembly ===

impl EnvironmentAssembly {
    /// Appends a variable, failing if its name is already defined.
    pub fn push(&mut self, var: EnvVar) -> Result<(), Error> {
        if let Some(first) = self.get(&var.name) {
            return Err(Error::ConflictingBinding {
                env_name: var.name,
                first: first.source.clone(),
                second: var.source,
            });
        }
        self.0.push(var);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EnvVar> {
        self.0.iter().find(|v| v.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EnvVar> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(|v| v.name.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a EnvironmentAssembly {
    type Item = &'a EnvVar;
    type IntoIter = std::slice::Iter<'a, EnvVar>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// === impl BulkImportList ===

impl BulkImportList {
    /// Appends a secret name. Returns false, leaving the list unchanged, if the name is already
    /// listed; the first occurrence keeps its position.
    pub fn push(&mut self, secret_name: impl Into<String>) -> bool {
        let secret_name = secret_name.into();
        if self.contains(&secret_name) {
            return false;
        }
        self.0.push(secret_name);
        true
    }

    pub fn contains(&self, secret_name: &str) -> bool {
        self.0.iter().any(|s| s == secret_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
