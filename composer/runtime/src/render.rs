use anyhow::{Context, Result};
use serde::Serialize;
use service_composer_k8s_compose::{objects::wrap_objects, DesiredResourceSet};

/// How resource sets are rendered.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// Each set as a map of resource key to manifest.
    #[default]
    Manifests,

    /// Each resource wrapped in a provider-kubernetes `Object`.
    Objects,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// `---` separated YAML documents.
    #[default]
    Yaml,

    /// A single JSON array.
    Json,
}

/// Renders resource sets, in order.
///
/// In manifests mode there is one document per set; in objects mode there is one document per
/// wrapped resource.
pub fn render(
    sets: &[DesiredResourceSet],
    mode: Mode,
    format: Format,
    provider_config: Option<&str>,
) -> Result<String> {
    match mode {
        Mode::Manifests => documents(sets.iter(), format),
        Mode::Objects => {
            let objects = sets
                .iter()
                .map(|set| wrap_objects(set, provider_config))
                .collect::<Result<Vec<_>, _>>()
                .context("failed to wrap resources")?;
            documents(objects.iter().flatten(), format)
        }
    }
}

fn documents<T: Serialize>(docs: impl Iterator<Item = T>, format: Format) -> Result<String> {
    match format {
        Format::Json => {
            let docs = docs.collect::<Vec<_>>();
            let mut out = serde_json::to_string_pretty(&docs).context("failed to render JSON")?;
            out.push('\n');
            Ok(out)
        }
        Format::Yaml => {
            let mut out = String::new();
            for doc in docs {
                out.push_str("---\n");
                out.push_str(&serde_yaml::to_string(&doc).context("failed to render YAML")?);
            }
            Ok(out)
        }
    }
}
