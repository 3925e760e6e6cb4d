use anyhow::{Context, Result};
use service_composer_k8s_compose::{decode, k8s::EventDrivenService, Error};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// The name under which standard input is reported.
pub const STDIN: &str = "-";

/// The raw contents of one input file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub contents: String,
}

/// A claim decoded from one document of a [`Source`], or the reason it could not be decoded.
#[derive(Debug)]
pub struct Decoded {
    /// Names the document as `<source>[<index>]`.
    pub origin: String,
    pub claim: Result<EventDrivenService, Error>,
}

/// Reads every path, in order. No paths, or a `-` path, reads standard input.
pub async fn read_sources(paths: &[PathBuf]) -> Result<Vec<Source>> {
    if paths.is_empty() {
        return Ok(vec![read_stdin().await?]);
    }

    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let source = if path == Path::new(STDIN) {
            read_stdin().await?
        } else {
            let contents = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            Source {
                name: path.display().to_string(),
                contents,
            }
        };
        sources.push(source);
    }
    Ok(sources)
}

async fn read_stdin() -> Result<Source> {
    let mut contents = String::new();
    tokio::io::stdin()
        .read_to_string(&mut contents)
        .await
        .context("failed to read standard input")?;
    Ok(Source {
        name: STDIN.to_string(),
        contents,
    })
}

/// Decodes every document of every source, in order.
pub fn decode_sources(sources: &[Source]) -> Vec<Decoded> {
    sources
        .iter()
        .flat_map(|source| {
            decode::documents_from_str(&source.contents)
                .into_iter()
                .map(move |document| Decoded {
                    origin: format!("{}[{}]", source.name, document.index),
                    claim: document.claim,
                })
        })
        .collect()
}
