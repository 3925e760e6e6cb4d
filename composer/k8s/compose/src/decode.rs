//! Reads claims from YAML or JSON documents.

use crate::k8s::{EventDrivenService, Resource};
use serde::Deserialize;
use service_composer_core::Error;

/// The field reported when a document cannot be decoded at all.
pub const DOCUMENT_FIELD: &str = "<document>";

/// One document of a claim stream.
#[derive(Debug, PartialEq)]
pub struct Document {
    /// The document's zero-based position in the stream. Empty documents are counted.
    pub index: usize,
    pub claim: Result<EventDrivenService, Error>,
}

/// Decodes each document of a (possibly multi-document) YAML stream. JSON is accepted as well, as
/// it is a subset of YAML. Empty documents are skipped.
///
/// A document that fails to decode does not affect its neighbors. YAML that cannot be parsed ends
/// the stream, since nothing after a syntax error can be read.
pub fn documents_from_str(input: &str) -> Vec<Document> {
    let mut documents = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_str(input).enumerate() {
        let value = match serde_yaml::Value::deserialize(document) {
            Ok(value) => value,
            Err(error) => {
                documents.push(Document {
                    index,
                    claim: Err(Error::schema(
                        DOCUMENT_FIELD,
                        format!("document {index}: {error}"),
                    )),
                });
                break;
            }
        };
        if value.is_null() {
            continue;
        }
        documents.push(Document {
            index,
            claim: claim_from_value(value),
        });
    }
    documents
}

/// Decodes a single claim, checking its `apiVersion` and `kind`.
pub fn claim_from_value(value: serde_yaml::Value) -> Result<EventDrivenService, Error> {
    let api_version = EventDrivenService::api_version(&());
    match value.get("apiVersion").and_then(serde_yaml::Value::as_str) {
        Some(v) if v == api_version => {}
        Some(v) => {
            return Err(Error::schema(
                "apiVersion",
                format!("expected {api_version:?}, got {v:?}"),
            ))
        }
        None => return Err(Error::schema("apiVersion", "is required")),
    }

    let kind = EventDrivenService::kind(&());
    match value.get("kind").and_then(serde_yaml::Value::as_str) {
        Some(k) if k == kind => {}
        Some(k) => return Err(Error::schema("kind", format!("expected {kind:?}, got {k:?}"))),
        None => return Err(Error::schema("kind", "is required")),
    }

    serde_yaml::from_value(value).map_err(|error| Error::schema(DOCUMENT_FIELD, error))
}
