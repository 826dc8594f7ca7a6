//! Request bodies accepted by the HTTP routes.

use axum::body::Bytes;
use serde::{Deserialize, de::DeserializeOwned};

use crate::batch::BatchEntry;
use crate::gateway::error::GatewayError;
use crate::vectordb::{Distance, Document, DocumentId, DocumentPatch, Metadata, VectorDbError};

/// Decodes a JSON body, reporting malformed input as `InvalidRequest`.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, GatewayError> {
    if body.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "request body is empty".to_string(),
        ));
    }
    serde_json::from_slice(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))
}

fn default_distance() -> String {
    Distance::Cosine.as_str().to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub dimensions: Dimensions,
    #[serde(default = "default_distance")]
    pub distance: String,
}

/// Dimensionality as sent by clients: a JSON integer or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Dimensions {
    Int(i64),
    Text(String),
}

impl Dimensions {
    pub fn value(&self) -> Result<i64, VectorDbError> {
        match self {
            Dimensions::Int(n) => Ok(*n),
            Dimensions::Text(s) => s.trim().parse().map_err(|_| {
                VectorDbError::validation(format!("dimensions '{}' is not an integer", s))
            }),
        }
    }
}

/// A document as submitted by a client. The id is optional on single upserts.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRequest {
    #[serde(default)]
    pub id: Option<DocumentId>,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl DocumentRequest {
    /// Assigns a fresh UUID when the client omitted the id.
    pub fn into_document(self) -> Document {
        Document {
            id: self.id.unwrap_or_else(DocumentId::generate),
            vector: self.vector,
            metadata: self.metadata,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatchRequest {
    #[serde(default)]
    pub vector: Option<Vec<f32>>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl From<PatchRequest> for DocumentPatch {
    fn from(req: PatchRequest) -> Self {
        DocumentPatch {
            vector: req.vector,
            metadata: req.metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    /// Kept as raw JSON so that one malformed item rejects only itself.
    pub documents: Vec<serde_json::Value>,
}

impl BatchRequest {
    /// Decodes each item on its own. An item that does not decode becomes an
    /// invalid entry carrying whatever id could still be read from it.
    pub fn into_entries(self) -> Vec<BatchEntry> {
        self.documents.into_iter().map(decode_batch_item).collect()
    }
}

fn decode_batch_item(item: serde_json::Value) -> BatchEntry {
    let id = item
        .get("id")
        .and_then(|raw| serde_json::from_value::<DocumentId>(raw.clone()).ok());

    match serde_json::from_value::<DocumentRequest>(item) {
        Ok(request) => BatchEntry::Document(request.into_document()),
        Err(e) => BatchEntry::Invalid {
            id,
            error: VectorDbError::validation(format!("invalid document: {}", e)),
        },
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CollectionList {
    pub collections: Vec<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct CollectionDeleted {
    pub name: String,
}

#[derive(Debug, serde::Serialize)]
pub struct DocumentDeleted {
    pub id: DocumentId,
    #[serde(flatten)]
    pub ack: crate::vectordb::WriteAck,
}
