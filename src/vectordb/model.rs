use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::VectorDbError;

/// Free-form document metadata (a JSON object).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Point identifier: an unsigned integer or a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentId {
    Num(u64),
    Uuid(Uuid),
}

impl DocumentId {
    /// Generates a random UUID v4 id.
    pub fn generate() -> Self {
        DocumentId::Uuid(Uuid::new_v4())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Num(n) => write!(f, "{}", n),
            DocumentId::Uuid(u) => write!(f, "{}", u.hyphenated()),
        }
    }
}

impl From<u64> for DocumentId {
    fn from(n: u64) -> Self {
        DocumentId::Num(n)
    }
}

impl From<Uuid> for DocumentId {
    fn from(u: Uuid) -> Self {
        DocumentId::Uuid(u)
    }
}

impl FromStr for DocumentId {
    type Err = VectorDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u64>() {
            return Ok(DocumentId::Num(n));
        }
        Uuid::parse_str(s).map(DocumentId::Uuid).map_err(|_| {
            VectorDbError::validation(format!(
                "document id '{}' must be an unsigned integer or a UUID",
                s
            ))
        })
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DocumentId::Num(n) => serializer.serialize_u64(*n),
            DocumentId::Uuid(u) => serializer.collect_str(&u.hyphenated()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocumentId {
    Num(u64),
    Text(String),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawDocumentId::deserialize(deserializer)? {
            RawDocumentId::Num(n) => Ok(DocumentId::Num(n)),
            RawDocumentId::Text(s) => s.parse().map_err(serde::de::Error::custom),
            RawDocumentId::Other(v) => Err(serde::de::Error::custom(format!(
                "document id {} must be an unsigned integer or a UUID",
                v
            ))),
        }
    }
}

/// One stored point: id, vector, and optional metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub vector: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Partial update: only the present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        self.vector.is_none() && self.metadata.is_none()
    }
}

/// Similarity function of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    Cosine,
    Dot,
    #[serde(alias = "euclid")]
    Euclidean,
    Manhattan,
}

impl Distance {
    pub const ALL: [Distance; 4] = [
        Distance::Cosine,
        Distance::Dot,
        Distance::Euclidean,
        Distance::Manhattan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Distance::Cosine => "cosine",
            Distance::Dot => "dot",
            Distance::Euclidean => "euclidean",
            Distance::Manhattan => "manhattan",
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Distance {
    type Err = VectorDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(Distance::Cosine),
            "dot" => Ok(Distance::Dot),
            "euclidean" | "euclid" => Ok(Distance::Euclidean),
            "manhattan" => Ok(Distance::Manhattan),
            _ => Err(VectorDbError::validation(format!(
                "improper distance '{}': must be one of [cosine, dot, euclidean, manhattan]",
                s
            ))),
        }
    }
}

/// Schema of a collection as requested at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub name: String,
    pub dimensions: u64,
    pub distance: Distance,
}

/// Store-reported health of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    Green,
    Yellow,
    Red,
    Grey,
    Unknown,
}

/// Details of an existing collection, read fresh from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub dimensions: u64,
    pub distance: Distance,
    pub points_count: u64,
    pub indexed_vectors_count: u64,
    pub segments_count: u64,
    pub status: CollectionStatus,
}

/// Store acknowledgment state for a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    Acknowledged,
    Completed,
    Unknown,
}

/// Acknowledgment returned by point writes and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteAck {
    pub operation_id: Option<u64>,
    pub status: WriteStatus,
}

impl WriteAck {
    pub fn completed(operation_id: Option<u64>) -> Self {
        Self {
            operation_id,
            status: WriteStatus::Completed,
        }
    }
}

/// Per-point result of a multi-point write.
#[derive(Debug, Clone, PartialEq)]
pub enum PointStatus {
    Accepted,
    Rejected(VectorDbError),
}
