use serde::{Deserialize, Serialize};

use crate::vectordb::{Document, DocumentId, ErrorKind, VectorDbError};

/// One input of a batch: a decoded document, or an item that was already
/// found unusable while decoding the request.
#[derive(Debug, Clone)]
pub enum BatchEntry {
    Document(Document),
    Invalid {
        id: Option<DocumentId>,
        error: VectorDbError,
    },
}

impl From<Document> for BatchEntry {
    fn from(document: Document) -> Self {
        BatchEntry::Document(document)
    }
}

/// Resolved outcome of one input document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Accepted,
    Rejected { error_kind: ErrorKind, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOutcome {
    /// Position of the document in the request.
    pub index: usize,
    /// Absent when the item was rejected before an id could be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    #[serde(flatten)]
    pub status: ItemStatus,
}

impl ItemOutcome {
    pub fn accepted(index: usize, id: DocumentId) -> Self {
        Self {
            index,
            id: Some(id),
            status: ItemStatus::Accepted,
        }
    }

    pub fn rejected(
        index: usize,
        id: impl Into<Option<DocumentId>>,
        error: &VectorDbError,
    ) -> Self {
        Self {
            index,
            id: id.into(),
            status: ItemStatus::Rejected {
                error_kind: error.kind(),
                reason: error.to_string(),
            },
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.status, ItemStatus::Accepted)
    }
}

/// Overall shape of a batch: every document, some, or none accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Complete,
    Partial,
    Failed,
}

/// Per-document report for one ingestion call, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub collection: String,
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub status: BatchStatus,
    pub items: Vec<ItemOutcome>,
}

impl BatchResult {
    pub fn from_items(collection: impl Into<String>, items: Vec<ItemOutcome>) -> Self {
        let total = items.len();
        let accepted = items.iter().filter(|i| i.is_accepted()).count();
        let rejected = total - accepted;
        let status = if accepted == total {
            BatchStatus::Complete
        } else if accepted == 0 {
            BatchStatus::Failed
        } else {
            BatchStatus::Partial
        };

        Self {
            collection: collection.into(),
            total,
            accepted,
            rejected,
            status,
            items,
        }
    }

    /// At least one document was written.
    pub fn is_success(&self) -> bool {
        self.accepted > 0
    }

    /// Kind of the first rejection, if any.
    pub fn first_error_kind(&self) -> Option<ErrorKind> {
        self.items.iter().find_map(|i| match &i.status {
            ItemStatus::Rejected { error_kind, .. } => Some(*error_kind),
            ItemStatus::Accepted => None,
        })
    }
}
