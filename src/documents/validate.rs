//! Document validation shared by single writes and batch ingestion.

use crate::vectordb::{Document, DocumentPatch, VectorDbError};

/// Checks a vector against the owning collection's dimensionality.
pub fn validate_vector(vector: &[f32], dimensions: u64) -> Result<(), VectorDbError> {
    if vector.len() as u64 != dimensions {
        return Err(VectorDbError::validation(format!(
            "vector length {} does not match collection dimensionality {}",
            vector.len(),
            dimensions
        )));
    }

    if let Some(pos) = vector.iter().position(|v| !v.is_finite()) {
        return Err(VectorDbError::validation(format!(
            "vector component {} is not a finite number",
            pos
        )));
    }

    Ok(())
}

pub fn validate_document(document: &Document, dimensions: u64) -> Result<(), VectorDbError> {
    validate_vector(&document.vector, dimensions)
}

pub fn validate_patch(patch: &DocumentPatch, dimensions: u64) -> Result<(), VectorDbError> {
    if patch.is_empty() {
        return Err(VectorDbError::validation(
            "update must include `vector` and/or `metadata`",
        ));
    }
    if let Some(vector) = &patch.vector {
        validate_vector(vector, dimensions)?;
    }
    Ok(())
}
