use reelshelf_contracts::ApiError;
use reelshelf_model::CollectionId;
use thiserror::Error;

/// Input rejected before any remote call was made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Collection name cannot be empty")]
    EmptyName,

    #[error("Unknown collection: {0}")]
    UnknownCollection(CollectionId),

    #[error("Index {index} is out of range for a collection of {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Remote call failed: {0}")]
    Remote(#[from] ApiError),

    /// The lane worker serving the operation went away before answering.
    #[error("Operation was dropped before completion")]
    Dropped,
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, StoreError::Remote(_))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
