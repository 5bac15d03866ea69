use crate::store::StoreError;
use keepup_catalog::CatalogError;
use thiserror::Error;

/// Failure of a user-initiated operation; `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum KeepUpError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KeepUpError>;
