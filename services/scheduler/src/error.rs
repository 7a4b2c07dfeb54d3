//! Error handling for the scheduling engine.

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Engine operation errors.
///
/// Store failures carry no retry semantics here; the caller decides
/// retry policy.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("card {0} not found")]
    CardNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
