//! Durable card store abstraction.
//!
//! The engine never talks to a database directly; it receives a
//! [`CardStore`] at construction time so tests can run against the
//! bundled [`InMemoryStore`].

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Card, ReviewRecord};

pub use memory::InMemoryStore;

/// Store-level failures, propagated unchanged to callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("card {0} not found in store")]
    MissingCard(Uuid),

    #[error("stale write for card {0}: version conflict")]
    VersionConflict(Uuid),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable key-value store of card records, keyed by card id and
/// queryable by user.
///
/// Implementations must serialize concurrent updates to the same
/// card id: review processing is a read-modify-write, and a lost
/// update would corrupt ease/interval/repetition state. The
/// serialization contract is optimistic: `update_card` is a
/// compare-and-swap on [`Card::version`], and writers retry on
/// [`StoreError::VersionConflict`].
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn insert_card(&self, card: &Card) -> StoreResult<()>;

    async fn get_card(&self, id: Uuid) -> StoreResult<Option<Card>>;

    /// Overwrite an existing card record as one atomic update.
    ///
    /// Fails with [`StoreError::VersionConflict`] when the stored
    /// version no longer matches `card.version`; on success the
    /// record is persisted with the version incremented by one.
    async fn update_card(&self, card: &Card) -> StoreResult<()>;

    /// All cards owned by a user, in creation order.
    async fn cards_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Card>>;

    async fn log_review(&self, record: &ReviewRecord) -> StoreResult<()>;

    /// Review log for one card, oldest first.
    async fn reviews_for_card(&self, card_id: Uuid) -> StoreResult<Vec<ReviewRecord>>;
}
