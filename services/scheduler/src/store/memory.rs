//! In-memory card store for tests and embedded use.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Card, ReviewRecord};

use super::{CardStore, StoreError, StoreResult};

/// Non-durable store backed by a hash map.
///
/// Updates are compare-and-swap on [`Card::version`] under a single
/// write lock, so interleaved read-modify-write cycles on one card
/// surface as [`StoreError::VersionConflict`] instead of silently
/// losing the earlier write.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    cards: HashMap<Uuid, Card>,
    // Insertion order, so cards_for_user returns creation order.
    order: Vec<Uuid>,
    reviews: Vec<ReviewRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CardStore for InMemoryStore {
    async fn insert_card(&self, card: &Card) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.order.push(card.id);
        inner.cards.insert(card.id, card.clone());
        Ok(())
    }

    async fn get_card(&self, id: Uuid) -> StoreResult<Option<Card>> {
        Ok(self.inner.read().await.cards.get(&id).cloned())
    }

    async fn update_card(&self, card: &Card) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        match inner.cards.get_mut(&card.id) {
            Some(slot) if slot.version == card.version => {
                *slot = card.clone();
                slot.version = card.version + 1;
                Ok(())
            }
            Some(_) => Err(StoreError::VersionConflict(card.id)),
            None => Err(StoreError::MissingCard(card.id)),
        }
    }

    async fn cards_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Card>> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.cards.get(id))
            .filter(|card| card.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn log_review(&self, record: &ReviewRecord) -> StoreResult<()> {
        self.inner.write().await.reviews.push(record.clone());
        Ok(())
    }

    async fn reviews_for_card(&self, card_id: Uuid) -> StoreResult<Vec<ReviewRecord>> {
        Ok(self
            .inner
            .read()
            .await
            .reviews
            .iter()
            .filter(|record| record.card_id == card_id)
            .cloned()
            .collect())
    }
}
