//! Shared fixtures for scheduler integration tests.
//!
//! All tests run against the bundled in-memory store; no external
//! services are required.

use std::sync::Arc;
use std::sync::Once;

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use parlons_scheduler::{
    Card, CardStatus, CardStore, InMemoryStore, NewCard, SchedulerService, VocabularyEntry,
};

pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub engine: SchedulerService,
}

impl TestContext {
    pub fn new() -> Self {
        init_tracing();
        let store = Arc::new(InMemoryStore::new());
        let engine = SchedulerService::new(store.clone());
        Self { store, engine }
    }
}

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// A minimal recognition card for `user_id`.
pub fn recognition_card(user_id: Uuid) -> NewCard {
    NewCard {
        user_id,
        card_type: "recognition".to_string(),
        front: json!({ "text": "bonjour" }),
        back: json!({ "text": "hello" }),
        source_type: "vocabulary".to_string(),
        source_id: "vocab-1".to_string(),
        level: "a1".to_string(),
        tags: Vec::new(),
    }
}

#[allow(dead_code)]
pub fn vocabulary_entry(example: Option<&str>) -> VocabularyEntry {
    VocabularyEntry {
        french: "fromage".to_string(),
        english: "cheese".to_string(),
        ipa: Some("fʁɔmaʒ".to_string()),
        example: example.map(str::to_string),
        level: "a2".to_string(),
    }
}

/// Rewrite a card's scheduling position directly in the store, for
/// seeding states the public API only reaches over real time.
#[allow(dead_code)]
pub async fn place_card(
    store: &InMemoryStore,
    card: &Card,
    status: CardStatus,
    next_review: Option<DateTime<Utc>>,
) -> Card {
    let mut placed = card.clone();
    placed.status = status;
    placed.next_review = next_review;
    store.update_card(&placed).await.unwrap();
    placed
}

/// Seed a day-scale review card with a known interval and ease.
#[allow(dead_code)]
pub async fn seed_review_card(
    store: &InMemoryStore,
    card: &Card,
    interval_days: f64,
    ease_factor: f64,
) -> Card {
    let mut placed = card.clone();
    placed.status = CardStatus::Review;
    placed.interval_days = interval_days;
    placed.ease_factor = ease_factor;
    placed.repetitions = 3;
    placed.next_review = Some(Utc::now());
    store.update_card(&placed).await.unwrap();
    placed
}
