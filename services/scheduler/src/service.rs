//! Scheduling engine operations.

use std::sync::Arc;

use chrono::{Duration, NaiveTime, Utc};
use serde_json::json;
use uuid::Uuid;

use srs_core::{schedule, CardStatus, Grade, SchedulerConfig};

use crate::error::{EngineError, Result};
use crate::models::{
    card_types, Card, ForecastDay, NewCard, ReviewOutcome, ReviewRecord, UserStats,
    VocabularyEntry, LEECH_TAG, VOCABULARY_SOURCE,
};
use crate::store::{CardStore, StoreError};

/// Default cap on the due-card queue.
pub const DEFAULT_DUE_LIMIT: usize = 50;
/// Default cap on the new-card queue.
pub const DEFAULT_NEW_LIMIT: usize = 20;
/// Default forecast horizon in days.
pub const DEFAULT_FORECAST_DAYS: usize = 7;

/// Spaced-repetition scheduling engine.
///
/// Stateless between calls; every operation is a single round-trip
/// against the injected store. Callers are expected to have
/// authorized `user_id` and validated grades upstream (the [`Grade`]
/// enum makes out-of-range values unrepresentable).
pub struct SchedulerService {
    store: Arc<dyn CardStore>,
    config: SchedulerConfig,
}

impl SchedulerService {
    pub fn new(store: Arc<dyn CardStore>) -> Self {
        Self::with_config(store, SchedulerConfig::default())
    }

    pub fn with_config(store: Arc<dyn CardStore>, config: SchedulerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Create a single card in `new` status, due immediately.
    pub async fn create_card(&self, new_card: NewCard) -> Result<Card> {
        let now = Utc::now();
        let card = Card {
            id: Uuid::new_v4(),
            user_id: new_card.user_id,
            card_type: new_card.card_type,
            front: new_card.front,
            back: new_card.back,
            source_type: new_card.source_type,
            source_id: new_card.source_id,
            level: new_card.level,
            tags: new_card.tags,
            status: CardStatus::New,
            ease_factor: self.config.initial_ease,
            interval_days: 0.0,
            repetitions: 0,
            lapses: 0,
            next_review: Some(now),
            last_reviewed: None,
            total_reviews: 0,
            correct_reviews: 0,
            created_at: now,
            version: 0,
        };
        self.store.insert_card(&card).await?;
        tracing::debug!(
            card_id = %card.id,
            user_id = %card.user_id,
            card_type = %card.card_type,
            "created card"
        );
        Ok(card)
    }

    /// Expand one vocabulary entry into its canonical drill set:
    /// production, recognition, audio, and a cloze card when an
    /// example sentence is available.
    pub async fn create_vocabulary_cards(
        &self,
        user_id: Uuid,
        vocabulary_id: &str,
        entry: &VocabularyEntry,
    ) -> Result<Vec<Card>> {
        let mut cards = Vec::with_capacity(4);
        for new_card in vocabulary_card_set(user_id, vocabulary_id, entry) {
            cards.push(self.create_card(new_card).await?);
        }
        tracing::info!(
            user_id = %user_id,
            vocabulary_id,
            count = cards.len(),
            "created vocabulary card set"
        );
        Ok(cards)
    }

    /// Cards due for review, ordered relearning < learning < review
    /// < new, then by due time. Suspended cards never surface.
    pub async fn due_cards(&self, user_id: Uuid, limit: Option<usize>) -> Result<Vec<Card>> {
        let now = Utc::now();
        let mut due: Vec<Card> = self
            .store
            .cards_for_user(user_id)
            .await?
            .into_iter()
            .filter(|card| card.is_due(now))
            .collect();
        due.sort_by(|a, b| {
            status_priority(a.status)
                .cmp(&status_priority(b.status))
                // None sorts first: a missing due time means due now.
                .then_with(|| a.next_review.cmp(&b.next_review))
        });
        due.truncate(limit.unwrap_or(DEFAULT_DUE_LIMIT));
        Ok(due)
    }

    /// Never-studied cards in creation order.
    pub async fn new_cards(&self, user_id: Uuid, limit: Option<usize>) -> Result<Vec<Card>> {
        let mut cards: Vec<Card> = self
            .store
            .cards_for_user(user_id)
            .await?
            .into_iter()
            .filter(|card| card.status == CardStatus::New)
            .collect();
        cards.sort_by_key(|card| card.created_at);
        cards.truncate(limit.unwrap_or(DEFAULT_NEW_LIMIT));
        Ok(cards)
    }

    /// Apply one grade to a card and persist the resulting state as
    /// a single versioned update, plus an immutable review-log
    /// entry. Concurrent reviews of the same card are serialized by
    /// the optimistic retry in [`Self::read_modify_write`].
    pub async fn process_review(
        &self,
        card_id: Uuid,
        grade: Grade,
        time_spent_ms: Option<u32>,
    ) -> Result<ReviewOutcome> {
        let now = Utc::now();
        let (card, (before, outcome)) = self
            .read_modify_write(card_id, |card| {
                let before = card.schedule_state();
                let outcome = schedule(&self.config, &before, grade, now);

                card.apply_state(&outcome.state);
                card.next_review = Some(outcome.next_review);
                card.last_reviewed = Some(now);
                card.total_reviews += 1;
                if grade.is_correct() {
                    card.correct_reviews += 1;
                } else if card.lapses >= self.config.leech_threshold && !card.is_leech() {
                    card.tags.push(LEECH_TAG.to_string());
                    tracing::warn!(card_id = %card.id, lapses = card.lapses, "card marked as leech");
                }
                (before, outcome)
            })
            .await?;

        let record = ReviewRecord {
            id: Uuid::new_v4(),
            card_id,
            user_id: card.user_id,
            reviewed_at: now,
            grade: grade.value(),
            time_spent_ms,
            interval_before: before.interval_days,
            interval_after: outcome.interval_days,
            ease_before: before.ease_factor,
            ease_after: outcome.state.ease_factor,
        };
        self.store.log_review(&record).await?;

        tracing::debug!(
            card_id = %card.id,
            grade = grade.value(),
            status = ?card.status,
            interval_days = outcome.interval_days,
            "processed review"
        );
        Ok(ReviewOutcome {
            next_review: outcome.next_review,
            interval_days: outcome.interval_days,
            card,
        })
    }

    /// Review log for one card, oldest first.
    pub async fn review_history(&self, card_id: Uuid) -> Result<Vec<ReviewRecord>> {
        self.store
            .get_card(card_id)
            .await?
            .ok_or(EngineError::CardNotFound(card_id))?;
        Ok(self.store.reviews_for_card(card_id).await?)
    }

    /// Remove a card from all queues until unsuspended. Valid from
    /// any status.
    pub async fn suspend_card(&self, card_id: Uuid) -> Result<()> {
        self.read_modify_write(card_id, |card| {
            card.status = CardStatus::Suspended;
        })
        .await?;
        tracing::info!(card_id = %card_id, "card suspended");
        Ok(())
    }

    /// Return a suspended card to circulation, forcing `review`
    /// status and making it immediately due. Whatever sub-state the
    /// card held before suspension is discarded.
    pub async fn unsuspend_card(&self, card_id: Uuid) -> Result<()> {
        let now = Utc::now();
        self.read_modify_write(card_id, |card| {
            card.status = CardStatus::Review;
            card.next_review = Some(now);
        })
        .await?;
        tracing::info!(card_id = %card_id, "card unsuspended");
        Ok(())
    }

    /// Optimistic-concurrency loop for card mutations: read the
    /// current record, apply the mutation, and attempt a versioned
    /// write; a version conflict means another writer landed first,
    /// so re-read and re-apply against the fresh state.
    async fn read_modify_write<T, F>(&self, card_id: Uuid, mut apply: F) -> Result<(Card, T)>
    where
        F: FnMut(&mut Card) -> T,
    {
        loop {
            let mut card = self
                .store
                .get_card(card_id)
                .await?
                .ok_or(EngineError::CardNotFound(card_id))?;
            let value = apply(&mut card);
            match self.store.update_card(&card).await {
                Ok(()) => {
                    card.version += 1;
                    return Ok((card, value));
                }
                Err(StoreError::VersionConflict(_)) => {
                    tracing::debug!(card_id = %card_id, "card update conflicted, retrying");
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    /// Aggregate statistics over a user's non-suspended cards.
    pub async fn stats(&self, user_id: Uuid) -> Result<UserStats> {
        let now = Utc::now();
        let cards: Vec<Card> = self
            .store
            .cards_for_user(user_id)
            .await?
            .into_iter()
            .filter(|card| card.status.is_active())
            .collect();

        let count_status =
            |status: CardStatus| cards.iter().filter(|card| card.status == status).count();

        let average_ease = if cards.is_empty() {
            self.config.initial_ease
        } else {
            let sum: f64 = cards.iter().map(|card| card.ease_factor).sum();
            round2(sum / cards.len() as f64)
        };

        let window = now - Duration::days(7);
        let (total, correct) = cards
            .iter()
            .filter(|card| {
                card.total_reviews > 0 && card.last_reviewed.map_or(false, |at| at >= window)
            })
            .fold((0u64, 0u64), |(total, correct), card| {
                (
                    total + u64::from(card.total_reviews),
                    correct + u64::from(card.correct_reviews),
                )
            });
        let retention_7_days = if total == 0 {
            0.0
        } else {
            round2(correct as f64 / total as f64 * 100.0)
        };

        Ok(UserStats {
            new_count: count_status(CardStatus::New),
            learning_count: count_status(CardStatus::Learning),
            review_count: count_status(CardStatus::Review),
            due_today: cards.iter().filter(|card| card.is_due(now)).count(),
            retention_7_days,
            average_ease,
        })
    }

    /// Per-day due counts for the next `days` calendar days,
    /// midnight-aligned, starting today. Always returns exactly
    /// `days` entries in chronological order.
    pub async fn forecast(&self, user_id: Uuid, days: Option<usize>) -> Result<Vec<ForecastDay>> {
        let days = days.unwrap_or(DEFAULT_FORECAST_DAYS);
        let cards: Vec<Card> = self
            .store
            .cards_for_user(user_id)
            .await?
            .into_iter()
            .filter(|card| card.status.is_active())
            .collect();

        let today = Utc::now().date_naive();
        let mut projection = Vec::with_capacity(days);
        for offset in 0..days {
            let date = today + Duration::days(offset as i64);
            let start = date.and_time(NaiveTime::MIN).and_utc();
            let end = start + Duration::days(1);

            let mut new_cards = 0;
            let mut review_cards = 0;
            for card in &cards {
                let due_in_day = card
                    .next_review
                    .map_or(false, |due| due >= start && due < end);
                if due_in_day {
                    if card.status == CardStatus::New {
                        new_cards += 1;
                    } else {
                        review_cards += 1;
                    }
                }
            }
            projection.push(ForecastDay {
                date,
                new_cards,
                review_cards,
            });
        }
        Ok(projection)
    }
}

/// Queue ordering: relearning surfaces first, brand-new cards last.
fn status_priority(status: CardStatus) -> u8 {
    match status {
        CardStatus::Relearning => 0,
        CardStatus::Learning => 1,
        CardStatus::Review => 2,
        CardStatus::New => 3,
        CardStatus::Suspended => 4,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Canonical card set for one vocabulary entry.
fn vocabulary_card_set(
    user_id: Uuid,
    vocabulary_id: &str,
    entry: &VocabularyEntry,
) -> Vec<NewCard> {
    let base = |card_type: &str, front: serde_json::Value, back: serde_json::Value| NewCard {
        user_id,
        card_type: card_type.to_string(),
        front,
        back,
        source_type: VOCABULARY_SOURCE.to_string(),
        source_id: vocabulary_id.to_string(),
        level: entry.level.clone(),
        tags: Vec::new(),
    };

    let mut cards = vec![
        base(
            card_types::PRODUCTION,
            json!({ "text": entry.english }),
            json!({ "text": entry.french, "ipa": entry.ipa }),
        ),
        base(
            card_types::RECOGNITION,
            json!({ "text": entry.french }),
            json!({ "text": entry.english }),
        ),
        base(
            card_types::AUDIO,
            json!({ "audio": entry.french, "ipa": entry.ipa }),
            json!({ "text": entry.french, "translation": entry.english }),
        ),
    ];

    if let Some(example) = &entry.example {
        cards.push(base(
            card_types::CLOZE,
            json!({ "text": example.replace(&entry.french, "___") }),
            json!({ "text": entry.french, "example": example }),
        ));
    }

    cards
}
