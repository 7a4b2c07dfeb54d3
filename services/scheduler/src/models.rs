//! Card model and operation result types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use srs_core::{CardStatus, ScheduleState};

/// Tag appended when a card crosses the leech threshold.
pub const LEECH_TAG: &str = "leech";

/// Provenance tag for cards generated from vocabulary entries.
pub const VOCABULARY_SOURCE: &str = "vocabulary";

/// Drill-shape tags for the canonical vocabulary card set.
pub mod card_types {
    pub const PRODUCTION: &str = "production";
    pub const RECOGNITION: &str = "recognition";
    pub const AUDIO: &str = "audio";
    pub const CLOZE: &str = "cloze";
}

/// One schedulable unit of learning content.
///
/// `front`/`back` are opaque structured payloads; the engine stores
/// and returns them without ever interpreting their contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Drill shape (production, recognition, ...). Opaque to
    /// scheduling; used only for caller-side filtering.
    pub card_type: String,
    pub front: Value,
    pub back: Value,
    pub source_type: String,
    pub source_id: String,
    /// Curriculum/difficulty tag, opaque to scheduling.
    pub level: String,
    pub tags: Vec<String>,
    pub status: CardStatus,
    pub ease_factor: f64,
    pub interval_days: f64,
    pub repetitions: u32,
    pub lapses: u32,
    /// Due when now >= this value; `None` means due immediately.
    pub next_review: Option<DateTime<Utc>>,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub total_reviews: u32,
    pub correct_reviews: u32,
    pub created_at: DateTime<Utc>,
    /// Optimistic-concurrency token; incremented by the store on
    /// every successful update.
    #[serde(default)]
    pub version: u64,
}

impl Card {
    /// Whether the card should surface in due queries at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status.is_active() && self.next_review.map_or(true, |due| due <= now)
    }

    pub fn is_leech(&self) -> bool {
        self.tags.iter().any(|tag| tag == LEECH_TAG)
    }

    pub(crate) fn schedule_state(&self) -> ScheduleState {
        ScheduleState {
            status: self.status,
            ease_factor: self.ease_factor,
            interval_days: self.interval_days,
            repetitions: self.repetitions,
            lapses: self.lapses,
        }
    }

    pub(crate) fn apply_state(&mut self, state: &ScheduleState) {
        self.status = state.status;
        self.ease_factor = state.ease_factor;
        self.interval_days = state.interval_days;
        self.repetitions = state.repetitions;
        self.lapses = state.lapses;
    }
}

/// Input for creating a single card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub user_id: Uuid,
    pub card_type: String,
    pub front: Value,
    pub back: Value,
    pub source_type: String,
    pub source_id: String,
    pub level: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One vocabulary entry, expanded into a 3-4 card drill set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub french: String,
    pub english: String,
    pub ipa: Option<String>,
    /// Example sentence; when present, a cloze card is added.
    pub example: Option<String>,
    pub level: String,
}

/// Result of processing one review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub card: Card,
    pub next_review: DateTime<Utc>,
    /// Resulting interval in days; fractional while in learning.
    pub interval_days: f64,
}

/// Immutable record of one processed review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: Uuid,
    pub card_id: Uuid,
    pub user_id: Uuid,
    pub reviewed_at: DateTime<Utc>,
    pub grade: u8,
    /// Informational only; never enters scheduling math.
    pub time_spent_ms: Option<u32>,
    pub interval_before: f64,
    pub interval_after: f64,
    pub ease_before: f64,
    pub ease_after: f64,
}

/// Per-user scheduling statistics over non-suspended cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub new_count: usize,
    pub learning_count: usize,
    pub review_count: usize,
    pub due_today: usize,
    /// Correct-review ratio over cards touched in the last 7 days,
    /// as a percentage. 0 when no card qualifies.
    pub retention_7_days: f64,
    pub average_ease: f64,
}

/// One day of the review forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub new_cards: usize,
    pub review_cards: usize,
}
