//! Spaced-repetition scheduling engine.
//!
//! Owns the lifecycle of review cards: creation (single or
//! vocabulary batch), due/new queries, review grading, suspension,
//! leech marking, statistics, and forecast projection.
//!
//! The engine is stateless between calls; all card state lives
//! behind the injected [`store::CardStore`] abstraction. The
//! grading math itself is the pure `srs-core` state machine.

pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use error::{EngineError, Result};
pub use models::{
    Card, ForecastDay, NewCard, ReviewOutcome, ReviewRecord, UserStats, VocabularyEntry,
    LEECH_TAG, VOCABULARY_SOURCE,
};
pub use service::{
    SchedulerService, DEFAULT_DUE_LIMIT, DEFAULT_FORECAST_DAYS, DEFAULT_NEW_LIMIT,
};
pub use store::{CardStore, InMemoryStore, StoreError};

// Algorithm types callers need at the operation boundary.
pub use srs_core::{CardStatus, Grade, SchedulerConfig};
