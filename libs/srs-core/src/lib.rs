//! Core spaced-repetition scheduling library.
//!
//! Provides:
//! - The SM-2-derived grading state machine ([`sm2::schedule`])
//! - Scheduler configuration with all tunable parameters
//! - Shared types (`CardStatus`, `Grade`, `ScheduleState`)
//!
//! The library is pure: no I/O, no clock access. Callers pass `now`
//! explicitly, which keeps every transition deterministic and
//! unit-testable.

pub mod config;
pub mod error;
pub mod sm2;
pub mod types;

pub use config::SchedulerConfig;
pub use error::GradeError;
pub use sm2::{preview_intervals, schedule, ScheduleOutcome, ScheduleState};
pub use types::{CardStatus, Grade};
