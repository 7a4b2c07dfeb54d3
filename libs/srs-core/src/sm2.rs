//! SM-2-derived grading state machine.
//!
//! A card moves through four phases: `new` and `learning` cards walk
//! a sequence of minute-scale steps until they graduate to `review`,
//! where intervals are day-scale and grow multiplicatively. A failed
//! review drops a `review` card into `relearning`.
//!
//! [`schedule`] is a single pure dispatch over `(state, grade)`; it
//! never touches a clock or a store.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::types::{CardStatus, Grade};

const MINUTES_PER_DAY: f64 = 1440.0;
/// Step used when the learning-step table is empty.
const FALLBACK_STEP_MINUTES: f64 = 10.0;
/// Flat ease deduction applied on any failed review.
const LAPSE_EASE_PENALTY: f64 = 0.2;

/// Per-card scheduling state consumed and produced by [`schedule`].
///
/// `interval_days` is day-scale in `review`/`relearning` and a
/// fractional-day encoding of the current learning step otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleState {
    pub status: CardStatus,
    pub ease_factor: f64,
    pub interval_days: f64,
    /// Consecutive successful reviews since the last lapse.
    pub repetitions: u32,
    /// Lifetime failed reviews; never decreases.
    pub lapses: u32,
}

impl ScheduleState {
    /// State of a freshly created card.
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            status: CardStatus::New,
            ease_factor: config.initial_ease,
            interval_days: 0.0,
            repetitions: 0,
            lapses: 0,
        }
    }
}

/// Result of applying one grade to a card.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOutcome {
    pub state: ScheduleState,
    pub next_review: DateTime<Utc>,
    /// Resulting interval in days; fractional while in learning.
    pub interval_days: f64,
}

/// Apply one review grade to a card's scheduling state.
pub fn schedule(
    config: &SchedulerConfig,
    state: &ScheduleState,
    grade: Grade,
    now: DateTime<Utc>,
) -> ScheduleOutcome {
    let next = if grade.is_correct() {
        on_success(config, state, grade)
    } else {
        on_failure(config, state)
    };
    let next_review = next_review_at(config, &next, now);
    ScheduleOutcome {
        interval_days: next.interval_days,
        state: next,
        next_review,
    }
}

/// Interval in days that each grade on the 0-5 scale would produce,
/// without committing a review. Used for answer-button hints.
pub fn preview_intervals(
    config: &SchedulerConfig,
    state: &ScheduleState,
    now: DateTime<Utc>,
) -> [f64; 6] {
    Grade::ALL.map(|grade| schedule(config, state, grade, now).interval_days)
}

fn on_failure(config: &SchedulerConfig, state: &ScheduleState) -> ScheduleState {
    let (status, interval_days) = match state.status {
        CardStatus::New | CardStatus::Learning => (CardStatus::Learning, state.interval_days),
        CardStatus::Review | CardStatus::Relearning | CardStatus::Suspended => {
            (CardStatus::Relearning, 1.0)
        }
    };
    ScheduleState {
        status,
        interval_days,
        ease_factor: (state.ease_factor - LAPSE_EASE_PENALTY).max(config.minimum_ease),
        repetitions: 0,
        lapses: state.lapses + 1,
    }
}

fn on_success(config: &SchedulerConfig, state: &ScheduleState, grade: Grade) -> ScheduleState {
    match state.status {
        CardStatus::New | CardStatus::Learning => advance_learning(config, state, grade),
        CardStatus::Review | CardStatus::Relearning | CardStatus::Suspended => {
            advance_review(config, state, grade)
        }
    }
}

/// Walk the learning steps, or graduate to review.
///
/// Graduation happens on grade 5, on the final step, or when the
/// current interval no longer matches any step (the card has
/// outgrown the table).
fn advance_learning(
    config: &SchedulerConfig,
    state: &ScheduleState,
    grade: Grade,
) -> ScheduleState {
    let steps = &config.learning_steps_minutes;
    let interval_minutes = state.interval_days * MINUTES_PER_DAY;
    let next_step = steps
        .iter()
        .position(|step| *step >= interval_minutes)
        .map(|index| index + 1)
        .filter(|index| *index < steps.len());

    match next_step {
        Some(index) if grade != Grade::Easy => ScheduleState {
            status: CardStatus::Learning,
            interval_days: steps[index] / MINUTES_PER_DAY,
            ease_factor: state.ease_factor,
            repetitions: state.repetitions + 1,
            lapses: state.lapses,
        },
        _ => {
            let interval_days = if grade == Grade::Easy {
                config.easy_interval_days
            } else {
                config.graduating_interval_days
            };
            ScheduleState {
                status: CardStatus::Review,
                interval_days: interval_days.clamp(1.0, config.maximum_interval_days),
                ease_factor: state.ease_factor,
                repetitions: state.repetitions + 1,
                lapses: state.lapses,
            }
        }
    }
}

fn advance_review(config: &SchedulerConfig, state: &ScheduleState, grade: Grade) -> ScheduleState {
    let multiplier = match grade {
        Grade::Hard => config.hard_interval_modifier,
        Grade::Easy => state.ease_factor * config.easy_bonus,
        _ => state.ease_factor,
    };
    ScheduleState {
        status: CardStatus::Review,
        interval_days: (state.interval_days * multiplier)
            .round()
            .clamp(1.0, config.maximum_interval_days),
        ease_factor: adjusted_ease(config, state.ease_factor, grade),
        repetitions: state.repetitions + 1,
        lapses: state.lapses,
    }
}

/// Classic SM-2 ease adjustment:
/// `EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))`
/// which yields +0.10 for easy, +0.00 for good, -0.14 for hard.
fn adjusted_ease(config: &SchedulerConfig, ease: f64, grade: Grade) -> f64 {
    let q = f64::from(grade.value());
    let adjusted = ease + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));
    adjusted.max(config.minimum_ease)
}

/// Cards in a minute-scale phase come back after the learning step
/// indexed by their repetition count; review cards come back after
/// their interval in whole days.
fn next_review_at(
    config: &SchedulerConfig,
    state: &ScheduleState,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match state.status {
        CardStatus::Learning | CardStatus::Relearning => {
            let steps = &config.learning_steps_minutes;
            let index = (state.repetitions as usize).min(steps.len().saturating_sub(1));
            let minutes = steps.get(index).copied().unwrap_or(FALLBACK_STEP_MINUTES);
            now + Duration::minutes(minutes.round() as i64)
        }
        _ => now + Duration::days(state.interval_days.round() as i64),
    }
}
