//! Scheduler tuning parameters.

use serde::{Deserialize, Serialize};

/// All tunable parameters of the scheduling state machine.
///
/// The defaults reproduce the classic SM-2 values with Anki-style
/// learning steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    /// Ease factor assigned to freshly created cards.
    pub initial_ease: f64,
    /// Floor for the ease factor; no review can push it lower.
    pub minimum_ease: f64,
    /// Extra multiplier applied on top of ease for an easy review.
    pub easy_bonus: f64,
    /// Interval multiplier for a hard (grade 3) review.
    pub hard_interval_modifier: f64,
    /// Interval in days when a card graduates with grade 3-4.
    pub graduating_interval_days: f64,
    /// Interval in days when a card graduates with grade 5.
    pub easy_interval_days: f64,
    /// Hard ceiling on any review interval; keeps multiplicative
    /// growth inside the representable timestamp range.
    pub maximum_interval_days: f64,
    /// Minute-scale steps a card walks through before graduating.
    pub learning_steps_minutes: Vec<f64>,
    /// Lifetime lapse count at which a card is tagged as a leech.
    pub leech_threshold: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            easy_bonus: 1.3,
            hard_interval_modifier: 1.2,
            graduating_interval_days: 1.0,
            easy_interval_days: 4.0,
            maximum_interval_days: 36500.0,
            learning_steps_minutes: vec![1.0, 10.0, 60.0, 1440.0],
            leech_threshold: 8,
        }
    }
}
