//! Shared scheduling types.

use serde::{Deserialize, Serialize};

use crate::error::GradeError;

/// Card scheduling status.
///
/// `Suspended` is a side channel: it is set and cleared by explicit
/// suspend/unsuspend operations, never by grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    New,
    Learning,
    Review,
    Relearning,
    Suspended,
}

impl Default for CardStatus {
    fn default() -> Self {
        Self::New
    }
}

impl CardStatus {
    /// Whether the card participates in due/new queries and stats.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Suspended)
    }
}

/// Recall quality reported by the learner after one attempt.
///
/// Grades below [`Grade::Hard`] count as failures; the `< 3`
/// threshold drives all lapse branching and must not move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// 0: complete blackout, no recall.
    Blackout,
    /// 1: wrong, recalled only after seeing the answer.
    Wrong,
    /// 2: wrong, but the answer felt familiar.
    Familiar,
    /// 3: correct with serious difficulty.
    Hard,
    /// 4: correct after hesitation.
    Good,
    /// 5: perfect, instant recall.
    Easy,
}

impl Grade {
    /// All grades in ascending order.
    pub const ALL: [Grade; 6] = [
        Self::Blackout,
        Self::Wrong,
        Self::Familiar,
        Self::Hard,
        Self::Good,
        Self::Easy,
    ];

    /// Numeric value on the 0-5 scale.
    pub fn value(self) -> u8 {
        match self {
            Self::Blackout => 0,
            Self::Wrong => 1,
            Self::Familiar => 2,
            Self::Hard => 3,
            Self::Good => 4,
            Self::Easy => 5,
        }
    }

    /// Parse from the 0-5 scale.
    pub fn from_value(value: u8) -> Result<Self, GradeError> {
        match value {
            0 => Ok(Self::Blackout),
            1 => Ok(Self::Wrong),
            2 => Ok(Self::Familiar),
            3 => Ok(Self::Hard),
            4 => Ok(Self::Good),
            5 => Ok(Self::Easy),
            _ => Err(GradeError::OutOfRange { value }),
        }
    }

    /// Grades 3-5 are successful recalls.
    pub fn is_correct(self) -> bool {
        self.value() >= 3
    }
}

impl TryFrom<u8> for Grade {
    type Error = GradeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn grade_round_trips_through_value() {
        for grade in Grade::ALL {
            assert_eq!(Grade::from_value(grade.value()), Ok(grade));
        }
    }

    #[test]
    fn out_of_range_grade_is_rejected() {
        assert_eq!(
            Grade::from_value(6),
            Err(GradeError::OutOfRange { value: 6 })
        );
    }

    #[test]
    fn failure_threshold_sits_below_hard() {
        assert!(!Grade::Familiar.is_correct());
        assert!(Grade::Hard.is_correct());
    }

    #[test]
    fn suspended_is_not_active() {
        assert!(CardStatus::Relearning.is_active());
        assert!(!CardStatus::Suspended.is_active());
    }
}
