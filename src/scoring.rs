//! Scoring collaborator
//!
//! The scene controller only reports verdicts; whether a verdict completes a
//! streak is the scorer's call.

use serde::{Deserialize, Serialize};

/// Points for a correct answer
pub const POINTS_PER_CORRECT: u64 = 10;
/// Extra points awarded when a streak completes
pub const STREAK_BONUS: u64 = 25;

/// External scoring interface
pub trait Scorer {
    /// Record one verdict. Returns true if it completes a streak.
    fn record(&mut self, correct: bool) -> bool;
    /// Start a new round
    fn reset(&mut self);
}

/// Running totals for a round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub score: u64,
    pub correct: u32,
    pub attempts: u32,
    pub streak: u32,
    pub best_streak: u32,
}

impl ScoreSummary {
    /// Fraction of correct answers (0 when nothing has been attempted)
    pub fn accuracy(&self) -> f32 {
        if self.attempts == 0 {
            0.0
        } else {
            self.correct as f32 / self.attempts as f32
        }
    }
}

/// Counts consecutive correct answers; every `streak_length`-th one in a row
/// is a streak
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakScorer {
    pub streak_length: u32,
    summary: ScoreSummary,
}

impl StreakScorer {
    pub fn new(streak_length: u32) -> Self {
        Self {
            streak_length: streak_length.max(1),
            summary: ScoreSummary::default(),
        }
    }

    pub fn summary(&self) -> &ScoreSummary {
        &self.summary
    }
}

impl Scorer for StreakScorer {
    fn record(&mut self, correct: bool) -> bool {
        let s = &mut self.summary;
        s.attempts += 1;
        if !correct {
            s.streak = 0;
            return false;
        }

        s.correct += 1;
        s.streak += 1;
        s.best_streak = s.best_streak.max(s.streak);
        s.score += POINTS_PER_CORRECT;

        let streak = s.streak.is_multiple_of(self.streak_length);
        if streak {
            s.score += STREAK_BONUS;
            log::info!("Streak of {} reached", s.streak);
        }
        streak
    }

    fn reset(&mut self) {
        self.summary = ScoreSummary::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streak_every_nth_correct() {
        let mut scorer = StreakScorer::new(3);
        assert!(!scorer.record(true));
        assert!(!scorer.record(true));
        assert!(scorer.record(true));
        assert!(!scorer.record(true));
        assert_eq!(scorer.summary().streak, 4);
        assert_eq!(scorer.summary().score, 4 * POINTS_PER_CORRECT + STREAK_BONUS);
    }

    #[test]
    fn test_wrong_answer_breaks_streak() {
        let mut scorer = StreakScorer::new(2);
        scorer.record(true);
        assert!(!scorer.record(false));
        assert!(!scorer.record(true));
        assert!(scorer.record(true));
        let s = scorer.summary();
        assert_eq!(s.best_streak, 2);
        assert_eq!(s.attempts, 4);
        assert!((s.accuracy() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_reset_clears_totals() {
        let mut scorer = StreakScorer::new(2);
        scorer.record(true);
        scorer.reset();
        assert_eq!(scorer.summary(), &ScoreSummary::default());
        assert_eq!(scorer.summary().accuracy(), 0.0);
    }
}
