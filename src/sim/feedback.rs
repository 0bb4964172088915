//! Post-shot feedback sequencing
//!
//! hit → (celebrate | wait) → next question, or
//! hit/miss → wait → reveal → continue → next question.
//!
//! Each step is a named state holding at most one timer. Cancelling replaces
//! the step, so no earlier timer can outlive a reset. Every step records the
//! batch it was scheduled for and is dropped if that batch is gone.

/// Countdown advanced by the frame tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timer {
    remaining: f32,
}

impl Timer {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }

    /// Advance by `dt`; returns true once expired
    pub fn advance(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

/// Current feedback step
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FeedbackStep {
    /// Nothing pending; shots are accepted
    #[default]
    Idle,
    /// Correct answer: request the next question when the timer expires
    AwaitNext { batch: u32, timer: Timer },
    /// Streak celebration handed to the host
    Celebrating { batch: u32 },
    /// Wrong answer or miss: reveal the correct target when the timer expires
    AwaitReveal { batch: u32, timer: Timer },
    /// Correct target revealed; waiting for the user to continue
    AwaitContinue { batch: u32 },
    /// Question consumed; waiting for the host to load the next one
    Finished { batch: u32 },
}

impl FeedbackStep {
    fn batch(&self) -> Option<u32> {
        match *self {
            FeedbackStep::Idle => None,
            FeedbackStep::AwaitNext { batch, .. }
            | FeedbackStep::Celebrating { batch }
            | FeedbackStep::AwaitReveal { batch, .. }
            | FeedbackStep::AwaitContinue { batch }
            | FeedbackStep::Finished { batch } => Some(batch),
        }
    }
}

/// What an expiring or completed step asks the controller to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackAction {
    /// Consume the question and request the next one
    Advance,
    /// Relabel the correct target and prompt for continue
    Reveal,
}

/// Owner of the single pending feedback step
#[derive(Debug, Clone, Default)]
pub struct Feedback {
    step: FeedbackStep,
}

impl Feedback {
    pub fn step(&self) -> FeedbackStep {
        self.step
    }

    /// True while a shot's feedback is in progress (drags are refused)
    pub fn is_pending(&self) -> bool {
        self.step != FeedbackStep::Idle
    }

    /// True if a timer needs the frame tick
    pub fn has_timer(&self) -> bool {
        matches!(
            self.step,
            FeedbackStep::AwaitNext { .. } | FeedbackStep::AwaitReveal { .. }
        )
    }

    pub fn schedule_correct(&mut self, batch: u32, streak: bool, delay: f32) {
        self.step = if streak {
            FeedbackStep::Celebrating { batch }
        } else {
            FeedbackStep::AwaitNext {
                batch,
                timer: Timer::new(delay),
            }
        };
    }

    pub fn schedule_incorrect(&mut self, batch: u32, reveal_delay: f32) {
        self.step = FeedbackStep::AwaitReveal {
            batch,
            timer: Timer::new(reveal_delay),
        };
    }

    /// Advance the pending timer. Steps scheduled for another batch are dropped.
    pub fn advance(&mut self, dt: f32, current_batch: u32) -> Option<FeedbackAction> {
        if let Some(batch) = self.step.batch() {
            if batch != current_batch {
                log::debug!("Dropping stale feedback step for batch {}", batch);
                self.step = FeedbackStep::Idle;
                return None;
            }
        }

        let (next, action) = match &mut self.step {
            FeedbackStep::AwaitNext { batch, timer } => {
                if !timer.advance(dt) {
                    return None;
                }
                (FeedbackStep::Finished { batch: *batch }, FeedbackAction::Advance)
            }
            FeedbackStep::AwaitReveal { batch, timer } => {
                if !timer.advance(dt) {
                    return None;
                }
                (FeedbackStep::AwaitContinue { batch: *batch }, FeedbackAction::Reveal)
            }
            _ => return None,
        };
        self.step = next;
        Some(action)
    }

    /// Host finished its celebration
    pub fn finish_celebration(&mut self, current_batch: u32) -> Option<FeedbackAction> {
        match self.step {
            FeedbackStep::Celebrating { batch } if batch == current_batch => {
                self.step = FeedbackStep::Finished { batch };
                Some(FeedbackAction::Advance)
            }
            _ => None,
        }
    }

    /// User pressed continue after the reveal
    pub fn continue_after_reveal(&mut self, current_batch: u32) -> Option<FeedbackAction> {
        match self.step {
            FeedbackStep::AwaitContinue { batch } if batch == current_batch => {
                self.step = FeedbackStep::Finished { batch };
                Some(FeedbackAction::Advance)
            }
            _ => None,
        }
    }

    /// Cancel whatever is pending
    pub fn cancel(&mut self) {
        if self.is_pending() {
            log::debug!("Cancelling feedback step {:?}", self.step);
        }
        self.step = FeedbackStep::Idle;
    }
}
