//! Scene state and core simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Projectile lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectileState {
    /// At rest on the anchor, waiting for a grab
    #[default]
    Idle,
    /// Being pulled back by the pointer
    Dragging,
    /// Released and following its predicted trajectory
    Flying,
}

/// The single projectile of a scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians, aligned with velocity while flying
    pub rotation: f32,
    pub scale: f32,
    pub state: ProjectileState,
}

impl Projectile {
    pub fn new(rest: Vec2) -> Self {
        Self {
            position: rest,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
            state: ProjectileState::Idle,
        }
    }

    /// Put the projectile back at rest without recreating it
    pub fn reset_to(&mut self, rest: Vec2) {
        self.position = rest;
        self.velocity = Vec2::ZERO;
        self.rotation = 0.0;
        self.scale = 1.0;
        self.state = ProjectileState::Idle;
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// Drum visual of a target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drum {
    pub position: Vec2,
    /// Hit flash intensity (0-1), set on hit
    pub flash: f32,
}

/// Number label shown on a target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetLabel {
    pub text: String,
    /// Set when the label is relabelled to reveal the correct answer
    pub revealed: bool,
}

/// One candidate answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub position: Vec2,
    pub bounds: Rect,
    pub value: i64,
    pub is_correct: bool,
    pub is_hit: bool,
    pub drum: Drum,
    pub label: TargetLabel,
}

impl Target {
    pub fn new(position: Vec2, half_extents: Vec2, value: i64, is_correct: bool) -> Self {
        Self {
            position,
            bounds: Rect::from_center(position, half_extents),
            value,
            is_correct,
            is_hit: false,
            drum: Drum {
                position,
                flash: 0.0,
            },
            label: TargetLabel {
                text: value.to_string(),
                revealed: false,
            },
        }
    }

    /// Mark the target hit. Returns false if it already was.
    pub fn mark_hit(&mut self) -> bool {
        if self.is_hit {
            return false;
        }
        self.is_hit = true;
        self.drum.flash = 1.0;
        true
    }

    /// Relabel as the correct answer (no physics involved)
    pub fn reveal(&mut self) {
        self.label.revealed = true;
        self.label.text = format!("{} \u{2713}", self.value);
    }
}

/// Arithmetic operator of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '\u{d7}',
            Operator::Div => '\u{f7}',
        }
    }
}

/// A question supplied by the question-selection collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub operand1: i64,
    pub operand2: i64,
    pub operator: Operator,
    pub answer: i64,
}

impl Question {
    /// Build a question with its answer computed. Division is integer
    /// division and yields `None` for a zero divisor.
    pub fn evaluate(operand1: i64, operand2: i64, operator: Operator) -> Option<Self> {
        let answer = match operator {
            Operator::Add => operand1.checked_add(operand2)?,
            Operator::Sub => operand1.checked_sub(operand2)?,
            Operator::Mul => operand1.checked_mul(operand2)?,
            Operator::Div => operand1.checked_div(operand2)?,
        };
        Some(Self {
            operand1,
            operand2,
            operator,
            answer,
        })
    }

    pub fn prompt(&self) -> String {
        format!("{} {} {}", self.operand1, self.operator.symbol(), self.operand2)
    }
}

/// Outcome of a single shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotResult {
    /// Index into the target batch, `None` for a miss
    pub target_index: Option<usize>,
    pub is_correct: bool,
}

/// Guide line description for the renderer while aiming
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideLine {
    pub anchor: Vec2,
    pub landing_point: Vec2,
    /// Unit direction anchor → landing (zero if degenerate)
    pub direction: Vec2,
    /// Release would be refused by the forward-shot policy
    pub rejected: bool,
}

/// Signals emitted to external collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    QuestionLoaded { batch: u32 },
    DragStarted,
    DragCancelled,
    TrajectoryRejected { landing_point: Vec2 },
    Launched { velocity: Vec2, landing_point: Vec2 },
    Landed { position: Vec2 },
    ShotResolved(ShotResult),
    /// Streak reached: host runs its celebration, then calls `finish_celebration`
    CelebrationStarted,
    CorrectRevealed { target_index: usize },
    /// Host shows a continue button, then calls `continue_after_reveal`
    ContinuePrompted,
    /// Question consumed, request the next one
    RequestNextQuestion,
    /// Round complete, request game-over
    RoundComplete,
}
