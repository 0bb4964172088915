//! Game settings and tuning
//!
//! Everything the simulation needs is handed to `SceneController::new`
//! explicitly. There is no process-wide "current topic" lookup.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SettingsError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SettingsError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Largest ± offset used when perturbing the answer into a distractor.
    /// Harder presets keep distractors closer to the answer.
    pub fn max_distractor_offset(&self) -> i64 {
        match self {
            Difficulty::Easy => 6,
            Difficulty::Normal => 3,
            Difficulty::Hard => 2,
        }
    }

    /// Consecutive correct answers needed for a celebration
    pub fn streak_length(&self) -> u32 {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Normal => 4,
            Difficulty::Hard => 5,
        }
    }
}

/// Question topic (arithmetic family)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Topic {
    #[default]
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Mixed,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Addition => "Addition",
            Topic::Subtraction => "Subtraction",
            Topic::Multiplication => "Multiplication",
            Topic::Division => "Division",
            Topic::Mixed => "Mixed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "addition" | "add" => Some(Topic::Addition),
            "subtraction" | "sub" => Some(Topic::Subtraction),
            "multiplication" | "mul" => Some(Topic::Multiplication),
            "division" | "div" => Some(Topic::Division),
            "mixed" => Some(Topic::Mixed),
            _ => None,
        }
    }

    /// Percent chance that a distractor is produced by ×2 / ×0.5 scaling
    /// instead of a ± offset
    pub fn scaling_chance(&self) -> u32 {
        match self {
            Topic::Addition | Topic::Subtraction => 15,
            Topic::Multiplication | Topic::Division => 60,
            Topic::Mixed => 35,
        }
    }
}

/// Launch and flight tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub max_pull_distance: f32,
    pub release_threshold: f32,
    pub grab_radius: f32,
    pub max_trajectory_distance: f32,
    pub power_multiplier: f32,
    pub gravity: f32,
    /// Integration step (shared by prediction and flight)
    pub dt: f32,
    pub max_steps: u32,
    pub ray_extension: f32,
    pub arrival_tolerance: f32,
    pub flight_steps_per_second: f32,
    pub max_substeps: u32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            max_pull_distance: MAX_PULL_DISTANCE,
            release_threshold: RELEASE_THRESHOLD,
            grab_radius: GRAB_RADIUS,
            max_trajectory_distance: MAX_TRAJECTORY_DISTANCE,
            power_multiplier: POWER_MULTIPLIER,
            gravity: GRAVITY,
            dt: TRAJECTORY_DT,
            max_steps: MAX_TRAJECTORY_STEPS,
            ray_extension: RAY_EXTENSION,
            arrival_tolerance: ARRIVAL_TOLERANCE,
            flight_steps_per_second: FLIGHT_STEPS_PER_SECOND,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

/// Play area in screen coordinates (y grows downward)
///
/// The side walls and the floor end a flight. The ceiling is open, so a
/// steep shot may arc above the view and fall back in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for PlayArea {
    fn default() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(1000.0, 800.0),
        }
    }
}

impl PlayArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
        }
    }

    /// True while a projectile at `pos` is still in play
    #[inline]
    pub fn in_play(&self, pos: Vec2) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y <= self.max.y
    }

    /// True if `pos` lies inside the visible rectangle
    pub fn contains(&self, pos: Vec2) -> bool {
        self.in_play(pos) && pos.y >= self.min.y
    }
}

/// Where the answer targets are placed for each question
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetLayout {
    /// Target centres, left to right. Exactly one per target.
    pub slots: Vec<Vec2>,
    /// Half width / half height of each target's bounding box
    pub half_extents: Vec2,
}

impl Default for TargetLayout {
    fn default() -> Self {
        Self {
            slots: vec![
                Vec2::new(250.0, 200.0),
                Vec2::new(500.0, 200.0),
                Vec2::new(750.0, 200.0),
            ],
            half_extents: Vec2::new(60.0, 50.0),
        }
    }
}

/// Delays (seconds) used to sequence shot feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackTiming {
    /// Correct answer, no streak: wait this long before requesting the next question
    pub next_question_delay: f32,
    /// Wrong answer or miss: wait this long before revealing the correct target
    pub reveal_delay: f32,
}

impl Default for FeedbackTiming {
    fn default() -> Self {
        Self {
            next_question_delay: 0.8,
            reveal_delay: 0.6,
        }
    }
}

/// Scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub topic: Topic,
    /// Seed for distractor generation and shuffling
    pub seed: u64,
    /// Questions consumed before the round completes
    pub questions_per_round: u32,
    pub streak_length: u32,
    pub max_distractor_offset: i64,

    /// Launch pivot and projectile rest position
    pub anchor: Vec2,
    pub play_area: PlayArea,
    pub physics: PhysicsTuning,
    pub layout: TargetLayout,
    pub feedback: FeedbackTiming,
}

impl Default for Settings {
    fn default() -> Self {
        let difficulty = Difficulty::Normal;
        Self {
            difficulty,
            topic: Topic::Addition,
            seed: 0x5EED,
            questions_per_round: 10,
            streak_length: difficulty.streak_length(),
            max_distractor_offset: difficulty.max_distractor_offset(),
            anchor: Vec2::new(500.0, 650.0),
            play_area: PlayArea::default(),
            physics: PhysicsTuning::default(),
            layout: TargetLayout::default(),
            feedback: FeedbackTiming::default(),
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset (applies preset defaults)
    pub fn from_preset(preset: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a difficulty preset (updates difficulty-dependent settings)
    pub fn apply_preset(&mut self, preset: Difficulty) {
        self.difficulty = preset;
        self.streak_length = preset.streak_length();
        self.max_distractor_offset = preset.max_distractor_offset();
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!(
            "Loaded settings: difficulty={}, topic={}",
            settings.difficulty.as_str(),
            settings.topic.as_str()
        );
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), SettingsError> {
        let p = &self.physics;
        if !(p.max_pull_distance > 0.0) {
            return Err(SettingsError::invalid("physics.max_pull_distance", "must be positive"));
        }
        if p.release_threshold < 0.0 || p.release_threshold >= p.max_pull_distance {
            return Err(SettingsError::invalid(
                "physics.release_threshold",
                format!("must be in [0, {})", p.max_pull_distance),
            ));
        }
        if !(p.dt > 0.0) {
            return Err(SettingsError::invalid("physics.dt", "must be positive"));
        }
        if p.max_steps == 0 {
            return Err(SettingsError::invalid("physics.max_steps", "must be at least 1"));
        }
        if !(p.flight_steps_per_second > 0.0) {
            return Err(SettingsError::invalid(
                "physics.flight_steps_per_second",
                "must be positive",
            ));
        }
        if p.max_substeps == 0 {
            return Err(SettingsError::invalid("physics.max_substeps", "must be at least 1"));
        }
        if self.play_area.min.x >= self.play_area.max.x
            || self.play_area.min.y >= self.play_area.max.y
        {
            return Err(SettingsError::invalid("play_area", "min must be below max"));
        }
        if !self.play_area.contains(self.anchor) {
            return Err(SettingsError::invalid("anchor", "must lie inside the play area"));
        }
        if self.layout.slots.len() != TARGETS_PER_QUESTION {
            return Err(SettingsError::invalid(
                "layout.slots",
                format!("expected {} slots, got {}", TARGETS_PER_QUESTION, self.layout.slots.len()),
            ));
        }
        if self.layout.half_extents.x <= 0.0 || self.layout.half_extents.y <= 0.0 {
            return Err(SettingsError::invalid("layout.half_extents", "must be positive"));
        }
        if self.questions_per_round == 0 {
            return Err(SettingsError::invalid("questions_per_round", "must be at least 1"));
        }
        if self.streak_length == 0 {
            return Err(SettingsError::invalid("streak_length", "must be at least 1"));
        }
        if self.max_distractor_offset < 1 {
            return Err(SettingsError::invalid("max_distractor_offset", "must be at least 1"));
        }
        Ok(())
    }
}
