//! Sling Quiz - slingshot aiming core for an answer-selection minigame
//!
//! Core modules:
//! - `sim`: Deterministic simulation (pull, trajectory, target resolution, shot lifecycle)
//! - `settings`: Explicit configuration passed into the scene controller
//! - `scoring`: Bundled streak scorer used as the external scoring collaborator

pub mod scoring;
pub mod settings;
pub mod sim;

pub use scoring::{Scorer, StreakScorer};
pub use settings::{Difficulty, Settings, SettingsError, Topic};

use glam::Vec2;

/// Gameplay constants (defaults for `settings::PhysicsTuning`)
pub mod consts {
    /// Maximum distance the projectile can be pulled from the anchor
    pub const MAX_PULL_DISTANCE: f32 = 100.0;
    /// Pulls shorter than this on release are treated as a cancel
    pub const RELEASE_THRESHOLD: f32 = 10.0;
    /// Pointer must land this close to the projectile or anchor to grab it
    pub const GRAB_RADIUS: f32 = 60.0;

    /// Nominal reach of a full-power shot
    pub const MAX_TRAJECTORY_DISTANCE: f32 = 600.0;
    pub const POWER_MULTIPLIER: f32 = 0.5;
    /// Downward acceleration (screen space, y grows downward)
    pub const GRAVITY: f32 = 60.0;

    /// Integration step for trajectory prediction and flight
    pub const TRAJECTORY_DT: f32 = 0.1;
    /// Step budget for a single prediction
    pub const MAX_TRAJECTORY_STEPS: u32 = 200;

    /// How far past the landing point the target ray is extended
    pub const RAY_EXTENSION: f32 = 1000.0;
    /// Projectile counts as arrived within this distance of the landing point
    pub const ARRIVAL_TOLERANCE: f32 = 5.0;

    /// Integration steps replayed per second of real time while flying
    pub const FLIGHT_STEPS_PER_SECOND: f32 = 30.0;
    /// Maximum integration steps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame time fed to the tick (seconds); longer frames are clamped
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Targets per question (one correct, two distractors)
    pub const TARGETS_PER_QUESTION: usize = 3;
}

/// Clamp a vector's magnitude to `max_len`, preserving its direction
#[inline]
pub fn clamp_length(v: Vec2, max_len: f32) -> Vec2 {
    let len = v.length();
    if len > max_len && len > 0.0 {
        v * (max_len / len)
    } else {
        v
    }
}

/// Angle of a vector in radians, measured from +x
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}
