//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed integration step only
//! - Seeded RNG only
//! - Stable iteration order (targets left to right)
//! - No rendering or platform dependencies

pub mod answers;
pub mod feedback;
pub mod pull;
pub mod resolve;
pub mod state;
pub mod tick;
pub mod trajectory;

pub use answers::{build_targets, correct_index, evaluate_shot, generate_values};
pub use feedback::{Feedback, FeedbackAction, FeedbackStep, Timer};
pub use pull::{PullController, Release};
pub use resolve::{clip_segment, extended_ray_end, resolve_target, segment_intersects_rect};
pub use state::{
    Drum, GameEvent, GuideLine, Operator, Projectile, ProjectileState, Question, Rect, ShotResult,
    Target, TargetLabel,
};
pub use tick::{Flight, SceneController};
pub use trajectory::{TrajectoryResult, integrate_step, launch_velocity, predict, sample_path};
