//! Pointer drag handling around the launch anchor
//!
//! Fully driven by input events: nothing here runs on the frame tick.

use glam::Vec2;

use super::state::{Projectile, ProjectileState};
use crate::clamp_length;
use crate::settings::PhysicsTuning;

/// What a release produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// Pull too short; back to idle, no shot
    Cancelled,
    /// Pull long enough to hand to the trajectory predictor
    Pulled(Vec2),
}

/// Tracks the current pull vector while dragging
#[derive(Debug, Clone)]
pub struct PullController {
    anchor: Vec2,
    max_pull_distance: f32,
    release_threshold: f32,
    grab_radius: f32,
    pull: Option<Vec2>,
}

impl PullController {
    pub fn new(anchor: Vec2, tuning: &PhysicsTuning) -> Self {
        Self {
            anchor,
            max_pull_distance: tuning.max_pull_distance,
            release_threshold: tuning.release_threshold,
            grab_radius: tuning.grab_radius,
            pull: None,
        }
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// Current pull vector (only while dragging)
    pub fn pull(&self) -> Option<Vec2> {
        self.pull
    }

    /// True if `pointer` is close enough to grab the projectile
    pub fn can_grab(&self, projectile: &Projectile, pointer: Vec2) -> bool {
        pointer.distance(projectile.position) <= self.grab_radius
            || pointer.distance(self.anchor) <= self.grab_radius
    }

    /// Start a drag. No-op unless the projectile is idle and within grab range.
    pub fn begin_drag(&mut self, projectile: &mut Projectile, pointer: Vec2) -> bool {
        if projectile.state != ProjectileState::Idle || !self.can_grab(projectile, pointer) {
            return false;
        }
        projectile.state = ProjectileState::Dragging;
        self.pull = Some(Vec2::ZERO);
        true
    }

    /// Recompute the clamped pull from the pointer. No-op unless dragging.
    pub fn update_drag(&mut self, projectile: &mut Projectile, pointer: Vec2) -> Option<Vec2> {
        if projectile.state != ProjectileState::Dragging {
            return None;
        }
        let pull = clamp_length(pointer - self.anchor, self.max_pull_distance);
        self.pull = Some(pull);
        projectile.position = self.anchor + pull;
        Some(pull)
    }

    /// Finish a drag. Returns `None` when not dragging.
    ///
    /// A cancel puts the projectile back at rest. A long enough pull leaves
    /// the projectile in `Dragging` for the caller to launch or refuse.
    pub fn end_drag(&mut self, projectile: &mut Projectile) -> Option<Release> {
        if projectile.state != ProjectileState::Dragging {
            return None;
        }
        let pull = self.pull.take().unwrap_or(Vec2::ZERO);
        if pull.length() < self.release_threshold {
            projectile.reset_to(self.anchor);
            return Some(Release::Cancelled);
        }
        Some(Release::Pulled(pull))
    }

    /// Drop any pull in progress
    pub fn clear(&mut self) {
        self.pull = None;
    }
}
