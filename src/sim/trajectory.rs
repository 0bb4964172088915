//! Launch velocity and landing point prediction
//!
//! Slingshot semantics: the shot leaves opposite to the pull. Prediction is a
//! pure fixed-step integration so the same steps can be replayed in flight and
//! land on exactly the predicted point.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::{PhysicsTuning, PlayArea};

/// Output of a prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryResult {
    pub landing_point: Vec2,
    pub launch_velocity: Vec2,
    /// Landing point is not above the anchor; the shot must not be fired
    pub rejected: bool,
    /// Integration steps from the anchor to the landing point
    pub steps: u32,
}

/// Launch velocity for a pull vector
pub fn launch_velocity(pull: Vec2, tuning: &PhysicsTuning) -> Vec2 {
    let direction = -pull.normalize_or_zero();
    let power = (pull.length() / tuning.max_pull_distance).min(1.0);
    let angle = (-pull.y).atan2(-pull.x);
    // Steeper shots lose more range to gravity
    let gravity_compensation = 1.0 + 0.5 * angle.sin().abs();
    let speed =
        power * tuning.max_trajectory_distance * tuning.power_multiplier * gravity_compensation;
    direction * speed
}

/// Advance one integration step: gravity first, then position
#[inline]
pub fn integrate_step(position: Vec2, velocity: Vec2, gravity: f32, dt: f32) -> (Vec2, Vec2) {
    let velocity = Vec2::new(velocity.x, velocity.y + gravity * dt);
    (position + velocity * dt, velocity)
}

/// Predict where a shot from `anchor` with `pull` comes to rest
///
/// Integration stops when the next position would leave play or the step
/// budget runs out; the last in-play position is the landing point.
pub fn predict(
    anchor: Vec2,
    pull: Vec2,
    tuning: &PhysicsTuning,
    area: &PlayArea,
) -> TrajectoryResult {
    let launch = launch_velocity(pull, tuning);

    let mut position = anchor;
    let mut velocity = launch;
    let mut steps = 0;
    while steps < tuning.max_steps {
        let (next_pos, next_vel) = integrate_step(position, velocity, tuning.gravity, tuning.dt);
        if !area.in_play(next_pos) {
            break;
        }
        position = next_pos;
        velocity = next_vel;
        steps += 1;
    }

    // Screen space: "above" the anchor means a smaller y
    let rejected = position.y >= anchor.y;
    log::trace!(
        "predict pull=({:.1}, {:.1}) -> landing=({:.1}, {:.1}) steps={} rejected={}",
        pull.x,
        pull.y,
        position.x,
        position.y,
        steps,
        rejected
    );

    TrajectoryResult {
        landing_point: position,
        launch_velocity: launch,
        rejected,
        steps,
    }
}

/// Sample the predicted arc every `stride` steps, anchor first, landing last
pub fn sample_path(
    anchor: Vec2,
    result: &TrajectoryResult,
    tuning: &PhysicsTuning,
    stride: u32,
) -> Vec<Vec2> {
    let stride = stride.max(1);
    let mut points = Vec::with_capacity((result.steps / stride) as usize + 2);
    points.push(anchor);

    let mut position = anchor;
    let mut velocity = result.launch_velocity;
    for i in 1..=result.steps {
        (position, velocity) = integrate_step(position, velocity, tuning.gravity, tuning.dt);
        if i % stride == 0 && i != result.steps {
            points.push(position);
        }
    }
    if result.steps > 0 {
        points.push(result.landing_point);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ANCHOR: Vec2 = Vec2::new(500.0, 400.0);

    fn tuning() -> PhysicsTuning {
        PhysicsTuning::default()
    }

    #[test]
    fn test_launch_opposes_pull() {
        let v = launch_velocity(Vec2::new(-30.0, 40.0), &tuning());
        assert!(v.x > 0.0);
        assert!(v.y < 0.0);
        assert!(v.normalize().dot(Vec2::new(0.6, -0.8)) > 0.9999);
    }

    #[test]
    fn test_power_caps_at_full_pull() {
        let t = tuning();
        let full = launch_velocity(Vec2::new(100.0, 0.0), &t);
        let over = launch_velocity(Vec2::new(250.0, 0.0), &t);
        assert!((full.length() - over.length()).abs() < 1e-3);
        // Horizontal shot: no gravity compensation
        let expected = t.max_trajectory_distance * t.power_multiplier;
        assert!((full.length() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_steep_shots_get_boost() {
        let t = tuning();
        let flat = launch_velocity(Vec2::new(80.0, 0.0), &t).length();
        let steep = launch_velocity(Vec2::new(0.0, 80.0), &t).length();
        assert!((steep / flat - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_straight_up_shot_is_rejected() {
        // Pull straight down: launches straight up, falls back through the floor
        let result = predict(ANCHOR, Vec2::new(0.0, 80.0), &tuning(), &PlayArea::default());
        assert!(result.launch_velocity.y < 0.0);
        assert!(result.launch_velocity.x.abs() < 1e-4);
        assert!(result.rejected);
        assert!(result.landing_point.y >= ANCHOR.y);
    }

    #[test]
    fn test_up_left_shot_is_accepted() {
        let result = predict(ANCHOR, Vec2::new(60.0, 30.0), &tuning(), &PlayArea::default());
        assert!(!result.rejected);
        assert!(result.landing_point.y < ANCHOR.y);
        // Left via the left wall
        assert!(result.landing_point.x < 50.0);
    }

    #[test]
    fn test_downward_shot_is_rejected() {
        let result = predict(ANCHOR, Vec2::new(60.0, -30.0), &tuning(), &PlayArea::default());
        assert!(result.rejected);
    }

    #[test]
    fn test_step_budget_keeps_last_point() {
        let mut t = tuning();
        t.max_steps = 3;
        let result = predict(ANCHOR, Vec2::new(60.0, 30.0), &t, &PlayArea::default());
        assert_eq!(result.steps, 3);
        let mut pos = ANCHOR;
        let mut vel = result.launch_velocity;
        for _ in 0..3 {
            (pos, vel) = integrate_step(pos, vel, t.gravity, t.dt);
        }
        assert_eq!(result.landing_point, pos);
    }

    #[test]
    fn test_sample_path_ends_at_landing() {
        let t = tuning();
        let result = predict(ANCHOR, Vec2::new(60.0, 30.0), &t, &PlayArea::default());
        let path = sample_path(ANCHOR, &result, &t, 5);
        assert_eq!(path.first(), Some(&ANCHOR));
        assert_eq!(path.last(), Some(&result.landing_point));
        assert!(path.len() >= 3);
    }

    proptest! {
        #[test]
        fn prop_prediction_is_pure(dx in -150.0f32..150.0, dy in -150.0f32..150.0) {
            let t = tuning();
            let area = PlayArea::default();
            let a = predict(ANCHOR, Vec2::new(dx, dy), &t, &area);
            let b = predict(ANCHOR, Vec2::new(dx, dy), &t, &area);
            prop_assert_eq!(a.landing_point.x.to_bits(), b.landing_point.x.to_bits());
            prop_assert_eq!(a.landing_point.y.to_bits(), b.landing_point.y.to_bits());
            prop_assert_eq!(a.launch_velocity.x.to_bits(), b.launch_velocity.x.to_bits());
            prop_assert_eq!(a.launch_velocity.y.to_bits(), b.launch_velocity.y.to_bits());
            prop_assert_eq!(a.rejected, b.rejected);
            prop_assert_eq!(a.steps, b.steps);
        }

        #[test]
        fn prop_rejection_matches_landing_height(dx in -100.0f32..100.0, dy in -100.0f32..100.0) {
            let result = predict(ANCHOR, Vec2::new(dx, dy), &tuning(), &PlayArea::default());
            prop_assert_eq!(result.rejected, result.landing_point.y >= ANCHOR.y);
        }
    }
}
