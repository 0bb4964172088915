//! Target resolution for a fired shot
//!
//! The shot is tested along the whole ray anchor → landing point, extended
//! well past the landing point, so a path that crosses a target counts even
//! if the exact physics would have fallen short of it.

use glam::Vec2;

use super::state::{Rect, Target};

/// Liang–Barsky clip of segment `p0 → p1` against `rect`
///
/// Returns the clipped parameter range `(t_min, t_max)` within `[0, 1]`, or
/// `None` if the segment misses the rectangle.
pub fn clip_segment(p0: Vec2, p1: Vec2, rect: &Rect) -> Option<(f32, f32)> {
    let d = p1 - p0;
    // (p, q) per half-plane: left, right, top, bottom
    let constraints = [
        (-d.x, p0.x - rect.min.x),
        (d.x, rect.max.x - p0.x),
        (-d.y, p0.y - rect.min.y),
        (d.y, rect.max.y - p0.y),
    ];

    let mut t_min = 0.0f32;
    let mut t_max = 1.0f32;
    for (p, q) in constraints {
        if p == 0.0 {
            // Parallel to this edge: reject if outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t_min = t_min.max(t);
        } else {
            t_max = t_max.min(t);
        }
        if t_min > t_max {
            return None;
        }
    }
    Some((t_min, t_max))
}

/// True if segment `p0 → p1` touches `rect`
#[inline]
pub fn segment_intersects_rect(p0: Vec2, p1: Vec2, rect: &Rect) -> bool {
    clip_segment(p0, p1, rect).is_some()
}

/// End point of the extended shot ray
pub fn extended_ray_end(anchor: Vec2, landing: Vec2, extension: f32) -> Vec2 {
    let direction = (landing - anchor).normalize_or_zero();
    landing + direction * extension
}

/// Index of the first unhit target the extended ray crosses
///
/// First in batch order wins (left to right as laid out), not the nearest.
/// Already-hit targets are skipped. Never mutates the batch.
pub fn resolve_target(
    anchor: Vec2,
    landing: Vec2,
    extension: f32,
    targets: &[Target],
) -> Option<usize> {
    let end = extended_ray_end(anchor, landing, extension);
    targets
        .iter()
        .position(|target| !target.is_hit && segment_intersects_rect(anchor, end, &target.bounds))
}
