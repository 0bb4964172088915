//! Answer targets: value generation, layout and shot verdicts

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;

use super::state::{Question, ShotResult, Target};
use crate::consts::TARGETS_PER_QUESTION;
use crate::settings::Topic;

/// Random perturbation attempts before falling back to fixed offsets
const MAX_PERTURB_ATTEMPTS: u32 = 32;

/// Perturb the answer into a candidate distractor
fn perturb<R: Rng>(answer: i64, topic: Topic, max_offset: i64, rng: &mut R) -> i64 {
    if rng.random_range(0..100) < topic.scaling_chance() {
        if rng.random_bool(0.5) {
            answer.saturating_mul(2)
        } else {
            answer / 2
        }
    } else {
        let offset = rng.random_range(1..=max_offset.max(1));
        if rng.random_bool(0.5) {
            answer.saturating_add(offset)
        } else {
            answer.saturating_sub(offset)
        }
    }
}

/// Generate the values for one question: the answer plus distinct
/// distractors, shuffled into display order
pub fn generate_values<R: Rng>(answer: i64, topic: Topic, max_offset: i64, rng: &mut R) -> Vec<i64> {
    let mut values = Vec::with_capacity(TARGETS_PER_QUESTION);
    values.push(answer);

    let mut attempts = 0;
    while values.len() < TARGETS_PER_QUESTION && attempts < MAX_PERTURB_ATTEMPTS {
        let candidate = perturb(answer, topic, max_offset, rng);
        if !values.contains(&candidate) {
            values.push(candidate);
        }
        attempts += 1;
    }

    // e.g. answer 0 where scaling keeps producing 0
    let mut k = 1;
    while values.len() < TARGETS_PER_QUESTION {
        for candidate in [answer.saturating_add(k), answer.saturating_sub(k)] {
            if values.len() < TARGETS_PER_QUESTION && !values.contains(&candidate) {
                values.push(candidate);
            }
        }
        k += 1;
    }

    values.shuffle(rng);
    values
}

/// Build a fresh target batch for `question`, one target per layout slot
pub fn build_targets<R: Rng>(
    question: &Question,
    topic: Topic,
    max_offset: i64,
    slots: &[Vec2],
    half_extents: Vec2,
    rng: &mut R,
) -> Vec<Target> {
    let values = generate_values(question.answer, topic, max_offset, rng);
    slots
        .iter()
        .zip(values)
        .map(|(&slot, value)| Target::new(slot, half_extents, value, value == question.answer))
        .collect()
}

/// Index of the correct target in a batch
pub fn correct_index(targets: &[Target]) -> Option<usize> {
    targets.iter().position(|t| t.is_correct)
}

/// Turn a resolver outcome into a verdict, marking the hit target
pub fn evaluate_shot(targets: &mut [Target], hit: Option<usize>) -> ShotResult {
    if let Some((i, target)) = hit.and_then(|i| targets.get_mut(i).map(|t| (i, t))) {
        if target.mark_hit() {
            return ShotResult {
                target_index: Some(i),
                is_correct: target.is_correct,
            };
        }
    }
    ShotResult {
        target_index: None,
        is_correct: false,
    }
}
