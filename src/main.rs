//! Sling Quiz demo entry point
//!
//! Plays one scripted round against the scene controller with an aiming
//! autopilot and logs every event. Pass a settings JSON path to override
//! the defaults. Run with `RUST_LOG=info` (or `debug`) to see the log.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use sling_quiz::{Settings, SettingsError};
use sling_quiz::settings::Topic;
use sling_quiz::sim::{
    GameEvent, Operator, Question, SceneController, Target, predict, resolve_target, sample_path,
};

/// Frame time used to drive the controller
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up on a round after this many frames
const MAX_FRAMES: u32 = 60 * 600;

/// Stand-in for the question-selection collaborator
fn next_question<R: Rng>(topic: Topic, rng: &mut R) -> Question {
    let operator = match topic {
        Topic::Addition => Operator::Add,
        Topic::Subtraction => Operator::Sub,
        Topic::Multiplication => Operator::Mul,
        Topic::Division => Operator::Div,
        Topic::Mixed => [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div]
            [rng.random_range(0..4)],
    };
    let a = rng.random_range(1..=12);
    let b = rng.random_range(1..=12);
    let question = match operator {
        // Keep division exact
        Operator::Div => Question::evaluate(a * b, b, operator),
        _ => Question::evaluate(a, b, operator),
    };
    question.unwrap_or(Question {
        operand1: a,
        operand2: b,
        operator: Operator::Add,
        answer: a + b,
    })
}

/// Search pull vectors for one whose shot selects `wanted` (or misses
/// everything when `wanted` is `None`)
fn aim(settings: &Settings, targets: &[Target], wanted: Option<usize>) -> Option<Vec2> {
    let max_pull = settings.physics.max_pull_distance;
    for r in (2..=10).rev() {
        let len = max_pull * r as f32 / 10.0;
        for deg in 0..360 {
            let theta = (deg as f32).to_radians();
            let pull = Vec2::new(theta.cos(), theta.sin()) * len;
            let result = predict(settings.anchor, pull, &settings.physics, &settings.play_area);
            if result.rejected {
                continue;
            }
            let hit = resolve_target(
                settings.anchor,
                result.landing_point,
                settings.physics.ray_extension,
                targets,
            );
            if hit == wanted {
                return Some(pull);
            }
        }
    }
    None
}

fn run(settings: Settings) -> Result<(), SettingsError> {
    let mut rng = Pcg32::seed_from_u64(settings.seed ^ 0xA11CE);
    let topic = settings.topic;
    let mut scene = SceneController::new(settings)?;
    scene.load_question(next_question(topic, &mut rng));

    let mut shot_pending = true;
    for frame in 0..MAX_FRAMES {
        if shot_pending && scene.flight().is_none() {
            shot_pending = false;
            // Aim for the correct target most of the time
            let correct = sling_quiz::sim::correct_index(scene.targets());
            let wanted = if rng.random_range(0..100) < 75 { correct } else { None };
            let anchor = scene.anchor();
            let pull = aim(scene.settings(), scene.targets(), wanted)
                .or_else(|| aim(scene.settings(), scene.targets(), None));
            match pull {
                Some(pull) => {
                    scene.pointer_down(anchor);
                    scene.pointer_move(anchor + pull);
                    if let Some(guide) = scene.guide() {
                        log::debug!(
                            "Guide: landing=({:.1}, {:.1}) dir=({:.2}, {:.2})",
                            guide.landing_point.x,
                            guide.landing_point.y,
                            guide.direction.x,
                            guide.direction.y
                        );
                        let preview = predict(
                            anchor,
                            pull,
                            &scene.settings().physics,
                            &scene.settings().play_area,
                        );
                        let path = sample_path(anchor, &preview, &scene.settings().physics, 4);
                        log::debug!("Guide path has {} points", path.len());
                    }
                    scene.pointer_up();
                }
                None => {
                    log::warn!("No usable pull found; flicking a cancel");
                    scene.pointer_down(anchor);
                    scene.pointer_up();
                }
            }
        }

        scene.tick(FRAME_DT);

        for event in scene.drain_events() {
            println!("[frame {:>5}] {:?}", frame, event);
            match event {
                GameEvent::CelebrationStarted => scene.finish_celebration(),
                GameEvent::ContinuePrompted => scene.continue_after_reveal(),
                GameEvent::RequestNextQuestion => {
                    scene.load_question(next_question(topic, &mut rng));
                    shot_pending = true;
                }
                GameEvent::DragCancelled | GameEvent::TrajectoryRejected { .. } => {
                    shot_pending = true;
                }
                GameEvent::RoundComplete => {
                    let summary = scene.scorer().summary();
                    log::info!(
                        "Accuracy {:.0}% over {} shots",
                        summary.accuracy() * 100.0,
                        summary.attempts
                    );
                    match serde_json::to_string_pretty(summary) {
                        Ok(json) => println!("Round summary:\n{}", json),
                        Err(e) => log::warn!("Failed to serialize summary: {}", e),
                    }
                    return Ok(());
                }
                _ => {}
            }
        }
    }
    log::warn!("Round did not finish within {} frames", MAX_FRAMES);
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sling Quiz (native demo) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Failed to load settings from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };
    if let Err(e) = run(settings) {
        eprintln!("Invalid settings: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
