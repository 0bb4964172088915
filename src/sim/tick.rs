//! Scene controller: shot lifecycle, input gating and the frame tick
//!
//! Idle → Dragging → (Idle | Flying) → Idle, with resolution and feedback
//! running synchronously on arrival.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::answers::{build_targets, correct_index, evaluate_shot};
use super::feedback::{Feedback, FeedbackAction, FeedbackStep};
use super::pull::{PullController, Release};
use super::resolve::resolve_target;
use super::state::{
    GameEvent, GuideLine, Projectile, ProjectileState, Question, ShotResult, Target,
};
use super::trajectory::{TrajectoryResult, integrate_step, predict};
use crate::consts::MAX_FRAME_DT;
use crate::heading;
use crate::scoring::{Scorer, StreakScorer};
use crate::settings::{Settings, SettingsError};

/// An accepted shot in progress. Exists only while flying, so the frame
/// tick does no physics work otherwise.
#[derive(Debug, Clone)]
pub struct Flight {
    pub trajectory: TrajectoryResult,
    /// Integration steps replayed so far
    pub steps_taken: u32,
    /// Fractional steps owed to the next frame
    accumulator: f32,
}

impl Flight {
    fn new(trajectory: TrajectoryResult) -> Self {
        Self {
            trajectory,
            steps_taken: 0,
            accumulator: 0.0,
        }
    }
}

/// Composes pull, prediction, resolution and feedback for one scene
pub struct SceneController<S: Scorer = StreakScorer> {
    settings: Settings,
    pull: PullController,
    projectile: Projectile,
    targets: Vec<Target>,
    question: Option<Question>,
    /// Incremented whenever the target batch is replaced or discarded
    batch: u32,
    /// Prediction for the pull in progress (guide line)
    preview: Option<TrajectoryResult>,
    flight: Option<Flight>,
    feedback: Feedback,
    scorer: S,
    rng: Pcg32,
    interaction_enabled: bool,
    questions_consumed: u32,
    round_complete: bool,
    events: Vec<GameEvent>,
}

impl SceneController<StreakScorer> {
    /// Controller with the bundled streak scorer
    pub fn new(settings: Settings) -> Result<Self, SettingsError> {
        let scorer = StreakScorer::new(settings.streak_length);
        Self::with_scorer(settings, scorer)
    }
}

impl<S: Scorer> SceneController<S> {
    /// Controller with a host-supplied scorer. Settings are validated first,
    /// so every later batch has one target per layout slot.
    pub fn with_scorer(settings: Settings, scorer: S) -> Result<Self, SettingsError> {
        settings.validate()?;
        let anchor = settings.anchor;
        Ok(Self {
            pull: PullController::new(anchor, &settings.physics),
            projectile: Projectile::new(anchor),
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            targets: Vec::new(),
            question: None,
            batch: 0,
            preview: None,
            flight: None,
            feedback: Feedback::default(),
            scorer,
            interaction_enabled: true,
            questions_consumed: 0,
            round_complete: false,
            events: Vec::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn anchor(&self) -> Vec2 {
        self.settings.anchor
    }

    pub fn projectile(&self) -> &Projectile {
        &self.projectile
    }

    pub fn state(&self) -> ProjectileState {
        self.projectile.state
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn batch(&self) -> u32 {
        self.batch
    }

    pub fn pull(&self) -> Option<Vec2> {
        self.pull.pull()
    }

    pub fn flight(&self) -> Option<&Flight> {
        self.flight.as_ref()
    }

    pub fn feedback_step(&self) -> FeedbackStep {
        self.feedback.step()
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    pub fn questions_consumed(&self) -> u32 {
        self.questions_consumed
    }

    pub fn is_round_complete(&self) -> bool {
        self.round_complete
    }

    pub fn is_interaction_enabled(&self) -> bool {
        self.interaction_enabled
    }

    /// Pause/help overlays disable interaction: input is ignored and the
    /// frame tick freezes, keeping any in-flight trajectory intact.
    /// A drag in progress is cancelled, since its release would be lost.
    pub fn set_interaction_enabled(&mut self, enabled: bool) {
        if self.interaction_enabled != enabled {
            log::debug!("Interaction {}", if enabled { "enabled" } else { "disabled" });
        }
        if !enabled && self.projectile.state == ProjectileState::Dragging {
            log::debug!("Drag cancelled by disabled interaction");
            self.pull.clear();
            self.preview = None;
            self.projectile.reset_to(self.settings.anchor);
            self.events.push(GameEvent::DragCancelled);
        }
        self.interaction_enabled = enabled;
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Replace the target batch with one for `question`
    pub fn load_question(&mut self, question: Question) {
        self.discard_batch();

        self.targets = build_targets(
            &question,
            self.settings.topic,
            self.settings.max_distractor_offset,
            &self.settings.layout.slots,
            self.settings.layout.half_extents,
            &mut self.rng,
        );
        log::info!(
            "Question {} (batch {}): {} = {}, targets {:?}",
            self.questions_consumed + 1,
            self.batch,
            question.prompt(),
            question.answer,
            self.targets.iter().map(|t| t.value).collect::<Vec<_>>()
        );
        self.question = Some(question);
        self.events.push(GameEvent::QuestionLoaded { batch: self.batch });
    }

    /// Use an externally built batch (layout and values already decided)
    pub fn load_targets(&mut self, question: Question, targets: Vec<Target>) {
        self.discard_batch();
        self.targets = targets;
        self.question = Some(question);
        self.events.push(GameEvent::QuestionLoaded { batch: self.batch });
    }

    /// Start a new round: drop the batch, pending feedback and score
    pub fn reset_game(&mut self) {
        self.discard_batch();
        self.question = None;
        self.scorer.reset();
        self.questions_consumed = 0;
        self.round_complete = false;
        log::info!("Game reset");
    }

    /// Cancel everything tied to the current batch and put the projectile
    /// back at rest
    fn discard_batch(&mut self) {
        self.feedback.cancel();
        self.flight = None;
        self.preview = None;
        self.pull.clear();
        self.targets.clear();
        self.projectile.reset_to(self.settings.anchor);
        self.batch = self.batch.wrapping_add(1);
    }

    fn accepts_input(&self, what: &str) -> bool {
        if !self.interaction_enabled {
            log::debug!("Ignoring {}: interaction disabled", what);
            return false;
        }
        true
    }

    /// Pointer pressed
    pub fn pointer_down(&mut self, pointer: Vec2) {
        if !self.accepts_input("pointer down") {
            return;
        }
        if self.question.is_none() || self.feedback.is_pending() {
            log::debug!("Ignoring pointer down: no shot available");
            return;
        }
        if self.pull.begin_drag(&mut self.projectile, pointer) {
            self.events.push(GameEvent::DragStarted);
        }
    }

    /// Pointer moved
    pub fn pointer_move(&mut self, pointer: Vec2) {
        if !self.accepts_input("pointer move") {
            return;
        }
        if let Some(pull) = self.pull.update_drag(&mut self.projectile, pointer) {
            self.preview = Some(predict(
                self.settings.anchor,
                pull,
                &self.settings.physics,
                &self.settings.play_area,
            ));
        }
    }

    /// Pointer released
    pub fn pointer_up(&mut self) {
        if !self.accepts_input("pointer up") {
            return;
        }
        let Some(release) = self.pull.end_drag(&mut self.projectile) else {
            return;
        };
        self.preview = None;

        let pull = match release {
            Release::Cancelled => {
                log::debug!("Drag cancelled below release threshold");
                self.events.push(GameEvent::DragCancelled);
                return;
            }
            Release::Pulled(pull) => pull,
        };

        let anchor = self.settings.anchor;
        let trajectory = predict(anchor, pull, &self.settings.physics, &self.settings.play_area);
        if trajectory.rejected {
            log::debug!(
                "Shot rejected: landing ({:.1}, {:.1}) not above anchor",
                trajectory.landing_point.x,
                trajectory.landing_point.y
            );
            self.projectile.reset_to(anchor);
            self.events.push(GameEvent::TrajectoryRejected {
                landing_point: trajectory.landing_point,
            });
            return;
        }

        log::info!(
            "Launch: velocity=({:.1}, {:.1}) landing=({:.1}, {:.1})",
            trajectory.launch_velocity.x,
            trajectory.launch_velocity.y,
            trajectory.landing_point.x,
            trajectory.landing_point.y
        );
        self.projectile.position = anchor;
        self.projectile.velocity = trajectory.launch_velocity;
        self.projectile.rotation = heading(trajectory.launch_velocity);
        self.projectile.state = ProjectileState::Flying;
        self.events.push(GameEvent::Launched {
            velocity: trajectory.launch_velocity,
            landing_point: trajectory.landing_point,
        });
        self.flight = Some(Flight::new(trajectory));
    }

    /// Guide line for the renderer while aiming
    pub fn guide(&self) -> Option<GuideLine> {
        if self.projectile.state != ProjectileState::Dragging {
            return None;
        }
        let preview = self.preview?;
        let anchor = self.settings.anchor;
        Some(GuideLine {
            anchor,
            landing_point: preview.landing_point,
            direction: (preview.landing_point - anchor).normalize_or_zero(),
            rejected: preview.rejected,
        })
    }

    /// True if the frame tick has anything to do
    pub fn wants_tick(&self) -> bool {
        self.flight.is_some() || self.feedback.has_timer()
    }

    /// Per-frame update (`dt` in seconds of real time, clamped to
    /// `0..=MAX_FRAME_DT`)
    pub fn tick(&mut self, dt: f32) {
        if !self.interaction_enabled {
            return;
        }
        let dt = dt.max(0.0).min(MAX_FRAME_DT);
        if self.flight.is_some() {
            self.advance_flight(dt);
        }
        if let Some(action) = self.feedback.advance(dt, self.batch) {
            self.apply_feedback(action);
        }
    }

    fn advance_flight(&mut self, dt: f32) {
        let physics = &self.settings.physics;
        let Some(flight) = self.flight.as_mut() else {
            return;
        };

        flight.accumulator += dt * physics.flight_steps_per_second;
        let mut substeps = 0;
        let mut arrived = false;
        while flight.accumulator >= 1.0 && substeps < physics.max_substeps {
            let (pos, vel) = integrate_step(
                self.projectile.position,
                self.projectile.velocity,
                physics.gravity,
                physics.dt,
            );
            flight.accumulator -= 1.0;
            flight.steps_taken += 1;
            substeps += 1;

            if !self.settings.play_area.in_play(pos) {
                log::trace!("Projectile left play at ({:.1}, {:.1})", pos.x, pos.y);
                arrived = true;
                break;
            }
            self.projectile.position = pos;
            self.projectile.velocity = vel;
            self.projectile.rotation = heading(vel);

            let landing = flight.trajectory.landing_point;
            if pos.distance(landing) <= physics.arrival_tolerance
                || flight.steps_taken >= flight.trajectory.steps
            {
                arrived = true;
                break;
            }
        }

        if arrived {
            self.arrive();
        }
    }

    /// Flight finished: settle, resolve the shot and start feedback
    fn arrive(&mut self) {
        let Some(flight) = self.flight.take() else {
            return;
        };
        let anchor = self.settings.anchor;
        let landing = flight.trajectory.landing_point;

        self.projectile.position = landing;
        self.projectile.velocity = Vec2::ZERO;
        self.projectile.state = ProjectileState::Idle;
        self.events.push(GameEvent::Landed { position: landing });

        let hit = resolve_target(anchor, landing, self.settings.physics.ray_extension, &self.targets);
        let result = evaluate_shot(&mut self.targets, hit);
        self.report(result);
    }

    fn report(&mut self, result: ShotResult) {
        log::info!(
            "Shot resolved: target={:?} correct={}",
            result.target_index,
            result.is_correct
        );
        self.events.push(GameEvent::ShotResolved(result));

        let streak = self.scorer.record(result.is_correct);
        let timing = &self.settings.feedback;
        if result.is_correct {
            if streak {
                self.events.push(GameEvent::CelebrationStarted);
            }
            self.feedback
                .schedule_correct(self.batch, streak, timing.next_question_delay);
        } else {
            self.feedback.schedule_incorrect(self.batch, timing.reveal_delay);
        }
    }

    /// Host finished the streak celebration
    pub fn finish_celebration(&mut self) {
        if !self.accepts_input("celebration end") {
            return;
        }
        if let Some(action) = self.feedback.finish_celebration(self.batch) {
            self.apply_feedback(action);
        }
    }

    /// User pressed continue after a wrong answer or miss
    pub fn continue_after_reveal(&mut self) {
        if !self.accepts_input("continue") {
            return;
        }
        if let Some(action) = self.feedback.continue_after_reveal(self.batch) {
            self.apply_feedback(action);
        }
    }

    fn apply_feedback(&mut self, action: FeedbackAction) {
        match action {
            FeedbackAction::Reveal => {
                if let Some(i) = correct_index(&self.targets) {
                    self.targets[i].reveal();
                    self.events.push(GameEvent::CorrectRevealed { target_index: i });
                }
                self.events.push(GameEvent::ContinuePrompted);
            }
            FeedbackAction::Advance => self.consume_question(),
        }
    }

    fn consume_question(&mut self) {
        self.questions_consumed += 1;
        if self.questions_consumed >= self.settings.questions_per_round {
            self.round_complete = true;
            log::info!("Round complete after {} questions", self.questions_consumed);
            self.events.push(GameEvent::RoundComplete);
        } else {
            self.events.push(GameEvent::RequestNextQuestion);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Operator;

    fn settings() -> Settings {
        Settings {
            anchor: Vec2::new(500.0, 400.0),
            questions_per_round: 2,
            ..Settings::default()
        }
    }

    fn question() -> Question {
        Question::evaluate(7, 8, Operator::Add).unwrap()
    }

    /// Run frames until the flight ends (bounded)
    fn fly(scene: &mut SceneController) {
        for _ in 0..10_000 {
            if scene.flight().is_none() {
                return;
            }
            scene.tick(1.0 / 60.0);
        }
        panic!("flight never ended");
    }

    fn shoot(scene: &mut SceneController, pointer: Vec2) {
        scene.pointer_down(scene.anchor());
        scene.pointer_move(pointer);
        scene.pointer_up();
    }

    #[test]
    fn test_no_drag_without_question() {
        let mut scene = SceneController::new(settings()).expect("valid settings");
        scene.pointer_down(scene.anchor());
        assert_eq!(scene.state(), ProjectileState::Idle);
    }

    #[test]
    fn test_drag_publishes_guide() {
        let mut scene = SceneController::new(settings()).expect("valid settings");
        scene.load_question(question());
        scene.pointer_down(scene.anchor());
        assert_eq!(scene.state(), ProjectileState::Dragging);
        assert!(scene.guide().is_none());

        scene.pointer_move(Vec2::new(560.0, 430.0));
        let guide = scene.guide().expect("guide while dragging");
        assert_eq!(guide.anchor, scene.anchor());
        assert!(!guide.rejected);
        assert!((guide.direction.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_short_drag_cancels() {
        let mut scene = SceneController::new(settings()).expect("valid settings");
        scene.load_question(question());
        scene.drain_events();
        shoot(&mut scene, Vec2::new(503.0, 404.0));
        assert_eq!(scene.state(), ProjectileState::Idle);
        assert!(scene.flight().is_none());
        assert_eq!(
            scene.drain_events(),
            vec![GameEvent::DragStarted, GameEvent::DragCancelled]
        );
    }

    #[test]
    fn test_flight_lands_on_prediction() {
        let mut scene = SceneController::new(settings()).expect("valid settings");
        scene.load_question(question());
        shoot(&mut scene, Vec2::new(560.0, 430.0));
        assert_eq!(scene.state(), ProjectileState::Flying);
        let landing = scene.flight().unwrap().trajectory.landing_point;
        assert!(scene.wants_tick());

        // Re-entrant grab while flying is ignored
        scene.pointer_down(scene.anchor());
        assert_eq!(scene.state(), ProjectileState::Flying);

        fly(&mut scene);
        assert_eq!(scene.state(), ProjectileState::Idle);
        assert_eq!(scene.projectile().position, landing);
        let events = scene.drain_events();
        assert!(events.contains(&GameEvent::Landed { position: landing }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::ShotResolved(_))));
    }

    #[test]
    fn test_disabled_interaction_freezes_flight() {
        let mut scene = SceneController::new(settings()).expect("valid settings");
        scene.load_question(question());
        shoot(&mut scene, Vec2::new(560.0, 430.0));
        scene.tick(0.1);
        let frozen = scene.projectile().position;

        scene.set_interaction_enabled(false);
        for _ in 0..100 {
            scene.tick(0.1);
        }
        assert_eq!(scene.projectile().position, frozen);
        assert_eq!(scene.state(), ProjectileState::Flying);

        scene.set_interaction_enabled(true);
        let landing = scene.flight().unwrap().trajectory.landing_point;
        fly(&mut scene);
        assert_eq!(scene.projectile().position, landing);
    }

    #[test]
    fn test_rejects_layout_without_one_slot_per_target() {
        let mut bad = settings();
        bad.layout.slots.truncate(2);
        let result = SceneController::new(bad);
        assert!(matches!(
            result,
            Err(SettingsError::Invalid {
                field: "layout.slots",
                ..
            })
        ));
    }

    #[test]
    fn test_pointer_input_ignored_while_disabled() {
        let mut scene = SceneController::new(settings()).expect("valid settings");
        scene.load_question(question());
        scene.drain_events();

        scene.set_interaction_enabled(false);
        shoot(&mut scene, Vec2::new(560.0, 430.0));
        assert_eq!(scene.state(), ProjectileState::Idle);
        assert!(scene.pull().is_none());
        assert!(scene.flight().is_none());
        assert!(scene.drain_events().is_empty());

        scene.set_interaction_enabled(true);
        shoot(&mut scene, Vec2::new(560.0, 430.0));
        assert_eq!(scene.state(), ProjectileState::Flying);
    }

    #[test]
    fn test_disabling_mid_drag_cancels_it() {
        let mut scene = SceneController::new(settings()).expect("valid settings");
        scene.load_question(question());
        scene.pointer_down(scene.anchor());
        scene.pointer_move(Vec2::new(560.0, 430.0));
        scene.drain_events();

        scene.set_interaction_enabled(false);
        assert_eq!(scene.drain_events(), vec![GameEvent::DragCancelled]);
        assert_eq!(scene.state(), ProjectileState::Idle);
        assert_eq!(scene.projectile().position, scene.anchor());
        assert!(scene.pull().is_none());
        assert!(scene.guide().is_none());

        // The lost release stays lost after the overlay closes
        scene.pointer_up();
        scene.set_interaction_enabled(true);
        scene.pointer_up();
        assert!(scene.flight().is_none());
        assert!(scene.drain_events().is_empty());

        // A fresh press starts a new drag
        scene.pointer_down(scene.anchor());
        assert_eq!(scene.state(), ProjectileState::Dragging);
    }

    #[test]
    fn test_frame_time_is_clamped() {
        let mut scene = SceneController::new(settings()).expect("valid settings");
        scene.load_question(question());
        shoot(&mut scene, Vec2::new(560.0, 430.0));

        scene.tick(-5.0);
        assert_eq!(scene.flight().map(|f| f.steps_taken), Some(0));
        assert_eq!(scene.projectile().position, scene.anchor());

        // A long hitch only counts as one clamped frame
        scene.tick(10.0);
        let expected = (MAX_FRAME_DT * scene.settings().physics.flight_steps_per_second) as u32;
        assert_eq!(scene.flight().map(|f| f.steps_taken), Some(expected));
    }

    #[test]
    fn test_miss_reveals_then_waits_for_continue() {
        let mut scene = SceneController::new(settings()).expect("valid settings");
        scene.load_question(question());
        // Shallow up-left shot leaves through the left wall under the target row
        shoot(&mut scene, Vec2::new(560.0, 430.0));
        fly(&mut scene);
        let events = scene.drain_events();
        let resolved = events
            .iter()
            .find_map(|e| match e {
                GameEvent::ShotResolved(r) => Some(*r),
                _ => None,
            })
            .expect("resolved");
        assert!(!resolved.is_correct);

        // Drags are refused while feedback is pending
        scene.pointer_down(scene.anchor());
        assert_eq!(scene.state(), ProjectileState::Idle);
        assert!(scene.pull().is_none());

        for _ in 0..120 {
            scene.tick(1.0 / 60.0);
        }
        let events = scene.drain_events();
        assert!(events.contains(&GameEvent::ContinuePrompted));
        let i = correct_index(scene.targets()).unwrap();
        assert!(scene.targets()[i].label.revealed);
        assert_eq!(scene.feedback_step(), FeedbackStep::AwaitContinue { batch: scene.batch() });

        // No timer moves on from here
        for _ in 0..600 {
            scene.tick(1.0 / 60.0);
        }
        assert!(scene.drain_events().is_empty());

        scene.continue_after_reveal();
        assert_eq!(scene.drain_events(), vec![GameEvent::RequestNextQuestion]);
        assert_eq!(scene.questions_consumed(), 1);
    }

    #[test]
    fn test_reset_cancels_pending_step() {
        let mut scene = SceneController::new(settings()).expect("valid settings");
        scene.load_question(question());
        shoot(&mut scene, Vec2::new(560.0, 430.0));
        fly(&mut scene);
        assert!(scene.feedback_step() != FeedbackStep::Idle);

        scene.reset_game();
        scene.drain_events();
        for _ in 0..600 {
            scene.tick(1.0 / 60.0);
        }
        assert!(scene.drain_events().is_empty());
        assert!(scene.targets().is_empty());
        assert_eq!(scene.questions_consumed(), 0);
        assert_eq!(scene.projectile().position, scene.anchor());
    }

    #[test]
    fn test_round_completes_after_configured_questions() {
        let mut scene = SceneController::new(settings()).expect("valid settings");
        for expected in [GameEvent::RequestNextQuestion, GameEvent::RoundComplete] {
            scene.load_question(question());
            shoot(&mut scene, Vec2::new(560.0, 430.0));
            fly(&mut scene);
            for _ in 0..120 {
                scene.tick(1.0 / 60.0);
            }
            scene.drain_events();
            scene.continue_after_reveal();
            assert_eq!(scene.drain_events(), vec![expected]);
        }
        assert!(scene.is_round_complete());
    }

    #[test]
    fn test_new_question_resets_projectile() {
        let mut scene = SceneController::new(settings()).expect("valid settings");
        scene.load_question(question());
        shoot(&mut scene, Vec2::new(560.0, 430.0));
        scene.tick(0.2);
        let before = scene.batch();

        scene.load_question(question());
        assert_eq!(scene.batch(), before + 1);
        assert_eq!(scene.state(), ProjectileState::Idle);
        assert!(scene.flight().is_none());
        assert_eq!(scene.projectile().position, scene.anchor());
        assert_eq!(scene.targets().len(), 3);
        assert!(!scene.wants_tick());
    }
}
