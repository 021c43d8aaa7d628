//! Per-frame game update
//!
//! Advances shot charging and ball motion by one variable-length frame and
//! drives the Idle -> ChargingShot -> BallsMoving -> Idle cycle.

use glam::Vec2;

use super::collision::{keep_pair_in_bounds, pocket_hit, resolve_ball_pair, resolve_cushions};
use super::state::{GameEvent, GamePhase, Table};
use crate::consts::*;
use crate::scene::{Engine, Scene};
use crate::settings::Settings;

/// Pointer input in table space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
}

/// What happened to a single ball during its step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallStep {
    Moved,
    Pocketed,
    /// Cue ball scratched; the table was re-racked
    TableReset,
}

/// Game controller: owns the table and the shot state machine
///
/// The presentation layer is borrowed on every call rather than owned, so
/// meshes stay under the scene's control.
pub struct Game<S: Scene> {
    settings: Settings,
    table: Table<S::Mesh>,
    phase: GamePhase,
    /// Shot power in [0, 1]
    charge: f32,
    events: Vec<GameEvent>,
}

impl<S: Scene> Game<S> {
    pub fn new(settings: Settings) -> Self {
        let table = Table::new(&settings);
        Self {
            settings,
            table,
            phase: GamePhase::Idle,
            charge: 0.0,
            events: Vec::new(),
        }
    }

    pub fn init(&mut self, scene: &mut S, engine: &mut impl Engine) {
        engine.set_target_fps(self.settings.target_fps);
        scene.setup_background(self.settings.table_width, self.settings.table_height);
        self.table.init(scene);
        self.phase = GamePhase::Idle;
        self.charge = 0.0;
    }

    pub fn deinit(&mut self, scene: &mut S) {
        self.table.deinit(scene);
        self.phase = GamePhase::Idle;
        self.charge = 0.0;
        log::info!("Table cleared");
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn charge(&self) -> f32 {
        self.charge
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn table(&self) -> &Table<S::Mesh> {
        &self.table
    }

    /// Direct table access for tooling and test setups
    pub fn table_mut(&mut self) -> &mut Table<S::Mesh> {
        &mut self.table
    }

    /// Take all events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance the game by `dt` seconds
    pub fn update(&mut self, scene: &mut S, dt: f32) {
        if self.phase == GamePhase::ChargingShot {
            self.charge = (self.charge + dt / self.settings.charge_time).min(1.0);
        }
        scene.update_progress_bar(self.charge);

        if self.phase != GamePhase::BallsMoving {
            return;
        }

        for idx in 0..BALL_COUNT {
            if self.table.balls[idx].pocketed {
                continue;
            }
            if self.step_ball(scene, idx, dt) == BallStep::TableReset {
                break;
            }
        }

        if self.table.speed_sum() == 0.0 {
            log::info!("Balls at rest ({} pocketed)", self.table.pocketed_count());
            self.phase = GamePhase::Idle;
            self.events.push(GameEvent::BallsAtRest);
        }
    }

    /// Move one ball through pocket check, cushions, ball contacts,
    /// integration and rolling friction
    pub fn step_ball(&mut self, scene: &mut S, idx: usize, dt: f32) -> BallStep {
        let pos = self.table.balls[idx].pos;
        if let Some(pocket) = pocket_hit(pos, self.table.pocket_positions(), self.table.pocket_radius) {
            if idx == CUE_BALL {
                log::info!("Cue ball pocketed in pocket {pocket}, re-racking");
                self.events.push(GameEvent::CueBallPocketed { pocket });
                self.table.reset(scene);
                self.events.push(GameEvent::TableReset);
                return BallStep::TableReset;
            }
            log::debug!("Ball {idx} pocketed in pocket {pocket}");
            self.table.remove_ball(idx, scene);
            self.events.push(GameEvent::BallPocketed { ball: idx, pocket });
            return BallStep::Pocketed;
        }

        if resolve_cushions(&mut self.table.balls[idx], &self.settings).any() {
            self.events.push(GameEvent::CushionHit { ball: idx });
        }

        for other in 0..BALL_COUNT {
            if other == idx || self.table.balls[other].pocketed {
                continue;
            }
            let (ball, partner) = self.table.pair_mut(idx, other);
            let contact = resolve_ball_pair(ball, partner, &self.settings);
            if !contact.hit {
                continue;
            }
            // Separation may push either ball into a cushion
            keep_pair_in_bounds(ball, partner, &self.settings);
            if let Some(mesh) = &partner.mesh {
                scene.place_mesh(mesh, partner.pos.x, partner.pos.y, 0.0);
            }
            if contact.impact {
                self.events.push(GameEvent::BallCollision { a: idx, b: other });
            }
        }

        let ball = &mut self.table.balls[idx];
        ball.pos += ball.dir * ball.speed * dt;
        if resolve_cushions(ball, &self.settings).any() {
            self.events.push(GameEvent::CushionHit { ball: idx });
        }
        if let Some(mesh) = &ball.mesh {
            scene.place_mesh(mesh, ball.pos.x, ball.pos.y, 0.0);
        }
        let friction = self.settings.rolling_friction * self.settings.table_width * dt;
        ball.speed = (ball.speed - friction).max(0.0);

        BallStep::Moved
    }

    /// Start charging a shot (ignored while balls are rolling)
    pub fn mouse_button_pressed(&mut self, _x: f32, _y: f32) {
        if !self.table.is_initialized() {
            log::warn!("Pointer down before the table was racked");
            return;
        }
        if self.phase == GamePhase::Idle {
            self.phase = GamePhase::ChargingShot;
        }
    }

    /// Release the charged shot toward `(x, y)`
    pub fn mouse_button_released(&mut self, x: f32, y: f32) {
        if self.phase != GamePhase::ChargingShot {
            return;
        }

        let cue = &mut self.table.balls[CUE_BALL];
        match (Vec2::new(x, y) - cue.pos).try_normalize() {
            Some(dir) => cue.dir = dir,
            None => log::debug!("Shot aimed at the cue ball center, keeping direction"),
        }
        cue.speed = self.charge * self.settings.table_width;

        log::info!("Shot fired: power {:.2}, speed {:.2}", self.charge, cue.speed);
        self.events.push(GameEvent::ShotFired { speed: cue.speed });

        self.phase = GamePhase::BallsMoving;
        self.charge = 0.0;
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { x, y } => self.mouse_button_pressed(x, y),
            InputEvent::PointerUp { x, y } => self.mouse_button_released(x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rack_layout;
    use crate::scene::headless::{HeadlessEngine, HeadlessScene, MeshKind};

    fn new_game() -> (Game<HeadlessScene>, HeadlessScene) {
        let mut scene = HeadlessScene::new();
        let mut engine = HeadlessEngine::default();
        let mut game = Game::new(Settings::default());
        game.init(&mut scene, &mut engine);
        assert_eq!(engine.target_fps, Some(TARGET_FPS));
        assert_eq!(scene.background, Some((TABLE_WIDTH, TABLE_HEIGHT)));
        (game, scene)
    }

    /// Put every ball at rest somewhere harmless, leaving the test to place
    /// the ones it cares about
    fn clear_table(game: &mut Game<HeadlessScene>) {
        for (i, ball) in game.table.balls.iter_mut().enumerate() {
            ball.pos = Vec2::new(-6.0 + i as f32, 2.0);
            ball.speed = 0.0;
        }
    }

    #[test]
    fn test_press_charges_and_clamps() {
        let (mut game, mut scene) = new_game();
        game.mouse_button_pressed(0.0, 0.0);
        assert_eq!(game.phase(), GamePhase::ChargingShot);

        game.update(&mut scene, 0.25);
        assert!((game.charge() - 0.25).abs() < 1e-6);
        assert!((scene.progress - 0.25).abs() < 1e-6);

        for _ in 0..10 {
            game.update(&mut scene, 0.2);
        }
        assert_eq!(game.charge(), 1.0);
        assert_eq!(scene.progress, 1.0);
    }

    #[test]
    fn test_single_long_frame_charges_fully() {
        let (mut game, mut scene) = new_game();
        game.mouse_button_pressed(0.0, 0.0);
        game.update(&mut scene, 1.5);
        assert_eq!(game.charge(), 1.0);
    }

    #[test]
    fn test_release_sets_cue_velocity() {
        let (mut game, mut scene) = new_game();
        game.mouse_button_pressed(0.0, 0.0);
        game.update(&mut scene, 0.5);

        let cue = game.table().balls[CUE_BALL].pos;
        game.mouse_button_released(cue.x + 3.0, cue.y);

        let cue = &game.table().balls[CUE_BALL];
        assert_eq!(cue.dir, Vec2::X);
        assert!((cue.speed - 0.5 * TABLE_WIDTH).abs() < 1e-5);
        assert_eq!(game.phase(), GamePhase::BallsMoving);
        assert_eq!(game.charge(), 0.0);
        assert!(matches!(game.drain_events().as_slice(), [GameEvent::ShotFired { .. }]));
    }

    #[test]
    fn test_release_on_cue_center_keeps_finite_direction() {
        let (mut game, mut scene) = new_game();
        game.mouse_button_pressed(0.0, 0.0);
        game.update(&mut scene, 0.3);
        let cue = game.table().balls[CUE_BALL].pos;
        game.mouse_button_released(cue.x, cue.y);

        let cue = &game.table().balls[CUE_BALL];
        assert!(cue.dir.is_finite());
        for _ in 0..5 {
            game.update(&mut scene, 1.0 / 60.0);
        }
        assert!(game.table().balls.iter().all(|b| b.pos.is_finite()));
    }

    #[test]
    fn test_release_without_press_ignored() {
        let (mut game, _scene) = new_game();
        game.mouse_button_released(5.0, 0.0);
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.table().speed_sum(), 0.0);
    }

    #[test]
    fn test_input_ignored_while_moving() {
        let (mut game, mut scene) = new_game();
        game.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        game.update(&mut scene, 1.0);
        game.handle_input(InputEvent::PointerUp { x: 0.0, y: 0.0 });
        assert_eq!(game.phase(), GamePhase::BallsMoving);

        game.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        assert_eq!(game.phase(), GamePhase::BallsMoving);
        game.update(&mut scene, 1.0 / 60.0);
        assert_eq!(game.charge(), 0.0);
        game.handle_input(InputEvent::PointerUp { x: 0.0, y: 5.0 });
        assert_eq!(game.phase(), GamePhase::BallsMoving);
    }

    #[test]
    fn test_press_before_init_ignored() {
        let mut game: Game<HeadlessScene> = Game::new(Settings::default());
        game.mouse_button_pressed(0.0, 0.0);
        assert_eq!(game.phase(), GamePhase::Idle);
    }

    #[test]
    fn test_lone_ball_rolls_to_rest() {
        let (mut game, mut scene) = new_game();
        clear_table(&mut game);
        let cue = &mut game.table.balls[CUE_BALL];
        cue.pos = Vec2::new(-3.0, 0.0);
        cue.dir = Vec2::X;
        cue.speed = 3.0;
        game.phase = GamePhase::BallsMoving;

        let dt = 1.0 / 60.0;
        let mut prev = game.table().speed_sum();
        let mut frames = 0;
        while game.phase() == GamePhase::BallsMoving {
            game.update(&mut scene, dt);
            let sum = game.table().speed_sum();
            assert!(sum <= prev);
            prev = sum;
            frames += 1;
            assert!(frames < 1000, "ball never stopped");
        }
        // v = 3, a = 0.75 -> stops after ~4s, travelling ~6 units
        let cue = &game.table().balls[CUE_BALL];
        assert!((cue.pos.x - 3.0).abs() < 0.1, "stopped at {}", cue.pos.x);
        assert!(game.drain_events().contains(&GameEvent::BallsAtRest));
    }

    #[test]
    fn test_cushion_keeps_ball_on_table() {
        let (mut game, mut scene) = new_game();
        clear_table(&mut game);
        let ball = &mut game.table.balls[3];
        ball.pos = Vec2::new(2.0, -3.0);
        ball.dir = Vec2::new(0.0, -1.0);
        ball.speed = 10.0;
        game.phase = GamePhase::BallsMoving;

        let limit = 0.5 * TABLE_HEIGHT - BALL_RADIUS;
        for _ in 0..30 {
            game.update(&mut scene, 1.0 / 60.0);
            assert!(game.table().balls[3].pos.y >= -limit);
        }
        assert!(game.table().balls[3].dir.y > 0.0);
        assert!(game.drain_events().contains(&GameEvent::CushionHit { ball: 3 }));
    }

    #[test]
    fn test_object_ball_pocketed() {
        let (mut game, mut scene) = new_game();
        game.table.balls[2].pos = Vec2::new(0.0, 0.5 * TABLE_HEIGHT - 0.2);
        game.table.balls[2].speed = 1.0;
        game.table.balls[2].dir = Vec2::Y;
        game.phase = GamePhase::BallsMoving;
        game.update(&mut scene, 1.0 / 60.0);

        let ball = &game.table().balls[2];
        assert!(ball.pocketed);
        assert_eq!(ball.speed, 0.0);
        assert!(ball.mesh.is_none());
        assert!(ball.pos.x > 0.5 * TABLE_WIDTH);
        assert_eq!(scene.live_count(MeshKind::Ball), BALL_COUNT - 1);
        assert!(
            game.drain_events()
                .contains(&GameEvent::BallPocketed { ball: 2, pocket: 4 })
        );
        // Everything stopped -> back to idle
        assert_eq!(game.phase(), GamePhase::Idle);

        // Pocketed balls are skipped from now on
        game.mouse_button_pressed(0.0, 0.0);
        game.update(&mut scene, 0.5);
        game.mouse_button_released(10.0, 0.0);
        game.update(&mut scene, 1.0 / 60.0);
        assert!(game.table().balls[2].pocketed);
        assert_eq!(game.table().balls[2].pos, game.table().parked_position());
    }

    #[test]
    fn test_cue_ball_scratch_resets_table() {
        let (mut game, mut scene) = new_game();
        game.table.remove_ball(5, &mut scene);
        game.table.remove_ball(6, &mut scene);
        game.table.balls[CUE_BALL].pos = Vec2::new(0.5 * TABLE_WIDTH - 0.3, -0.5 * TABLE_HEIGHT + 0.3);
        game.table.balls[CUE_BALL].speed = 2.0;
        game.table.balls[1].speed = 4.0;
        game.phase = GamePhase::BallsMoving;
        game.update(&mut scene, 1.0 / 60.0);

        let rack = rack_layout(TABLE_WIDTH, TABLE_HEIGHT);
        for (ball, expected) in game.table().balls.iter().zip(rack) {
            assert_eq!(ball.pos, expected);
            assert!(!ball.pocketed);
            assert_eq!(ball.speed, 0.0);
        }
        assert_eq!(scene.live_count(MeshKind::Ball), BALL_COUNT);
        assert_eq!(scene.live_count(MeshKind::Pocket), POCKET_COUNT);
        assert_eq!(game.phase(), GamePhase::Idle);

        let events = game.drain_events();
        assert_eq!(events[0], GameEvent::CueBallPocketed { pocket: 2 });
        assert_eq!(events[1], GameEvent::TableReset);
    }

    #[test]
    fn test_break_shot_scatters_rack() {
        let (mut game, mut scene) = new_game();
        game.mouse_button_pressed(0.0, 0.0);
        game.update(&mut scene, 1.0);
        game.mouse_button_released(3.0, 0.0);

        let mut frames = 0;
        while game.phase() == GamePhase::BallsMoving && frames < 3000 {
            game.update(&mut scene, 1.0 / 60.0);
            frames += 1;
        }
        assert_eq!(game.phase(), GamePhase::Idle);
        let events = game.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::BallCollision { .. })));
        // Unless the cue ball scratched, the rack apex was knocked away
        if !events.contains(&GameEvent::TableReset) {
            let apex = rack_layout(TABLE_WIDTH, TABLE_HEIGHT)[1];
            let ball = &game.table().balls[1];
            assert!(ball.pocketed || ball.pos != apex);
        }
    }

    #[test]
    fn test_deinit_releases_meshes() {
        let (mut game, mut scene) = new_game();
        game.deinit(&mut scene);
        assert_eq!(scene.live_meshes().count(), 0);
        assert_eq!(scene.created, scene.destroyed);
    }

    #[test]
    fn test_long_frame_integrates_full_dt() {
        let (mut game, mut scene) = new_game();
        clear_table(&mut game);
        let cue = &mut game.table.balls[CUE_BALL];
        cue.pos = Vec2::new(-3.0, 0.0);
        cue.dir = Vec2::X;
        cue.speed = 5.0;
        game.phase = GamePhase::BallsMoving;
        game.update(&mut scene, 0.5);

        let cue = &game.table().balls[CUE_BALL];
        assert!((cue.pos.x - (-0.5)).abs() < 1e-4);
        // 5 - 0.05 * 15 * 0.5
        assert!((cue.speed - 4.625).abs() < 1e-4);
        assert!(cue.is_moving());
    }

    #[test]
    fn test_resting_pair_on_cushion_separates() {
        let (mut game, mut scene) = new_game();
        clear_table(&mut game);
        let limit = 0.5 * TABLE_HEIGHT - BALL_RADIUS;
        game.table.balls[1].pos = Vec2::new(3.0, -limit);
        game.table.balls[2].pos = Vec2::new(3.0, -limit + 0.5);
        game.phase = GamePhase::BallsMoving;
        game.update(&mut scene, 1.0 / 60.0);

        let table = game.table();
        let (a, b) = (table.balls[1].pos, table.balls[2].pos);
        assert!(a.distance(b) >= 2.0 * BALL_RADIUS - 1e-6, "still overlapping: {}", a.distance(b));
        assert!(a.y >= -limit && b.y >= -limit);
        assert!(!table.balls.iter().any(|ball| ball.is_moving()));
        // Meshes follow the pushed balls
        let mesh = scene.mesh(table.balls[2].mesh.as_ref().unwrap()).unwrap();
        assert_eq!((mesh.pos.x, mesh.pos.y), (b.x, b.y));
    }

    #[test]
    fn test_progress_bar_updated_every_frame() {
        let (mut game, mut scene) = new_game();
        let before = scene.progress_updates;
        game.update(&mut scene, 1.0 / 60.0);
        game.mouse_button_pressed(0.0, 0.0);
        game.update(&mut scene, 0.5);
        game.mouse_button_released(5.0, 0.0);
        game.update(&mut scene, 1.0 / 60.0);

        assert_eq!(scene.progress_updates, before + 3);
        assert_eq!(scene.progress, 0.0);
    }
}
