//! Table state and core simulation types
//!
//! The table owns every ball and pocket. Mesh handles are borrowed from the
//! presentation layer and always released through the same [`Scene`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::scene::Scene;
use crate::settings::Settings;
use crate::{pocket_layout, rack_layout};

/// Current phase of play. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to start charging a shot
    #[default]
    Idle,
    /// Pointer held down, shot power building up
    ChargingShot,
    /// Balls rolling; input is ignored until everything stops
    BallsMoving,
}

/// Notable things that happened during a frame, for audio/UI layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired { speed: f32 },
    CushionHit { ball: usize },
    BallCollision { a: usize, b: usize },
    BallPocketed { ball: usize, pocket: usize },
    /// Cue ball went down; the whole table is reset
    CueBallPocketed { pocket: usize },
    TableReset,
    BallsAtRest,
}

/// A ball on the table
#[derive(Debug)]
pub struct Ball<M> {
    pub pos: Vec2,
    /// Unit direction of travel (meaningless while `speed == 0`)
    pub dir: Vec2,
    pub speed: f32,
    /// Left the table until the next full reset
    pub pocketed: bool,
    pub mesh: Option<M>,
}

impl<M> Default for Ball<M> {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            dir: Vec2::ZERO,
            speed: 0.0,
            pocketed: false,
            mesh: None,
        }
    }
}

impl<M> Ball<M> {
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.dir * self.speed
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.speed > 0.0
    }
}

/// A pocket. Fixed for the lifetime of an initialised table.
#[derive(Debug)]
pub struct Pocket<M> {
    pub pos: Vec2,
    pub mesh: Option<M>,
}

impl<M> Default for Pocket<M> {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            mesh: None,
        }
    }
}

/// Balls and pockets of one table. Index [`CUE_BALL`] is the cue ball.
#[derive(Debug)]
pub struct Table<M> {
    pub width: f32,
    pub height: f32,
    pub ball_radius: f32,
    pub pocket_radius: f32,
    pub balls: [Ball<M>; BALL_COUNT],
    pockets: [Pocket<M>; POCKET_COUNT],
}

impl<M> Table<M> {
    /// An empty table; call [`Table::init`] to rack the balls
    pub fn new(settings: &Settings) -> Self {
        Self {
            width: settings.table_width,
            height: settings.table_height,
            ball_radius: settings.ball_radius,
            pocket_radius: settings.pocket_radius,
            balls: std::array::from_fn(|_| Ball::default()),
            pockets: std::array::from_fn(|_| Pocket::default()),
        }
    }

    /// Create all meshes and rack the balls in the starting layout.
    ///
    /// # Panics
    /// If the table still holds live meshes (init without deinit).
    pub fn init<S: Scene<Mesh = M>>(&mut self, scene: &mut S) {
        let pocket_positions = pocket_layout(self.width, self.height);
        for (pocket, pos) in self.pockets.iter_mut().zip(pocket_positions) {
            assert!(pocket.mesh.is_none(), "table initialised while pocket meshes are alive");
            let mesh = scene.create_pocket_mesh(self.pocket_radius);
            scene.place_mesh(&mesh, pos.x, pos.y, 0.0);
            *pocket = Pocket {
                pos,
                mesh: Some(mesh),
            };
        }

        let rack = rack_layout(self.width, self.height);
        for (ball, pos) in self.balls.iter_mut().zip(rack) {
            assert!(ball.mesh.is_none(), "table initialised while ball meshes are alive");
            let mesh = scene.create_ball_mesh(self.ball_radius);
            scene.place_mesh(&mesh, pos.x, pos.y, 0.0);
            *ball = Ball {
                pos,
                mesh: Some(mesh),
                ..Default::default()
            };
        }

        log::info!("Table racked ({}x{})", self.width, self.height);
    }

    /// Destroy every live mesh and clear all ball state
    pub fn deinit<S: Scene<Mesh = M>>(&mut self, scene: &mut S) {
        for pocket in &mut self.pockets {
            if let Some(mesh) = pocket.mesh.take() {
                scene.destroy_mesh(mesh);
            }
            *pocket = Pocket::default();
        }
        for ball in &mut self.balls {
            if let Some(mesh) = ball.mesh.take() {
                scene.destroy_mesh(mesh);
            }
            *ball = Ball::default();
        }
    }

    /// Full re-rack after a cue ball scratch
    pub fn reset<S: Scene<Mesh = M>>(&mut self, scene: &mut S) {
        self.deinit(scene);
        self.init(scene);
    }

    pub fn is_initialized(&self) -> bool {
        self.pockets.iter().all(|p| p.mesh.is_some())
    }

    /// Take a non-cue ball off the table for good (until the next reset)
    pub fn remove_ball<S: Scene<Mesh = M>>(&mut self, idx: usize, scene: &mut S) {
        let parked = self.parked_position();
        let ball = &mut self.balls[idx];
        if let Some(mesh) = ball.mesh.take() {
            scene.destroy_mesh(mesh);
        }
        ball.pos = parked;
        ball.speed = 0.0;
        ball.pocketed = true;
    }

    /// Where pocketed balls are kept, well outside the cushions
    pub fn parked_position(&self) -> Vec2 {
        Vec2::splat(2.0 * self.width)
    }

    pub fn pockets(&self) -> &[Pocket<M>; POCKET_COUNT] {
        &self.pockets
    }

    pub fn pocket_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.pockets.iter().map(|p| p.pos)
    }

    /// Mutable access to two distinct balls at once
    pub fn pair_mut(&mut self, i: usize, j: usize) -> (&mut Ball<M>, &mut Ball<M>) {
        assert_ne!(i, j, "ball paired with itself");
        if i < j {
            let (lo, hi) = self.balls.split_at_mut(j);
            (&mut lo[i], &mut hi[0])
        } else {
            let (lo, hi) = self.balls.split_at_mut(i);
            (&mut hi[0], &mut lo[j])
        }
    }

    /// Indices of balls still in play
    pub fn active_balls(&self) -> impl Iterator<Item = usize> + '_ {
        self.balls
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.pocketed)
            .map(|(i, _)| i)
    }

    pub fn pocketed_count(&self) -> usize {
        self.balls.iter().filter(|b| b.pocketed).count()
    }

    /// Sum of ball speeds; zero means the table is at rest
    pub fn speed_sum(&self) -> f32 {
        self.balls.iter().map(|b| b.speed).sum()
    }

    /// Sum of squared speeds (equal unit masses)
    pub fn kinetic_energy(&self) -> f32 {
        self.balls.iter().map(|b| b.speed * b.speed).sum()
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            width: self.width,
            height: self.height,
            balls: self
                .balls
                .iter()
                .map(|b| BallSnapshot {
                    pos: b.pos,
                    dir: b.dir,
                    speed: b.speed,
                    pocketed: b.pocketed,
                })
                .collect(),
        }
    }
}

/// Plain-data view of a ball, for logs and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub pos: Vec2,
    pub dir: Vec2,
    pub speed: f32,
    pub pocketed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub width: f32,
    pub height: f32,
    pub balls: Vec<BallSnapshot>,
}
