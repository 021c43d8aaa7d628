//! Table simulation module
//!
//! All gameplay logic lives here. This module is frame-stepped and
//! single-threaded:
//! - Balls are updated in index order, cue ball first
//! - No rendering or platform dependencies (meshes go through `Scene`)

pub mod collision;
pub mod state;
pub mod tick;
pub mod vector;

pub use collision::{
    CushionHits, PairCollision, clamp_to_bounds, keep_pair_in_bounds, pocket_hit, resolve_ball_pair, resolve_cushions,
};
pub use state::{Ball, BallSnapshot, GameEvent, GamePhase, Pocket, Table, TableSnapshot};
pub use tick::{BallStep, Game, InputEvent};
pub use vector::{Vector2, Vector2Ext};
