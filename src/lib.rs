//! Pool Sim - physics and rules core of a top-down pool table
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (ball motion, cushions, collisions, pockets, shots)
//! - `scene`: Presentation/scheduling collaborator interface
//! - `settings`: Data-driven table and physics parameters

pub mod scene;
pub mod settings;
pub mod sim;

pub use scene::{Engine, Scene};
pub use settings::Settings;
pub use sim::{Game, GameEvent, GamePhase, Table};

use glam::Vec2;

/// Default table configuration constants
pub mod consts {
    /// Target presentation rate requested from the scheduler
    pub const TARGET_FPS: u32 = 60;
    /// Largest frame delta the driver feeds into a single update
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Table dimensions (table space units, origin at table center)
    pub const TABLE_WIDTH: f32 = 15.0;
    pub const TABLE_HEIGHT: f32 = 8.0;
    pub const POCKET_RADIUS: f32 = 0.5;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.3;
    pub const BALL_COUNT: usize = 7;
    /// Index of the player-controlled ball
    pub const CUE_BALL: usize = 0;

    pub const POCKET_COUNT: usize = 6;

    /// Seconds of holding the pointer to reach full shot power
    pub const CHARGE_TIME: f32 = 1.0;

    /// Cushion hit loss: speed -= CUSHION_LOSS * speed * (1 + |perpendicular dir|)
    pub const CUSHION_LOSS: f32 = 0.15;
    /// Share of the partner's normal velocity a ball receives on impact
    pub const COLLISION_TRANSFER: f32 = 0.85;
    /// Speed retained fraction after a ball-ball impact is 1 - COLLISION_LOSS
    pub const COLLISION_LOSS: f32 = 0.05;
    /// Linear deceleration in table widths per second²
    pub const ROLLING_FRICTION: f32 = 0.05;
}

/// Pocket centers for a table of the given size: four corners plus the two
/// middle pockets on the long cushions
pub fn pocket_layout(width: f32, height: f32) -> [Vec2; consts::POCKET_COUNT] {
    let (hw, hh) = (0.5 * width, 0.5 * height);
    [
        Vec2::new(-hw, -hh),
        Vec2::new(0.0, -hh),
        Vec2::new(hw, -hh),
        Vec2::new(-hw, hh),
        Vec2::new(0.0, hh),
        Vec2::new(hw, hh),
    ]
}

/// Starting ball positions: cue ball on the left, a six-ball rack on the right
pub fn rack_layout(width: f32, height: f32) -> [Vec2; consts::BALL_COUNT] {
    [
        // cue ball
        Vec2::new(-0.3 * width, 0.0),
        // rack apex
        Vec2::new(0.2 * width, 0.0),
        Vec2::new(0.25 * width, 0.05 * height),
        Vec2::new(0.25 * width, -0.05 * height),
        Vec2::new(0.3 * width, 0.1 * height),
        Vec2::new(0.3 * width, 0.0),
        Vec2::new(0.3 * width, -0.1 * height),
    ]
}
