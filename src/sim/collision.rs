//! Collision detection and response on the rectangular table
//!
//! Cushions are the four table edges pulled in by one ball radius. Ball-ball
//! impacts exchange the normal velocity components of equal-mass balls, with
//! an imperfect transfer and a small energy loss.

use glam::Vec2;

use super::state::Ball;
use super::vector::Vector2Ext;
use crate::settings::Settings;

/// Extra clearance added when separating overlapping balls so the reverse
/// check from the partner ball does not see a rounding-error overlap
const CONTACT_SLOP: f32 = 1e-5;

/// Index of the first pocket whose center is within `pocket_radius` of `pos`
pub fn pocket_hit(
    pos: Vec2,
    pockets: impl IntoIterator<Item = Vec2>,
    pocket_radius: f32,
) -> Option<usize> {
    pockets
        .into_iter()
        .position(|pocket| pocket.distance(pos) <= pocket_radius)
}

/// Which cushions a ball bounced off in one check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CushionHits {
    pub bottom: bool,
    pub top: bool,
    pub left: bool,
    pub right: bool,
}

impl CushionHits {
    pub fn any(&self) -> bool {
        self.bottom || self.top || self.left || self.right
    }
}

/// Lowest and highest center coordinates a ball can have on the table
#[inline]
pub fn ball_bounds(settings: &Settings) -> (Vec2, Vec2) {
    let max = Vec2::new(
        0.5 * settings.table_width - settings.ball_radius,
        0.5 * settings.table_height - settings.ball_radius,
    );
    (-max, max)
}

/// Position-only containment (no bounce, no loss)
#[inline]
pub fn clamp_to_bounds(pos: Vec2, settings: &Settings) -> Vec2 {
    let (min, max) = ball_bounds(settings);
    pos.clamp(min, max)
}

/// Keep a ball inside the cushions.
///
/// A ball past a cushion is clamped back onto it. If it was travelling into
/// that cushion it bounces: speed drops by
/// `cushion_loss * speed * (1 + |perpendicular direction|)` and the
/// perpendicular direction component flips. Corner hits apply both edges.
pub fn resolve_cushions<M>(ball: &mut Ball<M>, settings: &Settings) -> CushionHits {
    let (min, max) = ball_bounds(settings);
    let loss = settings.cushion_loss;
    let mut hits = CushionHits::default();

    if ball.pos.y < min.y {
        ball.pos.y = min.y;
        if ball.dir.y < 0.0 {
            ball.speed -= loss * ball.speed * (1.0 + ball.dir.y.abs());
            ball.dir.invert_y();
            hits.bottom = true;
        }
    }

    if ball.pos.y > max.y {
        ball.pos.y = max.y;
        if ball.dir.y > 0.0 {
            ball.speed -= loss * ball.speed * (1.0 + ball.dir.y.abs());
            ball.dir.invert_y();
            hits.top = true;
        }
    }

    if ball.pos.x < min.x {
        ball.pos.x = min.x;
        if ball.dir.x < 0.0 {
            ball.speed -= loss * ball.speed * (1.0 + ball.dir.x.abs());
            ball.dir.invert_x();
            hits.left = true;
        }
    }

    if ball.pos.x > max.x {
        ball.pos.x = max.x;
        if ball.dir.x > 0.0 {
            ball.speed -= loss * ball.speed * (1.0 + ball.dir.x.abs());
            ball.dir.invert_x();
            hits.right = true;
        }
    }

    hits
}

/// Result of a ball-ball check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairCollision {
    /// Balls overlapped and were pushed apart
    pub hit: bool,
    /// Balls were closing in and exchanged momentum
    pub impact: bool,
    /// Unit vector from the first ball toward the second
    pub normal: Vec2,
    /// Overlap depth before separation
    pub penetration: f32,
}

impl PairCollision {
    pub fn miss() -> Self {
        Self {
            hit: false,
            impact: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Resolve an overlap between two balls.
///
/// Both balls move half the penetration apart along the line of centers.
/// If they are approaching each other, the normal velocity components are
/// exchanged: each ball keeps its tangential component and receives
/// `collision_transfer` of the partner's normal component plus the rest of
/// its own. Both speeds are then scaled by `1 - collision_loss`.
///
/// Balls already separating are only pushed apart, so the same contact seen
/// again from the partner's side never exchanges momentum twice.
pub fn resolve_ball_pair<M>(a: &mut Ball<M>, b: &mut Ball<M>, settings: &Settings) -> PairCollision {
    let contact = 2.0 * settings.ball_radius;
    let separation = b.pos - a.pos;
    let dist = separation.length();
    if dist >= contact {
        return PairCollision::miss();
    }

    // Coincident centers have no line of contact; pick one
    let normal = separation.try_normalize().unwrap_or(Vec2::X);
    let penetration = contact - dist;
    let push = normal * (0.5 * (penetration + CONTACT_SLOP));
    a.pos -= push;
    b.pos += push;

    let tangent = normal.perp();
    let (va, vb) = (a.velocity(), b.velocity());
    let (an, at) = (va.dot(normal), va.dot(tangent));
    let (bn, bt) = (vb.dot(normal), vb.dot(tangent));

    let impact = an - bn > 0.0;
    if impact {
        let k = settings.collision_transfer;
        let retain = 1.0 - settings.collision_loss;

        a.dir = normal * (k * bn + (1.0 - k) * an) + tangent * at;
        a.speed = retain * a.dir.length();
        a.dir.normalize_in_place();

        b.dir = normal * (k * an + (1.0 - k) * bn) + tangent * bt;
        b.speed = retain * b.dir.length();
        b.dir.normalize_in_place();
    }

    PairCollision {
        hit: true,
        impact,
        normal,
        penetration,
    }
}

/// Pull a freshly separated pair back inside the cushions.
///
/// A ball clamped onto a cushion hands the clamped-off distance to its
/// partner along the line of centers, so the pair ends up touching instead
/// of overlapping. Squeezed into a corner, the two balls take turns.
pub fn keep_pair_in_bounds<M>(a: &mut Ball<M>, b: &mut Ball<M>, settings: &Settings) {
    let contact = 2.0 * settings.ball_radius;

    let clamped = clamp_to_bounds(a.pos, settings);
    let mut move_b = clamped != a.pos;
    a.pos = clamped;
    b.pos = clamp_to_bounds(b.pos, settings);

    for _ in 0..4 {
        let separation = b.pos - a.pos;
        let shortfall = contact - separation.length();
        if shortfall <= 0.0 {
            break;
        }
        let push = separation.try_normalize().unwrap_or(Vec2::X) * (shortfall + CONTACT_SLOP);
        if move_b {
            b.pos = clamp_to_bounds(b.pos + push, settings);
        } else {
            a.pos = clamp_to_bounds(a.pos - push, settings);
        }
        move_b = !move_b;
    }
}
