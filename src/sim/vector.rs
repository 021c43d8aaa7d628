//! In-place vector operations used by the ball update

use glam::Vec2;

/// Table-space 2D vector
pub type Vector2 = Vec2;

pub trait Vector2Ext {
    /// Scale to unit length. Zero-length (or non-finite) vectors are left
    /// unchanged instead of turning into NaN.
    fn normalize_in_place(&mut self);
    fn invert_x(&mut self);
    fn invert_y(&mut self);
}

impl Vector2Ext for Vec2 {
    #[inline]
    fn normalize_in_place(&mut self) {
        if let Some(unit) = self.try_normalize() {
            *self = unit;
        }
    }

    #[inline]
    fn invert_x(&mut self) {
        self.x = -self.x;
    }

    #[inline]
    fn invert_y(&mut self) {
        self.y = -self.y;
    }
}
