//! Arena geometry and collision tests
//!
//! Entities are circles; obstacles are axis-aligned rectangles. Entity vs
//! obstacle goes through `circle_intersects_rect`, entity vs entity through
//! center distance against summed radii.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MIN_ARENA_DIM;
use crate::error::{Result, SimError};

/// Logical play field, constant for the duration of a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Result<Self> {
        if !width.is_finite() || !height.is_finite() {
            return Err(SimError::NonFiniteArena);
        }
        if width < MIN_ARENA_DIM || height < MIN_ARENA_DIM {
            return Err(SimError::ArenaTooSmall {
                width,
                height,
                min: MIN_ARENA_DIM,
            });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp a circle center so the whole circle stays inside the arena
    ///
    /// A circle wider than the arena is pinned to the center on that axis.
    #[inline]
    pub fn clamp_circle(&self, pos: Vec2, radius: f32) -> Vec2 {
        let rx = radius.max(0.0).min(self.width / 2.0);
        let ry = radius.max(0.0).min(self.height / 2.0);
        Vec2::new(
            pos.x.clamp(rx, self.width - rx),
            pos.y.clamp(ry, self.height - ry),
        )
    }
}

/// Axis-aligned rectangle (obstacle)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Nearest point of the rectangle to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.x, self.right()), p.y.clamp(self.y, self.bottom()))
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// True iff the circle strictly intersects the rectangle
#[inline]
pub fn circle_intersects_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let nearest = rect.closest_point(center);
    center.distance_squared(nearest) < radius * radius
}

/// True iff the circle intersects any of the rectangles
#[inline]
pub fn hits_any(center: Vec2, radius: f32, rects: &[Rect]) -> bool {
    rects.iter().any(|r| circle_intersects_rect(center, radius, r))
}

/// Entity contact test: center distance below summed radii
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}
