//! 2D intersection tests and vector reflection.
//!
//! Every test returns `Some(normal)` on contact and `None` otherwise. Normals
//! are unit vectors pointing from the other shape toward the first argument,
//! i.e. away from the surface that was hit, so [`reflect`] bounces a
//! direction back out of it.
//!
//! Zero-length vectors are never divided by: [`normalise`] leaves them
//! unchanged, which makes degenerate inputs (coincident centers, zero-size
//! rectangles) produce a zero normal rather than NaNs.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Vec2
// ---------------------------------------------------------------------------

/// A 2D vector or point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        dot(self, self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// A circle given by center and radius.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            center: Vec2::new(x, y),
            radius,
        }
    }
}

/// An axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build from a center point and full size.
    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// The point of the rectangle closest to `p`.
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.x, self.x + self.w),
            p.y.clamp(self.y, self.y + self.h),
        )
    }

    /// Whether `p` lies inside or on the edge.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// A horizontal capsule: a rectangular body with a semicircular cap at each
/// end. The cap radius is the half-height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Capsule {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Capsule {
    pub const fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Cap radius.
    pub fn radius(&self) -> f32 {
        self.half_extents.y
    }

    /// Half-width of the straight body between the cap centers. Zero when
    /// the capsule is narrower than it is tall.
    fn body_half_width(&self) -> f32 {
        (self.half_extents.x - self.radius()).max(0.0)
    }

    /// The rectangular body between the caps.
    pub fn body(&self) -> Rect {
        Rect::from_center(
            self.center,
            self.body_half_width() * 2.0,
            self.half_extents.y * 2.0,
        )
    }

    /// Left and right end caps.
    pub fn caps(&self) -> [Circle; 2] {
        let offset = self.body_half_width();
        let r = self.radius();
        [
            Circle::new(self.center.x - offset, self.center.y, r),
            Circle::new(self.center.x + offset, self.center.y, r),
        ]
    }
}

// ---------------------------------------------------------------------------
// Vector operations
// ---------------------------------------------------------------------------

#[inline]
pub fn dot(a: Vec2, b: Vec2) -> f32 {
    a.x * b.x + a.y * b.y
}

/// Unit vector in the direction of `v`; `v` itself when it has zero length.
pub fn normalise(v: Vec2) -> Vec2 {
    let len = v.length();
    if len > 0.0 {
        v * (1.0 / len)
    } else {
        v
    }
}

/// Reflect `direction` about a surface with unit `normal`:
/// `d - 2·dot(n, d)·n`.
pub fn reflect(direction: Vec2, normal: Vec2) -> Vec2 {
    direction - normal * (2.0 * dot(normal, direction))
}

// ---------------------------------------------------------------------------
// Intersection tests
// ---------------------------------------------------------------------------

/// Hit when the centers are no further apart than the sum of the radii.
/// The normal points from `b` toward `a`.
pub fn circle_vs_circle(a: Circle, b: Circle) -> Option<Vec2> {
    let offset = a.center - b.center;
    let reach = a.radius + b.radius;
    (offset.length_squared() <= reach * reach).then(|| normalise(offset))
}

/// Hit when the rectangle's closest point to the circle center is within the
/// radius. The normal points out of the rectangle toward the circle.
///
/// If the closest point differs from the center on one axis only, that axis
/// is the normal. Otherwise (corner regions, or a center inside the
/// rectangle) the dominant axis of the offset from the rectangle's center
/// wins, with each axis weighed against the rectangle's extent on it.
pub fn circle_vs_rect(circle: Circle, rect: Rect) -> Option<Vec2> {
    let nearest = rect.clamp(circle.center);
    let offset = circle.center - nearest;
    if offset.length_squared() > circle.radius * circle.radius {
        return None;
    }
    let normal = match (offset.x != 0.0, offset.y != 0.0) {
        (true, false) | (false, true) => normalise(offset),
        _ => dominant_axis(circle.center - rect.center(), rect),
    };
    Some(normal)
}

/// Body first, then the left cap, then the right cap; the first hit wins.
pub fn circle_vs_capsule(circle: Circle, capsule: Capsule) -> Option<Vec2> {
    let [left, right] = capsule.caps();
    circle_vs_rect(circle, capsule.body())
        .or_else(|| circle_vs_circle(circle, left))
        .or_else(|| circle_vs_circle(circle, right))
}

/// Compares `|dx| / w` with `|dy| / h` without dividing, so zero-size
/// rectangles are safe. Ties go to the x axis.
fn dominant_axis(offset: Vec2, rect: Rect) -> Vec2 {
    let weight_x = offset.x.abs() * rect.h;
    let weight_y = offset.y.abs() * rect.w;
    if offset.x != 0.0 && (weight_x >= weight_y || offset.y == 0.0) {
        Vec2::new(sign(offset.x), 0.0)
    } else if offset.y != 0.0 {
        Vec2::new(0.0, sign(offset.y))
    } else {
        Vec2::ZERO
    }
}

/// Like `f32::signum` but zero for zero.
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
