//! Component types for the breakout game.
//!
//! Positions are top-left corners in screen pixels; `Size` is the full
//! extent. Collider shapes are derived from the two.

use crate::geometry::{Capsule, Circle, Rect, Vec2};
use crate::platform::{Atlas, Cell, Colour, Key};

use super::scenes::Transition;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub Vec2);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size(pub Vec2);

/// Pixels per second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Speed(pub f32);

/// Unit direction of travel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Direction(pub Vec2);

/// Keys that steer an entity horizontally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controller {
    pub left: Key,
    pub right: Key,
}

impl Default for Controller {
    fn default() -> Self {
        Self {
            left: Key::A,
            right: Key::D,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sprite {
    pub atlas: Atlas,
    pub cell: Cell,
}

/// Outline colour for collider debug drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DebugColour(pub Colour);

/// World-space rectangle, refreshed from position and size every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RectCollider(pub Rect);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CircleCollider {
    pub radius: f32,
}

/// Marks an entity as a capsule the size of its bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CapsuleCollider;

/// A breakable block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub hits_left: u32,
    pub points: u32,
}

impl Default for Block {
    fn default() -> Self {
        Self {
            hits_left: 1,
            points: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Score(pub u32);

/// A clickable menu button.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Button {
    pub label: String,
    pub target: Transition,
}

// ---------------------------------------------------------------------------
// Shape helpers
// ---------------------------------------------------------------------------

pub fn bounds(position: Position, size: Size) -> Rect {
    Rect::new(position.0.x, position.0.y, size.0.x, size.0.y)
}

/// Circle centered in the bounding box.
pub fn circle(position: Position, size: Size, collider: CircleCollider) -> Circle {
    Circle {
        center: bounds(position, size).center(),
        radius: collider.radius,
    }
}

/// Capsule filling the bounding box.
pub fn capsule(position: Position, size: Size) -> Capsule {
    Capsule::new(bounds(position, size).center(), size.0 * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_follow_bounding_box() {
        let pos = Position(Vec2::new(100.0, 500.0));
        let size = Size(Vec2::new(96.0, 24.0));
        assert_eq!(bounds(pos, size), Rect::new(100.0, 500.0, 96.0, 24.0));

        let cap = capsule(pos, size);
        assert_eq!(cap.center, Vec2::new(148.0, 512.0));
        assert_eq!(cap.radius(), 12.0);

        let c = circle(pos, Size(Vec2::new(16.0, 16.0)), CircleCollider { radius: 8.0 });
        assert_eq!(c, Circle::new(108.0, 508.0, 8.0));
    }
}
