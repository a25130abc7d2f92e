//! Renderer collaborator interface and a headless recording implementation.
//!
//! The scheduler only ever talks to a `&mut dyn Renderer`. Backends implement
//! the primitive calls; circles and capsules have default implementations
//! built from lines and rectangles so a backend only needs to provide the
//! primitives.

use serde::{Deserialize, Serialize};

use crate::geometry::{Capsule, Circle, Rect, Vec2};

/// Number of segments used to approximate a circle outline.
pub const CIRCLE_SEGMENTS: usize = 48;

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

/// An RGBA colour, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);
    pub const RED: Colour = Colour::rgb(255, 0, 0);
    pub const GREEN: Colour = Colour::rgb(0, 255, 0);
    pub const BLUE: Colour = Colour::rgb(0, 0, 255);
    pub const GREY: Colour = Colour::rgb(136, 136, 136);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

// ---------------------------------------------------------------------------
// Atlases
// ---------------------------------------------------------------------------

/// Which sprite sheet a sprite is cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Atlas {
    #[default]
    Entities,
    Tiles,
}

/// Column/row index of a cell within an atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Pixel size of one atlas cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellSize {
    pub w: u32,
    pub h: u32,
}

impl CellSize {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// The pixel rectangle of `cell` within an atlas of this cell size.
    pub fn source_rect(self, cell: Cell) -> SourceRect {
        SourceRect {
            x: cell.x * self.w,
            y: cell.y * self.h,
            w: self.w,
            h: self.h,
        }
    }
}

/// Integer pixel rectangle inside an atlas texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Drawing surface the render phase draws into.
pub trait Renderer {
    /// Start a new frame.
    fn clear(&mut self);

    /// Finish the frame and show it.
    fn present(&mut self);

    /// Set the cell size used to cut sprites from `atlas`.
    fn set_cell_size(&mut self, atlas: Atlas, size: CellSize);

    fn draw_rect(&mut self, rect: Rect, colour: Colour, filled: bool);

    fn draw_line(&mut self, from: Vec2, to: Vec2, colour: Colour);

    /// Draw the cell at `cell` of `atlas` scaled into `dst`.
    fn draw_sprite(&mut self, atlas: Atlas, cell: Cell, dst: Rect);

    fn draw_text(&mut self, text: &str, dst: Rect, colour: Colour);

    /// Outline `circle` as a closed polygon of [`CIRCLE_SEGMENTS`] lines.
    fn draw_circle(&mut self, circle: Circle, colour: Colour) {
        let point = |i: usize| {
            let theta = std::f32::consts::TAU * i as f32 / CIRCLE_SEGMENTS as f32;
            Vec2::new(
                circle.center.x + circle.radius * theta.cos(),
                circle.center.y + circle.radius * theta.sin(),
            )
        };
        for i in 0..CIRCLE_SEGMENTS {
            self.draw_line(point(i), point(i + 1), colour);
        }
    }

    /// Outline the capsule body and both end caps.
    fn draw_capsule(&mut self, capsule: Capsule, colour: Colour) {
        self.draw_rect(capsule.body(), colour, false);
        for cap in capsule.caps() {
            self.draw_circle(cap, colour);
        }
    }
}

// ---------------------------------------------------------------------------
// RecordingRenderer
// ---------------------------------------------------------------------------

/// One recorded renderer call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Rect {
        rect: Rect,
        colour: Colour,
        filled: bool,
    },
    Line {
        from: Vec2,
        to: Vec2,
        colour: Colour,
    },
    Sprite {
        atlas: Atlas,
        cell: Cell,
        src: SourceRect,
        dst: Rect,
    },
    Text {
        text: String,
        dst: Rect,
        colour: Colour,
    },
}

/// Headless renderer that records draw calls instead of rasterising.
///
/// Calls made between `clear` and `present` accumulate in the current frame;
/// `present` moves them into [`last_frame`](Self::last_frame).
#[derive(Debug)]
pub struct RecordingRenderer {
    current: Vec<DrawCall>,
    last_frame: Vec<DrawCall>,
    frames_presented: u64,
    clears: u64,
    entity_cell: CellSize,
    tile_cell: CellSize,
}

impl Default for RecordingRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self {
            current: Vec::new(),
            last_frame: Vec::new(),
            frames_presented: 0,
            clears: 0,
            entity_cell: CellSize::new(32, 32),
            tile_cell: CellSize::new(18, 18),
        }
    }

    /// Calls recorded since the last `clear`.
    pub fn current_frame(&self) -> &[DrawCall] {
        &self.current
    }

    /// Calls of the most recently presented frame.
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.last_frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    pub fn cell_size(&self, atlas: Atlas) -> CellSize {
        match atlas {
            Atlas::Entities => self.entity_cell,
            Atlas::Tiles => self.tile_cell,
        }
    }

    /// Text strings drawn in the last presented frame, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.last_frame
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self) {
        self.current.clear();
        self.clears += 1;
    }

    fn present(&mut self) {
        self.last_frame = std::mem::take(&mut self.current);
        self.frames_presented += 1;
    }

    fn set_cell_size(&mut self, atlas: Atlas, size: CellSize) {
        match atlas {
            Atlas::Entities => self.entity_cell = size,
            Atlas::Tiles => self.tile_cell = size,
        }
    }

    fn draw_rect(&mut self, rect: Rect, colour: Colour, filled: bool) {
        self.current.push(DrawCall::Rect {
            rect,
            colour,
            filled,
        });
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, colour: Colour) {
        self.current.push(DrawCall::Line { from, to, colour });
    }

    fn draw_sprite(&mut self, atlas: Atlas, cell: Cell, dst: Rect) {
        let src = self.cell_size(atlas).source_rect(cell);
        self.current.push(DrawCall::Sprite {
            atlas,
            cell,
            src,
            dst,
        });
    }

    fn draw_text(&mut self, text: &str, dst: Rect, colour: Colour) {
        self.current.push(DrawCall::Text {
            text: text.to_owned(),
            dst,
            colour,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_rect_scales_cell_index() {
        let src = CellSize::new(18, 18).source_rect(Cell::new(2, 1));
        assert_eq!(src, SourceRect { x: 36, y: 18, w: 18, h: 18 });
    }

    #[test]
    fn sprite_uses_atlas_cell_size() {
        let mut r = RecordingRenderer::new();
        r.set_cell_size(Atlas::Entities, CellSize::new(16, 8));
        r.draw_sprite(Atlas::Entities, Cell::new(1, 3), Rect::new(0.0, 0.0, 16.0, 8.0));
        r.draw_sprite(Atlas::Tiles, Cell::new(1, 1), Rect::new(0.0, 0.0, 18.0, 18.0));
        match &r.current_frame()[..] {
            [DrawCall::Sprite { src: a, .. }, DrawCall::Sprite { src: b, .. }] => {
                assert_eq!(*a, SourceRect { x: 16, y: 24, w: 16, h: 8 });
                assert_eq!(*b, SourceRect { x: 18, y: 18, w: 18, h: 18 });
            }
            other => panic!("unexpected calls: {other:?}"),
        }
    }

    #[test]
    fn circle_is_closed_polygon() {
        let mut r = RecordingRenderer::new();
        r.draw_circle(Circle::new(10.0, 10.0, 5.0), Colour::WHITE);
        let lines: Vec<(Vec2, Vec2)> = r
            .current_frame()
            .iter()
            .map(|c| match c {
                DrawCall::Line { from, to, .. } => (*from, *to),
                other => panic!("unexpected call: {other:?}"),
            })
            .collect();
        assert_eq!(lines.len(), CIRCLE_SEGMENTS);
        let first = lines[0].0;
        let last = lines[CIRCLE_SEGMENTS - 1].1;
        assert!((first.x - last.x).abs() < 1e-3 && (first.y - last.y).abs() < 1e-3);
        assert!((first.x - 15.0).abs() < 1e-5);
    }

    #[test]
    fn capsule_draws_body_and_caps() {
        let mut r = RecordingRenderer::new();
        let cap = Capsule::new(Vec2::new(50.0, 10.0), Vec2::new(30.0, 10.0));
        r.draw_capsule(cap, Colour::GREEN);
        let calls = r.current_frame();
        assert_eq!(calls.len(), 1 + 2 * CIRCLE_SEGMENTS);
        assert_eq!(
            calls[0],
            DrawCall::Rect {
                rect: cap.body(),
                colour: Colour::GREEN,
                filled: false
            }
        );
    }

    #[test]
    fn present_moves_frame() {
        let mut r = RecordingRenderer::new();
        r.clear();
        r.draw_text("score", Rect::new(0.0, 0.0, 50.0, 10.0), Colour::WHITE);
        r.present();
        assert!(r.current_frame().is_empty());
        assert_eq!(r.texts(), vec!["score"]);
        assert_eq!(r.frames_presented(), 1);
        r.clear();
        r.present();
        assert!(r.last_frame().is_empty());
        assert_eq!(r.clear_count(), 2);
    }
}
