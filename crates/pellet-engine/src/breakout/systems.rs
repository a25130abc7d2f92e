//! Update and render systems for the breakout game.
//!
//! Plain functions are stateless systems. Systems that need a signature for
//! a second query, or the scene request cell, are built by a constructor
//! that captures them.

use pellet_ecs::prelude::*;

use crate::geometry::{circle_vs_capsule, circle_vs_rect, dot, normalise, reflect, Circle, Vec2};
use crate::platform::{Colour, MouseButton};
use crate::schedule::{RenderContext, UpdateContext};

use super::components::{
    bounds, capsule, circle, Block, Button, CircleCollider, Controller, DebugColour, Direction,
    Position, RectCollider, Score, Size, Speed, Sprite,
};
use super::scenes::{SceneKind, SceneRequest, Transition};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn bounding(world: &World, e: Entity) -> Option<(Position, Size)> {
    Some((*world.get::<Position>(e)?, *world.get::<Size>(e)?))
}

fn ball_circle(world: &World, e: Entity) -> Option<Circle> {
    let (pos, size) = bounding(world, e)?;
    Some(circle(pos, size, *world.get::<CircleCollider>(e)?))
}

/// Reflect the entity's direction about `normal` if it is heading into the
/// surface. Returns whether it bounced.
fn bounce(world: &mut World, e: Entity, normal: Vec2) -> bool {
    match world.get_mut::<Direction>(e) {
        Some(Direction(d)) if dot(*d, normal) < 0.0 => {
            *d = normalise(reflect(*d, normal));
            true
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Update systems
// ---------------------------------------------------------------------------

/// Steer along x with the controller keys, kept on screen.
pub fn player(ctx: &mut UpdateContext<'_>, e: Entity) {
    let (Some(&controller), Some(&Speed(speed)), Some(&Size(size))) = (
        ctx.world.get::<Controller>(e),
        ctx.world.get::<Speed>(e),
        ctx.world.get::<Size>(e),
    ) else {
        return;
    };
    let mut dx = 0.0;
    if ctx.input.is_down(controller.left) {
        dx -= 1.0;
    }
    if ctx.input.is_down(controller.right) {
        dx += 1.0;
    }
    let max_x = (ctx.screen.width - size.x).max(0.0);
    if let Some(Position(p)) = ctx.world.get_mut::<Position>(e) {
        p.x = (p.x + dx * speed * ctx.dt).clamp(0.0, max_x);
    }
}

/// Move along the direction and bounce off the left, right and top edges.
/// Falling past the bottom edge loses the ball and ends the game.
pub fn ball_movement(request: SceneRequest) -> impl FnMut(&mut UpdateContext<'_>, Entity) {
    move |ctx: &mut UpdateContext<'_>, e: Entity| {
        let (Some(&Speed(speed)), Some(&Size(size)), Some(&Direction(dir))) = (
            ctx.world.get::<Speed>(e),
            ctx.world.get::<Size>(e),
            ctx.world.get::<Direction>(e),
        ) else {
            return;
        };
        let screen = ctx.screen;
        let Some(Position(p)) = ctx.world.get_mut::<Position>(e) else {
            return;
        };
        *p += normalise(dir) * (speed * ctx.dt);

        let mut normal = Vec2::ZERO;
        if p.x < 0.0 {
            p.x = 0.0;
            normal.x = 1.0;
        } else if p.x + size.x > screen.width {
            p.x = screen.width - size.x;
            normal.x = -1.0;
        }
        if p.y < 0.0 {
            p.y = 0.0;
            normal.y = 1.0;
        }
        let lost = p.y > screen.height;

        if normal.x != 0.0 {
            bounce(ctx.world, e, Vec2::new(normal.x, 0.0));
        }
        if normal.y != 0.0 {
            bounce(ctx.world, e, Vec2::new(0.0, normal.y));
        }
        if lost {
            tracing::debug!(entity = %e, "ball lost");
            ctx.world.destroy(e);
            request.set(Some(Transition::Enter(SceneKind::Menu)));
        }
    }
}

/// Keep rectangle colliders on top of their entity.
pub fn collider_sync(ctx: &mut UpdateContext<'_>, e: Entity) {
    let Some((pos, size)) = bounding(ctx.world, e) else {
        return;
    };
    if let Some(collider) = ctx.world.get_mut::<RectCollider>(e) {
        collider.0 = bounds(pos, size);
    }
}

/// Bounce the ball off any paddle matching `paddles`.
pub fn ball_vs_paddle(paddles: Signature) -> impl FnMut(&mut UpdateContext<'_>, Entity) {
    move |ctx: &mut UpdateContext<'_>, e: Entity| {
        let Some(ball) = ball_circle(ctx.world, e) else {
            return;
        };
        for paddle in ctx.world.filter(&paddles) {
            let Some((pos, size)) = bounding(ctx.world, paddle) else {
                continue;
            };
            if let Some(normal) = circle_vs_capsule(ball, capsule(pos, size)) {
                bounce(ctx.world, e, normal);
                break;
            }
        }
    }
}

/// Bounce the ball off the first block it touches, chip the block and
/// destroy it once it has no hits left. Clearing the last block ends the
/// game.
pub fn ball_vs_blocks(
    blocks: Signature,
    scores: Signature,
    request: SceneRequest,
) -> impl FnMut(&mut UpdateContext<'_>, Entity) {
    move |ctx: &mut UpdateContext<'_>, e: Entity| {
        let Some(ball) = ball_circle(ctx.world, e) else {
            return;
        };
        let hit = ctx.world.filter(&blocks).into_iter().find_map(|block| {
            let rect = ctx.world.get::<RectCollider>(block)?.0;
            circle_vs_rect(ball, rect).map(|normal| (block, normal))
        });
        let Some((block, normal)) = hit else {
            return;
        };
        bounce(ctx.world, e, normal);

        let Some(state) = ctx.world.get_mut::<Block>(block) else {
            return;
        };
        state.hits_left = state.hits_left.saturating_sub(1);
        if state.hits_left > 0 {
            return;
        }
        let points = state.points;
        ctx.world.destroy(block);
        for holder in ctx.world.filter(&scores) {
            if let Some(score) = ctx.world.get_mut::<Score>(holder) {
                score.0 += points;
            }
        }
        tracing::debug!(block = %block, points, "block broken");

        if ctx.world.filter(&blocks).is_empty() {
            tracing::debug!("all blocks cleared");
            request.set(Some(Transition::Enter(SceneKind::Menu)));
        }
    }
}

/// Queue the button's transition when it is clicked.
pub fn menu_buttons(request: SceneRequest) -> impl FnMut(&mut UpdateContext<'_>, Entity) {
    move |ctx: &mut UpdateContext<'_>, e: Entity| {
        if !ctx.input.mouse_was_pressed(MouseButton::Left) {
            return;
        }
        let (Some((pos, size)), Some(button)) =
            (bounding(ctx.world, e), ctx.world.get::<Button>(e))
        else {
            return;
        };
        if bounds(pos, size).contains(ctx.input.mouse_position()) {
            tracing::debug!(label = %button.label, "button clicked");
            request.set(Some(button.target));
        }
    }
}

// ---------------------------------------------------------------------------
// Render systems
// ---------------------------------------------------------------------------

pub fn draw_sprites(ctx: &mut RenderContext<'_>, e: Entity) {
    let world = ctx.world;
    if let (Some((pos, size)), Some(sprite)) = (bounding(world, e), world.get::<Sprite>(e)) {
        ctx.renderer.draw_sprite(sprite.atlas, sprite.cell, bounds(pos, size));
    }
}

pub fn draw_debug_rects(ctx: &mut RenderContext<'_>, e: Entity) {
    let world = ctx.world;
    if let (Some(rect), Some(colour)) = (world.get::<RectCollider>(e), world.get::<DebugColour>(e)) {
        ctx.renderer.draw_rect(rect.0, colour.0, false);
    }
}

pub fn draw_debug_circles(ctx: &mut RenderContext<'_>, e: Entity) {
    let world = ctx.world;
    if let (Some(c), Some(colour)) = (ball_circle(world, e), world.get::<DebugColour>(e)) {
        ctx.renderer.draw_circle(c, colour.0);
    }
}

pub fn draw_debug_capsules(ctx: &mut RenderContext<'_>, e: Entity) {
    let world = ctx.world;
    if let (Some((pos, size)), Some(colour)) =
        (bounding(world, e), world.get::<DebugColour>(e))
    {
        ctx.renderer.draw_capsule(capsule(pos, size), colour.0);
    }
}

pub fn draw_buttons(ctx: &mut RenderContext<'_>, e: Entity) {
    let world = ctx.world;
    if let (Some((pos, size)), Some(button)) = (bounding(world, e), world.get::<Button>(e)) {
        let rect = bounds(pos, size);
        ctx.renderer.draw_rect(rect, Colour::GREY, true);
        ctx.renderer.draw_text(&button.label, rect, Colour::WHITE);
    }
}

pub fn draw_score(ctx: &mut RenderContext<'_>, e: Entity) {
    let world = ctx.world;
    if let (Some((pos, size)), Some(score)) = (bounding(world, e), world.get::<Score>(e)) {
        ctx.renderer
            .draw_text(&format!("Score: {}", score.0), bounds(pos, size), Colour::WHITE);
    }
}
