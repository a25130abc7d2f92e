//! Scene setup and transitions.
//!
//! A scene is a population of entities plus the systems that drive them.
//! Systems never swap scenes themselves: they write a [`Transition`] into the
//! shared [`SceneRequest`] cell and [`Breakout`] applies it between frames,
//! once the schedule is no longer running.

use std::cell::Cell;
use std::rc::Rc;

use pellet_ecs::prelude::*;

use crate::app::Engine;
use crate::geometry::{normalise, Vec2};
use crate::platform::{Atlas, Cell as AtlasCell, Colour, Renderer};

use super::components::{
    bounds, Block, Button, CapsuleCollider, CircleCollider, Controller, DebugColour, Direction,
    Position, RectCollider, Score, Size, Speed, Sprite,
};
use super::systems;
use super::GameError;

/// Block grid layout.
pub const BLOCK_COLUMNS: usize = 10;
pub const BLOCK_ROWS: usize = 5;
pub const BLOCK_SIZE: f32 = 64.0;
pub const BLOCK_ORIGIN: Vec2 = Vec2::new(80.0, 20.0);

const PADDLE_SIZE: Vec2 = Vec2::new(96.0, 24.0);
const PADDLE_SPEED: f32 = 360.0;
const BALL_SIZE: f32 = 16.0;
const BALL_SPEED: f32 = 300.0;
const BUTTON_SIZE: Vec2 = Vec2::new(200.0, 60.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SceneKind {
    #[default]
    Menu,
    Gameplay,
}

/// A change requested by a system, applied after the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Enter(SceneKind),
    Quit,
}

impl Default for Transition {
    fn default() -> Self {
        Transition::Enter(SceneKind::Menu)
    }
}

/// Shared slot systems write transitions into.
pub type SceneRequest = Rc<Cell<Option<Transition>>>;

// ---------------------------------------------------------------------------
// Breakout
// ---------------------------------------------------------------------------

/// Drives the game on top of an [`Engine`].
#[derive(Debug)]
pub struct Breakout {
    request: SceneRequest,
    current: SceneKind,
}

impl Breakout {
    /// Load the menu scene into `engine`.
    pub fn start<R: Renderer>(engine: &mut Engine<R>) -> Result<Self, GameError> {
        let mut game = Self {
            request: Rc::new(Cell::new(None)),
            current: SceneKind::Menu,
        };
        game.enter(engine, SceneKind::Menu)?;
        Ok(game)
    }

    pub fn current(&self) -> SceneKind {
        self.current
    }

    /// The request cell systems of this game write into.
    pub fn request(&self) -> SceneRequest {
        Rc::clone(&self.request)
    }

    /// Run one engine frame, then apply any transition it requested.
    pub fn frame<R: Renderer>(&mut self, engine: &mut Engine<R>, dt: f32) -> Result<(), GameError> {
        engine.frame(dt);
        self.apply_pending(engine)?;
        Ok(())
    }

    /// Apply a queued transition. Returns whether there was one.
    pub fn apply_pending<R: Renderer>(&mut self, engine: &mut Engine<R>) -> Result<bool, GameError> {
        match self.request.take() {
            Some(Transition::Enter(kind)) => {
                self.enter(engine, kind)?;
                Ok(true)
            }
            Some(Transition::Quit) => {
                tracing::debug!("quit requested");
                engine.stop();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Tear down the current scene and build `kind`.
    pub fn enter<R: Renderer>(&mut self, engine: &mut Engine<R>, kind: SceneKind) -> Result<(), GameError> {
        engine.schedule_mut().clear_all();
        engine.world_mut().clear();
        match kind {
            SceneKind::Menu => load_menu(engine, &self.request)?,
            SceneKind::Gameplay => load_gameplay(engine, &self.request)?,
        }
        tracing::debug!(from = ?self.current, to = ?kind, "scene entered");
        self.current = kind;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scene population
// ---------------------------------------------------------------------------

/// Two buttons, the second cloned from the first.
pub fn load_menu<R: Renderer>(engine: &mut Engine<R>, request: &SceneRequest) -> Result<(), GameError> {
    let screen = engine.screen();
    let world = engine.world_mut();

    let left = (screen.width - BUTTON_SIZE.x) / 2.0;
    let play = world.try_create()?;
    world.set(play, Position(Vec2::new(left, 220.0)))?;
    world.set(play, Size(BUTTON_SIZE))?;
    world.set(
        play,
        Button {
            label: "Play".to_owned(),
            target: Transition::Enter(SceneKind::Gameplay),
        },
    )?;
    world.set(play, DebugColour(Colour::WHITE))?;
    world.set(play, RectCollider::default())?;

    let quit = world.clone_entity(play);
    if !quit.is_valid() {
        return Err(EcsError::EntityPoolExhausted {
            capacity: world.capacity(),
        }
        .into());
    }
    world.set(quit, Position(Vec2::new(left, 320.0)))?;
    world.set(
        quit,
        Button {
            label: "Quit".to_owned(),
            target: Transition::Quit,
        },
    )?;

    let sync = world.signature_of::<(Position, Size, RectCollider)>()?;
    let buttons = world.signature_of::<(Position, Size, Button)>()?;
    let outlines = world.signature_of::<(RectCollider, DebugColour)>()?;

    let schedule = engine.schedule_mut();
    schedule.add_update("collider_sync", sync, systems::collider_sync)?;
    schedule.add_update("menu_buttons", buttons.clone(), systems::menu_buttons(Rc::clone(request)))?;
    schedule.add_render("draw_buttons", buttons, systems::draw_buttons)?;
    schedule.add_render("draw_debug_rects", outlines, systems::draw_debug_rects)?;
    Ok(())
}

/// Block grid, paddle, ball and score display.
pub fn load_gameplay<R: Renderer>(engine: &mut Engine<R>, request: &SceneRequest) -> Result<(), GameError> {
    let screen = engine.screen();
    let world = engine.world_mut();

    for row in 0..BLOCK_ROWS {
        for column in 0..BLOCK_COLUMNS {
            let block = world.try_create()?;
            let pos = Position(BLOCK_ORIGIN + Vec2::new(column as f32, row as f32) * BLOCK_SIZE);
            let size = Size(Vec2::new(BLOCK_SIZE, BLOCK_SIZE));
            world.set(block, pos)?;
            world.set(block, size)?;
            world.set(block, RectCollider(bounds(pos, size)))?;
            world.set(
                block,
                Block {
                    hits_left: if row == 0 { 2 } else { 1 },
                    points: 10 * (BLOCK_ROWS - row) as u32,
                },
            )?;
            world.set(
                block,
                Sprite {
                    atlas: Atlas::Tiles,
                    cell: AtlasCell::new(1, 1),
                },
            )?;
            world.set(block, DebugColour(Colour::RED))?;
        }
    }

    let paddle = world.try_create()?;
    world.set(
        paddle,
        Position(Vec2::new(
            (screen.width - PADDLE_SIZE.x) / 2.0,
            screen.height - 60.0,
        )),
    )?;
    world.set(paddle, Size(PADDLE_SIZE))?;
    world.set(paddle, Speed(PADDLE_SPEED))?;
    world.set(paddle, Controller::default())?;
    world.set(paddle, CapsuleCollider)?;
    world.set(
        paddle,
        Sprite {
            atlas: Atlas::Entities,
            cell: AtlasCell::new(0, 0),
        },
    )?;
    world.set(paddle, DebugColour(Colour::GREEN))?;

    let ball = world.try_create()?;
    world.set(
        ball,
        Position(Vec2::new(
            (screen.width - BALL_SIZE) / 2.0,
            screen.height - 120.0,
        )),
    )?;
    world.set(ball, Size(Vec2::new(BALL_SIZE, BALL_SIZE)))?;
    world.set(ball, Speed(BALL_SPEED))?;
    world.set(ball, Direction(normalise(Vec2::new(0.6, -0.8))))?;
    world.set(
        ball,
        CircleCollider {
            radius: BALL_SIZE / 2.0,
        },
    )?;
    world.set(
        ball,
        Sprite {
            atlas: Atlas::Entities,
            cell: AtlasCell::new(1, 0),
        },
    )?;
    world.set(ball, DebugColour(Colour::BLUE))?;

    let hud = world.try_create()?;
    world.set(hud, Position(Vec2::new(10.0, screen.height - 30.0)))?;
    world.set(hud, Size(Vec2::new(200.0, 20.0)))?;
    world.set(hud, Score(0))?;

    let players = world.signature_of::<(Controller, Position, Size, Speed)>()?;
    let movers = world.signature_of::<(Position, Size, Speed, Direction)>()?;
    let controlled = world.signature_of::<(Controller,)>()?;
    let sync = world.signature_of::<(Position, Size, RectCollider)>()?;
    let balls = world.signature_of::<(Position, Size, Direction, CircleCollider)>()?;
    let paddles = world.signature_of::<(Position, Size, CapsuleCollider)>()?;
    let blocks = world.signature_of::<(RectCollider, Block)>()?;
    let scores = world.signature_of::<(Score,)>()?;
    let sprites = world.signature_of::<(Position, Size, Sprite)>()?;
    let outlines = world.signature_of::<(RectCollider, DebugColour)>()?;
    let circles = world.signature_of::<(Position, Size, CircleCollider, DebugColour)>()?;
    let capsules = world.signature_of::<(Position, Size, CapsuleCollider, DebugColour)>()?;
    let labels = world.signature_of::<(Position, Size, Score)>()?;

    let schedule = engine.schedule_mut();
    schedule.add_update("player", players, systems::player)?;
    schedule.add_update_excluding(
        "ball_movement",
        movers,
        controlled,
        systems::ball_movement(Rc::clone(request)),
    )?;
    schedule.add_update("collider_sync", sync, systems::collider_sync)?;
    schedule.add_update("ball_vs_paddle", balls.clone(), systems::ball_vs_paddle(paddles))?;
    schedule.add_update(
        "ball_vs_blocks",
        balls,
        systems::ball_vs_blocks(blocks, scores, Rc::clone(request)),
    )?;

    schedule.add_render("draw_sprites", sprites, systems::draw_sprites)?;
    schedule.add_render("draw_debug_rects", outlines, systems::draw_debug_rects)?;
    schedule.add_render("draw_debug_circles", circles, systems::draw_debug_circles)?;
    schedule.add_render("draw_debug_capsules", capsules, systems::draw_debug_capsules)?;
    schedule.add_render("draw_score", labels, systems::draw_score)?;
    Ok(())
}
