//! A small breakout game built on the engine: a menu with clickable buttons
//! and a gameplay scene with a paddle, a ball and a grid of blocks.

pub mod components;
pub mod scenes;
pub mod systems;

use pellet_ecs::EcsError;

use crate::schedule::ScheduleError;

pub use scenes::{Breakout, SceneKind, SceneRequest, Transition};

/// Errors raised while building a scene.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Ecs(#[from] EcsError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
