//! Pellet Engine -- frame loop, two-phase scheduler and 2D collision helpers
//! on top of [`pellet_ecs`].
//!
//! # Modules
//!
//! - [`geometry`]: vectors, shapes, intersection tests with contact normals
//!   and reflection.
//! - [`schedule`]: ordered update/render system registries bound to
//!   signatures.
//! - [`platform`]: renderer, input and event collaborators, with headless
//!   implementations.
//! - [`app`]: the [`Engine`](app::Engine) that owns everything and runs
//!   frames.
//! - [`config`]: JSON-loadable engine configuration.
//! - [`breakout`]: a small game built on the above.

#![deny(unsafe_code)]

pub mod app;
pub mod breakout;
pub mod config;
pub mod geometry;
pub mod platform;
pub mod schedule;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::app::Engine;
    pub use crate::config::{ConfigError, EngineConfig, Screen};
    pub use crate::geometry::{
        circle_vs_capsule, circle_vs_circle, circle_vs_rect, dot, normalise, reflect, Capsule,
        Circle, Rect, Vec2,
    };
    pub use crate::platform::{
        Atlas, Cell, CellSize, Colour, Event, EventKind, InputState, Key, MouseButton,
        RecordingRenderer, Renderer,
    };
    pub use crate::schedule::{
        FrameDiagnostics, RenderContext, Schedule, ScheduleConfig, ScheduleError, SystemId,
        UpdateContext,
    };
    pub use pellet_ecs::prelude::*;
}
