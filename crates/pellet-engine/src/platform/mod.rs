//! Collaborators the engine core talks to: renderer, input and events.
//!
//! Only headless implementations live here. A windowed backend implements
//! [`Renderer`] and feeds [`Event`]s into the engine.

pub mod events;
pub mod input;
pub mod render;

pub use events::{Event, EventDispatcher, EventKind, HandlerId};
pub use input::{InputState, Key, MouseButton};
pub use render::{Atlas, Cell, CellSize, Colour, DrawCall, RecordingRenderer, Renderer, SourceRect};
