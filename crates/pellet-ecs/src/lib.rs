//! Pellet ECS -- static-storage Entity Component System with signature queries.
//!
//! Entities are small integer ids drawn from a fixed pool. Every component
//! type gets a buffer with one slot per possible id, created the first time
//! the type is used, and a shared validity bitmap records which slots hold
//! live data. Systems select entities with [`Signature`](signature::Signature)s:
//! bit-vectors over component ids.
//!
//! # Quick Start
//!
//! ```
//! use pellet_ecs::prelude::*;
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! #[derive(Debug, Clone, Default, PartialEq)]
//! struct Speed(f32);
//!
//! let mut world = World::new();
//! let e = world.create();
//! world.set(e, Position { x: 0.0, y: 0.0 }).unwrap();
//! world.set(e, Speed(4.0)).unwrap();
//!
//! let movers = world.signature_of::<(Position, Speed)>().unwrap();
//! assert_eq!(world.filter(&movers), vec![e]);
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod entity;
pub mod signature;
pub mod storage;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ECS operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// Every entity id is in use.
    #[error("entity pool exhausted ({capacity} entities live)")]
    EntityPoolExhausted { capacity: usize },

    /// The sentinel, an out-of-range id, or an id that is not live.
    #[error("entity {entity:?} is not live")]
    InvalidEntity { entity: entity::Entity },

    /// Registering another component type would exceed the id space.
    #[error("component id space exhausted ({capacity} types registered)")]
    ComponentSpaceExhausted { capacity: usize },

    /// A name is already registered for a different Rust type.
    #[error("component name '{name}' is already registered for a different type")]
    DuplicateComponentName { name: String },

    /// A component type was referenced that has not been registered.
    #[error("component type '{name}' not registered")]
    UnregisteredComponent { name: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{Component, ComponentId, ComponentInfo, ComponentRegistry};
    pub use crate::entity::Entity;
    pub use crate::signature::{ComponentSet, Signature};
    pub use crate::world::{World, WorldConfig};
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------
