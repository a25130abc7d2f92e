//! Entity identifiers and the fixed-capacity entity pool.
//!
//! An [`Entity`] is a plain 32-bit id. The value `0` is reserved as the
//! invalid sentinel and is never issued, so every real entity can index
//! component buffers directly.
//!
//! The [`EntityPool`] keeps two lists: an *available* stack that ids are
//! popped from on creation, and a *used* list (creation order) that systems
//! iterate. An id is always in exactly one of the two.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An opaque entity handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(u32);

impl Entity {
    /// The reserved sentinel. Returned when creation fails.
    pub const INVALID: Entity = Entity(0);

    /// Reconstruct from a raw id.
    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw `u32` representation.
    #[inline]
    pub fn to_raw(self) -> u32 {
        self.0
    }

    /// Slot index into component buffers.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// `false` only for the sentinel.
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Entity({})", self.0)
        } else {
            write!(f, "Entity(INVALID)")
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EntityPool
// ---------------------------------------------------------------------------

/// Issues and recycles entity ids from a fixed range `1..=capacity`.
///
/// A fresh pool hands ids out in ascending order. Recycled ids are pushed
/// back on top of the available stack, so the most recently destroyed id is
/// the next one reissued.
#[derive(Debug, Clone)]
pub struct EntityPool {
    /// Stack of ids ready to be issued; the top is the end of the vec.
    available: Vec<Entity>,
    /// Live ids in creation order.
    used: Vec<Entity>,
    /// Membership flag per id, indexed by `Entity::index`.
    live: Vec<bool>,
}

impl EntityPool {
    /// Create a pool able to hold `capacity` live entities at once.
    pub fn new(capacity: usize) -> Self {
        let available = (1..=capacity as u32).rev().map(Entity).collect();
        Self {
            available,
            used: Vec::with_capacity(capacity),
            live: vec![false; capacity + 1],
        }
    }

    /// Pop the next id off the available stack and mark it used.
    ///
    /// Returns `None` once every id is live.
    pub fn allocate(&mut self) -> Option<Entity> {
        let entity = self.available.pop()?;
        self.live[entity.index()] = true;
        self.used.push(entity);
        Some(entity)
    }

    /// Return a live id to the available stack.
    ///
    /// Removing the last used entry is O(1); anything else shifts the tail
    /// down so the used list keeps its creation order. Returns `false` for
    /// the sentinel, out-of-range ids, and ids that are not live.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_live(entity) {
            return false;
        }
        if self.used.last() == Some(&entity) {
            self.used.pop();
        } else if let Some(pos) = self.used.iter().position(|&e| e == entity) {
            self.used.remove(pos);
        }
        self.live[entity.index()] = false;
        self.available.push(entity);
        true
    }

    /// Whether `entity` is currently issued.
    #[inline]
    pub fn is_live(&self, entity: Entity) -> bool {
        entity.is_valid() && self.live.get(entity.index()).copied().unwrap_or(false)
    }

    /// Live ids in creation order.
    #[inline]
    pub fn used(&self) -> &[Entity] {
        &self.used
    }

    /// Number of live ids.
    pub fn live_count(&self) -> usize {
        self.used.len()
    }

    /// Number of ids left to issue.
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Maximum number of simultaneously live ids.
    pub fn capacity(&self) -> usize {
        self.live.len() - 1
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
