//! Component type registration and metadata.
//!
//! Component types are registered the first time they are used, either
//! explicitly through [`ComponentRegistry::register`] or lazily when a value
//! is first stored. Registration hands out dense [`ComponentId`]s starting at
//! zero in first-use order; the id is also the column index in the validity
//! bitmap, so the registry refuses to grow past its configured capacity.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use crate::EcsError;

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Marker for types that can be stored as components.
///
/// Slots are pre-filled with `Default::default()` when a type's buffer is
/// created, and `Clone` is what [`World::clone_entity`](crate::world::World::clone_entity)
/// uses to deep-copy a slot.
pub trait Component: Clone + Default + 'static {}

impl<T: Clone + Default + 'static> Component for T {}

// ---------------------------------------------------------------------------
// ComponentId
// ---------------------------------------------------------------------------

/// Dense identifier for a registered component type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u32);

impl ComponentId {
    /// Build an id from its raw index.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Bit/column index of this component.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// ComponentInfo
// ---------------------------------------------------------------------------

/// Metadata about a registered component type.
#[derive(Debug, Clone)]
pub struct ComponentInfo {
    /// Id assigned at registration time.
    pub id: ComponentId,
    /// Human-readable name.
    pub name: String,
    /// `std::mem::size_of::<T>()`
    pub size: usize,
    /// Rust `TypeId` for downcasting the column.
    pub type_id: TypeId,
}

// ---------------------------------------------------------------------------
// ComponentRegistry
// ---------------------------------------------------------------------------

/// Maps Rust types to [`ComponentId`]s and keeps their metadata.
#[derive(Debug)]
pub struct ComponentRegistry {
    by_type: HashMap<TypeId, ComponentId>,
    by_name: HashMap<String, ComponentId>,
    /// Indexed by `ComponentId`.
    infos: Vec<ComponentInfo>,
    capacity: usize,
}

impl ComponentRegistry {
    /// Create an empty registry that accepts at most `capacity` types.
    pub fn new(capacity: usize) -> Self {
        Self {
            by_type: HashMap::new(),
            by_name: HashMap::new(),
            infos: Vec::new(),
            capacity,
        }
    }

    /// Register `T` under `name`.
    ///
    /// Registering an already-known type returns its existing id and ignores
    /// `name`. Fails when the id space is exhausted or when `name` is taken by
    /// a different type.
    pub fn register<T: 'static>(&mut self, name: &str) -> Result<ComponentId, EcsError> {
        let rust_type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&rust_type_id) {
            return Ok(existing);
        }
        if self.infos.len() >= self.capacity {
            return Err(EcsError::ComponentSpaceExhausted {
                capacity: self.capacity,
            });
        }
        if self.by_name.contains_key(name) {
            return Err(EcsError::DuplicateComponentName {
                name: name.to_owned(),
            });
        }

        let id = ComponentId(self.infos.len() as u32);
        self.infos.push(ComponentInfo {
            id,
            name: name.to_owned(),
            size: std::mem::size_of::<T>(),
            type_id: rust_type_id,
        });
        self.by_type.insert(rust_type_id, id);
        self.by_name.insert(name.to_owned(), id);
        tracing::debug!(component = name, id = id.0, "registered component type");
        Ok(id)
    }

    /// Register `T` under a name derived from its Rust type.
    ///
    /// Uses the last path segment (`Position` for `game::Position`), falling
    /// back to the full type path if that short name is already taken.
    pub fn register_default<T: 'static>(&mut self) -> Result<ComponentId, EcsError> {
        if let Some(id) = self.lookup::<T>() {
            return Ok(id);
        }
        let full = std::any::type_name::<T>();
        let short = short_type_name(full);
        if self.by_name.contains_key(short) {
            self.register::<T>(full)
        } else {
            self.register::<T>(short)
        }
    }

    /// Look up a component type by its Rust type.
    pub fn lookup<T: 'static>(&self) -> Option<ComponentId> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Look up a component type by its registered name.
    pub fn lookup_by_name(&self, name: &str) -> Option<ComponentId> {
        self.by_name.get(name).copied()
    }

    /// Metadata for a registered id.
    pub fn get_info(&self, id: ComponentId) -> Option<&ComponentInfo> {
        self.infos.get(id.index())
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Whether no types are registered.
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Maximum number of types.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Registered names in id order.
    pub fn registered_names(&self) -> Vec<&str> {
        self.infos.iter().map(|info| info.name.as_str()).collect()
    }
}

/// Last path segment of a type name, ignoring generic arguments.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
