//! The [`World`] is the top-level container for the ECS. It owns the entity
//! pool and the component store, and answers signature queries over the
//! live entity set.

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentId, ComponentRegistry};
use crate::entity::{Entity, EntityPool};
use crate::signature::{ComponentSet, Signature};
use crate::storage::ComponentStore;
use crate::EcsError;

// ---------------------------------------------------------------------------
// WorldConfig
// ---------------------------------------------------------------------------

/// Capacity limits for a [`World`]. Everything is allocated up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Maximum number of simultaneously live entities.
    pub max_entities: usize,
    /// Maximum number of distinct component types.
    pub max_components: usize,
}

impl Default for WorldConfig {
    /// 255 entities, 32 component types.
    fn default() -> Self {
        Self {
            max_entities: 255,
            max_components: 32,
        }
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Owns entities and all component data.
///
/// Component buffers are indexed directly by entity id; each type's buffer is
/// created the first time the type is used. Invalid entity usage never
/// panics: it is logged and reported through the return value.
pub struct World {
    config: WorldConfig,
    entities: EntityPool,
    store: ComponentStore,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("live", &self.entities.live_count())
            .field("capacity", &self.entities.capacity())
            .field("components", &self.store.registry().len())
            .finish()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a world with the default capacities.
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world with explicit capacities.
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            entities: EntityPool::new(config.max_entities),
            store: ComponentStore::new(config.max_entities + 1, config.max_components),
            config,
        }
    }

    /// The capacities this world was built with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Read-only access to the component registry.
    pub fn registry(&self) -> &ComponentRegistry {
        self.store.registry()
    }

    /// Read-only access to the component store.
    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Create an entity, or report that the pool is exhausted.
    pub fn try_create(&mut self) -> Result<Entity, EcsError> {
        self.entities.allocate().ok_or(EcsError::EntityPoolExhausted {
            capacity: self.entities.capacity(),
        })
    }

    /// Create an entity. Returns [`Entity::INVALID`] when the pool is full.
    pub fn create(&mut self) -> Entity {
        match self.try_create() {
            Ok(entity) => entity,
            Err(err) => {
                tracing::warn!(error = %err, "entity creation failed");
                Entity::INVALID
            }
        }
    }

    /// Destroy a live entity, detaching all of its components first.
    ///
    /// Returns `false` (and does nothing) for the sentinel or an id that is
    /// not live.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.entities.is_live(entity) {
            return false;
        }
        self.store.clear_entity(entity);
        self.entities.deallocate(entity)
    }

    /// Destroy every live entity, most recently created first.
    pub fn clear(&mut self) {
        while let Some(&entity) = self.entities.used().last() {
            self.destroy(entity);
        }
    }

    /// Create a new entity carrying a deep copy of every component on `of`.
    ///
    /// Returns [`Entity::INVALID`] if `of` is not live or the pool is full.
    pub fn clone_entity(&mut self, of: Entity) -> Entity {
        if !self.entities.is_live(of) {
            tracing::warn!(entity = %of, "clone of an entity that is not live ignored");
            return Entity::INVALID;
        }
        let copy = self.create();
        if copy.is_valid() {
            self.store.copy_entity(of, copy);
        }
        copy
    }

    /// Whether `entity` is currently live.
    pub fn is_live(&self, entity: Entity) -> bool {
        self.entities.is_live(entity)
    }

    /// Live entities in creation order.
    pub fn entities(&self) -> &[Entity] {
        self.entities.used()
    }

    /// Number of live entities.
    pub fn live_count(&self) -> usize {
        self.entities.live_count()
    }

    /// Number of ids still available.
    pub fn available_count(&self) -> usize {
        self.entities.available_count()
    }

    /// Maximum number of live entities.
    pub fn capacity(&self) -> usize {
        self.entities.capacity()
    }

    // -- components -----------------------------------------------------------

    /// Register `T` under an explicit name.
    ///
    /// Optional: types are registered under their type name on first use.
    pub fn register_component<T: Component>(&mut self, name: &str) -> Result<ComponentId, EcsError> {
        self.store.register::<T>(name)
    }

    /// The id of `T`, if it has been registered.
    pub fn component_id<T: Component>(&self) -> Option<ComponentId> {
        self.store.registry().lookup::<T>()
    }

    /// Attach (or overwrite) `T` on `entity`.
    ///
    /// Fails without side effects if `entity` is not live or if registering
    /// `T` would exceed the component capacity.
    pub fn set<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        if !self.entities.is_live(entity) {
            let err = EcsError::InvalidEntity { entity };
            tracing::warn!(
                error = %err,
                component = std::any::type_name::<T>(),
                "component set ignored"
            );
            return Err(err);
        }
        self.store.insert(entity, value).inspect_err(|err| {
            tracing::warn!(error = %err, entity = %entity, "component set failed");
        })
    }

    /// Whether `T` is attached to `entity`.
    pub fn exists<T: Component>(&self, entity: Entity) -> bool {
        entity.is_valid() && self.store.exists::<T>(entity)
    }

    /// Slot for `T` on `entity`, whether or not the component is attached.
    ///
    /// `None` only when `T` was never registered or `entity` is the sentinel
    /// or out of range. Reading a slot without checking
    /// [`exists`](Self::exists) yields the default or a stale value.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !entity.is_valid() {
            return None;
        }
        self.store.get::<T>(entity)
    }

    /// Mutable slot for `T` on `entity`; same rules as [`get`](Self::get).
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !entity.is_valid() {
            return None;
        }
        self.store.get_mut::<T>(entity)
    }

    /// Detach `T` from `entity`. Returns whether it was attached.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> bool {
        entity.is_valid() && self.store.remove::<T>(entity)
    }

    // -- signatures & queries -------------------------------------------------

    /// Build an inclusion signature for a tuple of component types.
    pub fn signature_of<S: ComponentSet>(&mut self) -> Result<Signature, EcsError> {
        let ids = S::component_ids(&mut self.store)?;
        Ok(Signature::from_ids(&ids))
    }

    /// Snapshot `entity`'s full component set. `count` is `max_components`.
    pub fn signature_from_entity(&self, entity: Entity) -> Signature {
        let count = self.config.max_components;
        if !entity.is_valid() || entity.index() >= self.store.slots() {
            return Signature::from_row(&[], count);
        }
        Signature::from_row(self.store.validity().row(entity.index()), count)
    }

    /// Whether `entity` has every component set in `signature`.
    ///
    /// Components the signature does not mention are unconstrained.
    pub fn fulfils(&self, entity: Entity, signature: &Signature) -> bool {
        if !entity.is_valid() || entity.index() >= self.store.slots() {
            return false;
        }
        signature.is_subset_of(self.store.validity().row(entity.index()))
    }

    /// Whether `entity` has none of the components set in `signature`.
    pub fn lacks_all(&self, entity: Entity, signature: &Signature) -> bool {
        if !entity.is_valid() || entity.index() >= self.store.slots() {
            return false;
        }
        signature.is_disjoint_from(self.store.validity().row(entity.index()))
    }

    /// Live entities fulfilling `signature`, each exactly once, in creation order.
    pub fn filter(&self, signature: &Signature) -> Vec<Entity> {
        self.entities
            .used()
            .iter()
            .copied()
            .filter(|&e| self.fulfils(e, signature))
            .collect()
    }

    /// Live entities fulfilling `include` that carry none of `exclude`'s
    /// components.
    pub fn filter_excluding(&self, include: &Signature, exclude: &Signature) -> Vec<Entity> {
        self.entities
            .used()
            .iter()
            .copied()
            .filter(|&e| self.fulfils(e, include) && self.lacks_all(e, exclude))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Speed(f32);

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Controller;

    fn small_world() -> World {
        World::with_config(WorldConfig {
            max_entities: 4,
            max_components: 8,
        })
    }

    #[test]
    fn create_until_exhausted_then_sentinel() {
        let mut world = small_world();
        for _ in 0..4 {
            assert!(world.create().is_valid());
        }
        assert_eq!(world.create(), Entity::INVALID);
        assert!(matches!(
            world.try_create(),
            Err(EcsError::EntityPoolExhausted { capacity: 4 })
        ));
    }

    #[test]
    fn recreated_id_has_no_components() {
        let mut world = small_world();
        let e = world.create();
        world.set(e, Speed(2.0)).unwrap();
        world.set(e, Position { x: 1.0, y: 1.0 }).unwrap();
        assert!(world.destroy(e));

        let again = world.create();
        assert_eq!(again, e);
        assert!(!world.exists::<Speed>(again));
        assert!(!world.exists::<Position>(again));
    }

    #[test]
    fn destroy_is_noop_for_sentinel_and_dead_ids() {
        let mut world = small_world();
        assert!(!world.destroy(Entity::INVALID));
        let e = world.create();
        assert!(world.destroy(e));
        assert!(!world.destroy(e));
        assert_eq!(world.live_count(), 0);
        assert_eq!(world.available_count(), 4);
    }

    #[test]
    fn set_on_invalid_entity_is_rejected() {
        let mut world = small_world();
        let err = world.set(Entity::INVALID, Speed(1.0)).unwrap_err();
        assert!(matches!(err, EcsError::InvalidEntity { .. }));
        assert!(world.set(Entity::from_raw(50), Speed(1.0)).is_err());
        assert!(!world.exists::<Speed>(Entity::INVALID));
        assert_eq!(world.get::<Speed>(Entity::INVALID), None);
    }

    #[test]
    fn get_mut_writes_through() {
        let mut world = small_world();
        let e = world.create();
        world.set(e, Position::default()).unwrap();
        world.get_mut::<Position>(e).unwrap().x = 42.0;
        assert_eq!(world.get::<Position>(e), Some(&Position { x: 42.0, y: 0.0 }));
    }

    #[test]
    fn clear_destroys_everything() {
        let mut world = small_world();
        let ids: Vec<Entity> = (0..3).map(|_| world.create()).collect();
        for &e in &ids {
            world.set(e, Speed(1.0)).unwrap();
        }
        world.clear();
        assert_eq!(world.live_count(), 0);
        assert!(ids.iter().all(|&e| !world.exists::<Speed>(e)));
    }

    #[test]
    fn clone_copies_components_by_value() {
        let mut world = small_world();
        let proto = world.create();
        world.set(proto, Position { x: 3.0, y: 4.0 }).unwrap();
        world.set(proto, Speed(8.0)).unwrap();

        let copy = world.clone_entity(proto);
        assert_ne!(copy, proto);
        assert_eq!(world.get::<Position>(copy), Some(&Position { x: 3.0, y: 4.0 }));
        assert!(world.exists::<Speed>(copy));
        assert!(!world.exists::<Controller>(copy));

        world.get_mut::<Position>(proto).unwrap().x = -1.0;
        assert_eq!(world.get::<Position>(copy).unwrap().x, 3.0);
    }

    #[test]
    fn clone_of_dead_entity_is_sentinel() {
        let mut world = small_world();
        let e = world.create();
        world.destroy(e);
        assert_eq!(world.clone_entity(e), Entity::INVALID);
        assert_eq!(world.live_count(), 0);
    }

    #[test]
    fn fulfils_ignores_unrelated_components() {
        let mut world = small_world();
        let sig = world.signature_of::<(Position, Speed)>().unwrap();
        let a = world.create();
        world.set(a, Position::default()).unwrap();
        world.set(a, Speed(1.0)).unwrap();
        world.set(a, Controller).unwrap();
        let b = world.create();
        world.set(b, Position::default()).unwrap();

        assert!(world.fulfils(a, &sig));
        assert!(!world.fulfils(b, &sig));
        assert_eq!(world.filter(&sig), vec![a]);
    }

    #[test]
    fn filter_returns_each_match_once() {
        let mut world = small_world();
        let sig = world.signature_of::<(Position, Speed, Controller)>().unwrap();
        let e = world.create();
        world.set(e, Position::default()).unwrap();
        world.set(e, Speed(1.0)).unwrap();
        world.set(e, Controller).unwrap();
        assert_eq!(world.filter(&sig), vec![e]);
    }

    #[test]
    fn filter_excluding_drops_entities_with_excluded_component() {
        let mut world = small_world();
        let include = world.signature_of::<(Position, Speed)>().unwrap();
        let exclude = world.signature_of::<(Controller,)>().unwrap();

        let paddle = world.create();
        world.set(paddle, Position::default()).unwrap();
        world.set(paddle, Speed(1.0)).unwrap();
        world.set(paddle, Controller).unwrap();
        let ball = world.create();
        world.set(ball, Position::default()).unwrap();
        world.set(ball, Speed(1.0)).unwrap();

        assert_eq!(world.filter_excluding(&include, &exclude), vec![ball]);
        assert_eq!(
            world.filter_excluding(&include, &Signature::empty()),
            vec![paddle, ball]
        );
    }

    #[test]
    fn signature_from_entity_snapshots_full_row() {
        let mut world = small_world();
        let e = world.create();
        world.set(e, Speed(1.0)).unwrap();
        world.set(e, Controller).unwrap();
        let sig = world.signature_from_entity(e);
        assert_eq!(sig.count(), 8);
        assert_eq!(sig, world.signature_of::<(Speed, Controller)>().unwrap());

        world.remove::<Controller>(e);
        assert!(sig.contains(world.component_id::<Controller>().unwrap()));
        assert!(!world.fulfils(e, &sig));
    }

    #[test]
    fn sentinel_fulfils_nothing() {
        let world = small_world();
        assert!(!world.fulfils(Entity::INVALID, &Signature::empty()));
    }

    #[test]
    fn config_fills_missing_fields_with_defaults() {
        let config: WorldConfig = serde_json::from_str(r#"{"max_entities": 16}"#).unwrap();
        assert_eq!(config.max_entities, 16);
        assert_eq!(config.max_components, 32);
        let world = World::with_config(config);
        assert_eq!(world.capacity(), 16);
    }
}
