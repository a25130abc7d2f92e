//! Direct-indexed component storage.
//!
//! Every registered component type owns one [`Column`]: a boxed slice with a
//! slot for every possible entity id, indexed by [`Entity::index`]. Whether a
//! slot currently holds live data is recorded in a single [`ValidityBitmap`]
//! shared by all types, one row per entity and one bit per [`ComponentId`].
//!
//! Columns are stored type-erased behind [`ErasedColumn`] so the store can
//! copy or clear an entity's full component set without the caller naming
//! the types involved.

use std::any::Any;

use crate::component::{Component, ComponentId, ComponentRegistry};
use crate::entity::Entity;
use crate::EcsError;

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Type-erased operations every column supports.
pub(crate) trait ErasedColumn {
    /// Overwrite slot `to` with a clone of slot `from`.
    fn copy_slot(&mut self, from: usize, to: usize);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense buffer of one component type, one slot per entity id.
pub(crate) struct Column<T> {
    slots: Box<[T]>,
}

impl<T: Component> Column<T> {
    fn new(slots: usize) -> Self {
        Self {
            slots: vec![T::default(); slots].into_boxed_slice(),
        }
    }
}

impl<T: Component> ErasedColumn for Column<T> {
    fn copy_slot(&mut self, from: usize, to: usize) {
        if from != to {
            self.slots[to] = self.slots[from].clone();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ---------------------------------------------------------------------------
// ValidityBitmap
// ---------------------------------------------------------------------------

/// Flattened `entity × max_components` bit matrix.
#[derive(Debug, Clone)]
pub struct ValidityBitmap {
    words_per_row: usize,
    words: Vec<u64>,
}

impl ValidityBitmap {
    /// Allocate a cleared bitmap with `rows` entity rows and `columns` bits each.
    pub fn new(rows: usize, columns: usize) -> Self {
        let words_per_row = columns.div_ceil(64).max(1);
        Self {
            words_per_row,
            words: vec![0; rows * words_per_row],
        }
    }

    #[inline]
    fn word(&self, row: usize, column: usize) -> usize {
        row * self.words_per_row + column / 64
    }

    /// Read one bit.
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> bool {
        self.words[self.word(row, column)] & (1 << (column % 64)) != 0
    }

    /// Write one bit.
    #[inline]
    pub fn set(&mut self, row: usize, column: usize, value: bool) {
        let word = self.word(row, column);
        let mask = 1u64 << (column % 64);
        if value {
            self.words[word] |= mask;
        } else {
            self.words[word] &= !mask;
        }
    }

    /// All words of one row.
    #[inline]
    pub fn row(&self, row: usize) -> &[u64] {
        let start = row * self.words_per_row;
        &self.words[start..start + self.words_per_row]
    }

    /// Clear every bit of a row.
    pub fn clear_row(&mut self, row: usize) {
        let start = row * self.words_per_row;
        self.words[start..start + self.words_per_row].fill(0);
    }

    /// Overwrite row `to` with row `from`.
    pub fn copy_row(&mut self, from: usize, to: usize) {
        let src = from * self.words_per_row;
        let dst = to * self.words_per_row;
        self.words.copy_within(src..src + self.words_per_row, dst);
    }
}

// ---------------------------------------------------------------------------
// ComponentStore
// ---------------------------------------------------------------------------

/// Owns all component data and validity bits.
///
/// The store does not know which ids are live; [`World`](crate::world::World)
/// validates entities before calling in. Slot `0` exists so the sentinel can
/// be indexed, but nothing is ever written to it.
pub struct ComponentStore {
    registry: ComponentRegistry,
    /// Indexed by `ComponentId`.
    columns: Vec<Box<dyn ErasedColumn>>,
    validity: ValidityBitmap,
    slots: usize,
}

impl ComponentStore {
    /// Create a store for ids `0..slots` and at most `max_components` types.
    pub fn new(slots: usize, max_components: usize) -> Self {
        Self {
            registry: ComponentRegistry::new(max_components),
            columns: Vec::new(),
            validity: ValidityBitmap::new(slots, max_components),
            slots,
        }
    }

    /// Read-only access to the type registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Validity bitmap shared by all component types.
    pub fn validity(&self) -> &ValidityBitmap {
        &self.validity
    }

    /// Number of slots per column.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Register `T` under `name` and allocate its column.
    pub fn register<T: Component>(&mut self, name: &str) -> Result<ComponentId, EcsError> {
        let id = self.registry.register::<T>(name)?;
        self.ensure_column::<T>(id);
        Ok(id)
    }

    /// Id for `T`, registering it under its type name on first use.
    pub fn ensure_registered<T: Component>(&mut self) -> Result<ComponentId, EcsError> {
        let id = self.registry.register_default::<T>()?;
        self.ensure_column::<T>(id);
        Ok(id)
    }

    fn ensure_column<T: Component>(&mut self, id: ComponentId) {
        if id.index() == self.columns.len() {
            self.columns.push(Box::new(Column::<T>::new(self.slots)));
        }
    }

    fn column<T: Component>(&self) -> Option<(ComponentId, &Column<T>)> {
        let id = self.registry.lookup::<T>()?;
        let column = self.columns.get(id.index())?.as_any().downcast_ref::<Column<T>>()?;
        Some((id, column))
    }

    fn column_mut<T: Component>(&mut self) -> Option<(ComponentId, &mut Column<T>)> {
        let id = self.registry.lookup::<T>()?;
        let column = self.columns.get_mut(id.index())?.as_any_mut().downcast_mut::<Column<T>>()?;
        Some((id, column))
    }

    /// Whether `T` is valid on `entity`. False for unregistered types and
    /// out-of-range ids.
    pub fn exists<T: Component>(&self, entity: Entity) -> bool {
        let Some(id) = self.registry.lookup::<T>() else {
            return false;
        };
        self.is_set(entity, id)
    }

    /// Whether bit `id` is set for `entity`.
    pub fn is_set(&self, entity: Entity, id: ComponentId) -> bool {
        entity.index() < self.slots
            && id.index() < self.registry.capacity()
            && self.validity.get(entity.index(), id.index())
    }

    /// Write `value` into `entity`'s slot and mark it valid.
    ///
    /// The caller has already checked `entity` is in range.
    pub(crate) fn insert<T: Component>(&mut self, entity: Entity, value: T) -> Result<(), EcsError> {
        let id = self.ensure_registered::<T>()?;
        let (_, column) = self
            .column_mut::<T>()
            .ok_or_else(|| EcsError::UnregisteredComponent {
                name: std::any::type_name::<T>().to_owned(),
            })?;
        column.slots[entity.index()] = value;
        self.validity.set(entity.index(), id.index(), true);
        Ok(())
    }

    /// The slot for `entity`, whether or not it is valid.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        let (_, column) = self.column::<T>()?;
        column.slots.get(entity.index())
    }

    /// Mutable slot for `entity`, whether or not it is valid.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let (_, column) = self.column_mut::<T>()?;
        column.slots.get_mut(entity.index())
    }

    /// Clear `T`'s validity bit on `entity`. The slot is left as is.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> bool {
        let Some(id) = self.registry.lookup::<T>() else {
            return false;
        };
        if !self.is_set(entity, id) {
            return false;
        }
        self.validity.set(entity.index(), id.index(), false);
        true
    }

    /// Clear every validity bit of `entity`.
    pub(crate) fn clear_entity(&mut self, entity: Entity) {
        if entity.index() < self.slots {
            self.validity.clear_row(entity.index());
        }
    }

    /// Copy every valid component of `from` into `to`, and copy the validity
    /// row so `to` ends up with exactly `from`'s component set.
    pub(crate) fn copy_entity(&mut self, from: Entity, to: Entity) {
        let (src, dst) = (from.index(), to.index());
        for (index, column) in self.columns.iter_mut().enumerate() {
            if self.validity.get(src, index) {
                column.copy_slot(src, dst);
            }
        }
        self.validity.copy_row(src, dst);
    }
}

impl std::fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentStore")
            .field("registered", &self.registry.registered_names())
            .field("slots", &self.slots)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
