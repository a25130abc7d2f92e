//! Signatures: bit-vectors over component ids.
//!
//! A [`Signature`] is used both to declare which components a system needs
//! and to test whether an entity has them. `count` is the number of bits the
//! signature spans, which is one past the highest id it was built from, not
//! the number of set bits. Membership tests only look at bits below `count`.

use std::fmt;

use crate::component::{Component, ComponentId};
use crate::storage::ComponentStore;
use crate::EcsError;

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A set of component ids.
#[derive(Clone, Default)]
pub struct Signature {
    bits: Vec<u64>,
    count: usize,
}

impl Signature {
    /// A signature with no bits. Every entity fulfils it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set exactly the bits in `ids`. `count` becomes the highest id + 1.
    pub fn from_ids(ids: &[ComponentId]) -> Self {
        let mut signature = Self::empty();
        for &id in ids {
            signature.insert(id);
        }
        signature
    }

    /// Snapshot a validity row spanning `count` bits.
    pub(crate) fn from_row(row: &[u64], count: usize) -> Self {
        let words = count.div_ceil(64);
        let mut bits: Vec<u64> = row.iter().take(words).copied().collect();
        bits.resize(words, 0);
        if count % 64 != 0 {
            if let Some(last) = bits.last_mut() {
                *last &= (1u64 << (count % 64)) - 1;
            }
        }
        Self { bits, count }
    }

    /// Set the bit for `id`, growing `count` if needed.
    pub fn insert(&mut self, id: ComponentId) {
        let index = id.index();
        if index >= self.count {
            self.count = index + 1;
            self.bits.resize(self.count.div_ceil(64), 0);
        }
        self.bits[index / 64] |= 1 << (index % 64);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, id: ComponentId) -> Self {
        self.insert(id);
        self
    }

    /// Whether the bit for `id` is set.
    pub fn contains(&self, id: ComponentId) -> bool {
        let index = id.index();
        index < self.count && self.bits[index / 64] & (1 << (index % 64)) != 0
    }

    /// Number of bits membership tests scan.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// Ids of all set bits, ascending.
    pub fn set_bits(&self) -> impl Iterator<Item = ComponentId> + '_ {
        (0..self.count)
            .filter(|&i| self.bits[i / 64] & (1 << (i % 64)) != 0)
            .map(ComponentId::from_index)
    }

    /// Bits set in either signature.
    pub fn union(&self, other: &Signature) -> Signature {
        let mut out = self.clone();
        if other.count > out.count {
            out.count = other.count;
            out.bits.resize(other.bits.len(), 0);
        }
        for (dst, src) in out.bits.iter_mut().zip(&other.bits) {
            *dst |= src;
        }
        out
    }

    /// Every set bit is also set in `row`.
    pub(crate) fn is_subset_of(&self, row: &[u64]) -> bool {
        self.bits
            .iter()
            .enumerate()
            .all(|(i, &w)| w & !row.get(i).copied().unwrap_or(0) == 0)
    }

    /// No set bit is set in `row`.
    pub(crate) fn is_disjoint_from(&self, row: &[u64]) -> bool {
        self.bits
            .iter()
            .zip(row)
            .all(|(&w, &r)| w & r == 0)
    }
}

impl PartialEq for Signature {
    /// Equal when the bits agree up to the longer signature; the longer one
    /// must have nothing set past the shorter's end.
    fn eq(&self, other: &Self) -> bool {
        let len = self.bits.len().max(other.bits.len());
        (0..len).all(|i| {
            self.bits.get(i).copied().unwrap_or(0) == other.bits.get(i).copied().unwrap_or(0)
        })
    }
}

impl Eq for Signature {}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("bits", &self.set_bits().map(|id| id.index()).collect::<Vec<_>>())
            .field("count", &self.count)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ComponentSet -- typed signature construction
// ---------------------------------------------------------------------------

/// A tuple of component types that can be turned into a [`Signature`].
///
/// Types not yet registered are registered on the spot, the same way a first
/// `set` would register them.
pub trait ComponentSet {
    /// Resolve (and register if needed) every type in the set.
    fn component_ids(store: &mut ComponentStore) -> Result<Vec<ComponentId>, EcsError>;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn component_ids(store: &mut ComponentStore) -> Result<Vec<ComponentId>, EcsError> {
                Ok(vec![$(store.ensure_registered::<$name>()?),+])
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: usize) -> ComponentId {
        ComponentId::from_index(i)
    }

    #[test]
    fn count_is_highest_id_plus_one() {
        let sig = Signature::from_ids(&[id(5)]);
        assert_eq!(sig.count(), 6);
        assert!(sig.contains(id(5)));
        assert!(!sig.contains(id(4)));
        assert_eq!(sig.set_bits().collect::<Vec<_>>(), vec![id(5)]);
    }

    #[test]
    fn empty_signature_has_zero_count() {
        let sig = Signature::from_ids(&[]);
        assert_eq!(sig.count(), 0);
        assert!(sig.is_empty());
        assert!(sig.is_subset_of(&[0]));
    }

    #[test]
    fn equality_ignores_trailing_zero_span() {
        let short = Signature::from_ids(&[id(1)]);
        let mut long = Signature::from_ids(&[id(1), id(100)]);
        assert_ne!(short, long);

        long = Signature::from_row(&[0b10, 0], 128);
        assert_eq!(long.count(), 128);
        assert_eq!(short, long);
    }

    #[test]
    fn subset_and_disjoint_tests() {
        let sig = Signature::from_ids(&[id(0), id(2)]);
        assert!(sig.is_subset_of(&[0b111]));
        assert!(!sig.is_subset_of(&[0b011]));
        assert!(sig.is_disjoint_from(&[0b010]));
        assert!(!sig.is_disjoint_from(&[0b100]));
    }

    #[test]
    fn wide_ids_span_multiple_words() {
        let sig = Signature::from_ids(&[id(3), id(70)]);
        assert_eq!(sig.count(), 71);
        assert!(sig.is_subset_of(&[1 << 3, 1 << 6]));
        assert!(!sig.is_subset_of(&[1 << 3]));
    }

    #[test]
    fn from_row_masks_bits_past_count() {
        let sig = Signature::from_row(&[u64::MAX], 4);
        assert_eq!(sig.set_bits().count(), 4);
    }

    #[test]
    fn union_merges_bits() {
        let a = Signature::from_ids(&[id(1)]);
        let b = Signature::from_ids(&[id(3)]);
        let u = a.union(&b);
        assert_eq!(u, Signature::from_ids(&[id(1), id(3)]));
        assert_eq!(u.count(), 4);
    }

    #[test]
    fn builder_matches_from_ids() {
        let built = Signature::empty().with(id(2)).with(id(0));
        assert_eq!(built, Signature::from_ids(&[id(0), id(2)]));
    }
}
