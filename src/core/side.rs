//! Side ("bank") identification and per-side data storage.
//!
//! ## SideId
//!
//! A side is one team in the battle. Two sides is the common case, but
//! nothing in the engine assumes it: free-for-all formats simply use more.
//!
//! ## SideMap
//!
//! Per-side storage backed by `Vec` for O(1) access, indexable by `SideId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Side identifier supporting 1-255 sides.
///
/// Side indices are 0-based: the first side is `SideId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SideId(pub u8);

impl SideId {
    /// Create a new side ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw side index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all side IDs for a battle with `side_count` sides.
    ///
    /// ```
    /// use battle_dispatch::core::SideId;
    ///
    /// let sides: Vec<_> = SideId::all(2).collect();
    /// assert_eq!(sides, vec![SideId::new(0), SideId::new(1)]);
    /// ```
    pub fn all(side_count: usize) -> impl Iterator<Item = SideId> {
        (0..side_count as u8).map(SideId)
    }
}

impl std::fmt::Display for SideId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Side {}", self.0)
    }
}

/// Per-side data storage with O(1) access.
///
/// ```
/// use battle_dispatch::core::{SideId, SideMap};
///
/// let mut fainted: SideMap<u32> = SideMap::with_value(2, 0);
/// fainted[SideId::new(1)] += 1;
/// assert_eq!(fainted[SideId::new(1)], 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    data: Vec<T>,
}

impl<T> SideMap<T> {
    /// Create a new SideMap with values from a factory function.
    pub fn new(side_count: usize, factory: impl Fn(SideId) -> T) -> Self {
        assert!(side_count > 0, "Must have at least 1 side");
        assert!(side_count <= 255, "At most 255 sides supported");

        let data = (0..side_count as u8).map(|i| factory(SideId(i))).collect();

        Self { data }
    }

    /// Create a new SideMap with all entries set to the same value.
    pub fn with_value(side_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(side_count, |_| value.clone())
    }

    /// Create a new SideMap with default values.
    pub fn with_default(side_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(side_count, |_| T::default())
    }

    /// Number of sides.
    #[must_use]
    pub fn side_count(&self) -> usize {
        self.data.len()
    }

    /// Get a side's data, or `None` for a side outside this battle.
    #[must_use]
    pub fn get(&self, side: SideId) -> Option<&T> {
        self.data.get(side.index())
    }

    /// Get a side's data mutably, or `None` for a side outside this battle.
    pub fn get_mut(&mut self, side: SideId) -> Option<&mut T> {
        self.data.get_mut(side.index())
    }

    /// Iterate over (SideId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (SideId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (SideId(i as u8), v))
    }

    /// Iterate over all side IDs.
    pub fn side_ids(&self) -> impl Iterator<Item = SideId> {
        (0..self.data.len() as u8).map(SideId)
    }
}

impl<T> Index<SideId> for SideMap<T> {
    type Output = T;

    fn index(&self, side: SideId) -> &Self::Output {
        &self.data[side.index()]
    }
}

impl<T> IndexMut<SideId> for SideMap<T> {
    fn index_mut(&mut self, side: SideId) -> &mut Self::Output {
        &mut self.data[side.index()]
    }
}
