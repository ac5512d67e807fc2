//! Read-only lookup of static data records.

use rustc_hash::FxHashMap;

use super::record::{DataRecord, RecordKind};
use crate::core::BattleError;

/// Static data for species, abilities, items, types and moves.
///
/// Filled before a battle starts and shared read-only through an `Arc`.
///
/// ## Example
///
/// ```
/// use battle_dispatch::data::{DataRecord, DataStore, RecordKind};
///
/// let mut store = DataStore::new();
/// store.insert(DataRecord::new(RecordKind::Ability, "intimidate", "Intimidate"));
///
/// assert_eq!(store.display_name(RecordKind::Ability, "intimidate"), "Intimidate");
/// assert_eq!(store.display_name(RecordKind::Ability, "unknown"), "unknown");
/// ```
#[derive(Clone, Debug, Default)]
pub struct DataStore {
    records: FxHashMap<(RecordKind, String), DataRecord>,
}

impl DataStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing one with the same kind and key.
    pub fn insert(&mut self, record: DataRecord) -> Option<DataRecord> {
        self.records.insert((record.kind, record.key.clone()), record)
    }

    /// Look up a record.
    #[must_use]
    pub fn get(&self, kind: RecordKind, key: &str) -> Option<&DataRecord> {
        self.records.get(&(kind, key.to_string()))
    }

    /// Look up a record or fail with `UnknownRecord`.
    pub fn require(&self, kind: RecordKind, key: &str) -> Result<&DataRecord, BattleError> {
        self.get(kind, key).ok_or_else(|| BattleError::UnknownRecord {
            kind,
            key: key.to_string(),
        })
    }

    /// Display name of a record, or the key itself when unknown.
    #[must_use]
    pub fn display_name<'a>(&'a self, kind: RecordKind, key: &'a str) -> &'a str {
        self.get(kind, key).map_or(key, |record| record.name.as_str())
    }

    /// Whether an item is used up on activation. Unknown items are not.
    #[must_use]
    pub fn is_consumable(&self, item: &str) -> bool {
        self.get(RecordKind::Item, item)
            .is_some_and(|record| record.get_bool("consumable", false))
    }

    /// Get the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of one kind, sorted by key.
    #[must_use]
    pub fn of_kind(&self, kind: RecordKind) -> Vec<&DataRecord> {
        let mut records: Vec<&DataRecord> =
            self.records.values().filter(|r| r.kind == kind).collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        records
    }
}

impl FromIterator<DataRecord> for DataStore {
    fn from_iter<I: IntoIterator<Item = DataRecord>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}
