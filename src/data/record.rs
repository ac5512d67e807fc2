//! Static data records.
//!
//! A `DataRecord` holds the immutable description of a species, ability,
//! item, type or move. Battle-time data (current HP, stages, held item)
//! lives in [`crate::core::Combatant`] instead.

use serde::{Deserialize, Serialize};

use super::attributes::{AttributeValue, Attributes};

/// What a record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    Species,
    Ability,
    Item,
    Type,
    Move,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordKind::Species => "species",
            RecordKind::Ability => "ability",
            RecordKind::Item => "item",
            RecordKind::Type => "type",
            RecordKind::Move => "move",
        };
        f.write_str(name)
    }
}

/// Immutable descriptive record.
///
/// ## Example
///
/// ```
/// use battle_dispatch::data::{DataRecord, RecordKind};
///
/// let berry = DataRecord::new(RecordKind::Item, "sitrus_berry", "Sitrus Berry")
///     .with_attr("consumable", true)
///     .with_attr("fling_power", 10i32);
///
/// assert!(berry.get_bool("consumable", false));
/// assert_eq!(berry.get_int("fling_power", 0), 10);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    pub kind: RecordKind,

    /// Lookup key, the same string used for effect identifiers.
    pub key: String,

    /// Display name.
    pub name: String,

    pub attributes: Attributes,
}

impl DataRecord {
    /// Create a record without attributes.
    #[must_use]
    pub fn new(kind: RecordKind, key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            name: name.into(),
            attributes: Attributes::default(),
        }
    }

    /// Add an attribute (builder pattern).
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn get_attr(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Get an integer attribute with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_attr(key).and_then(AttributeValue::as_int).unwrap_or(default)
    }

    /// Get a boolean attribute with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_attr(key).and_then(AttributeValue::as_bool).unwrap_or(default)
    }

    /// Get a text attribute.
    #[must_use]
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get_attr(key).and_then(AttributeValue::as_text)
    }

    /// Get a text list attribute, empty if missing.
    #[must_use]
    pub fn get_text_list(&self, key: &str) -> &[String] {
        self.get_attr(key)
            .and_then(AttributeValue::as_text_list)
            .unwrap_or_default()
    }
}
