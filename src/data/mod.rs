//! Static data lookup.
//!
//! Immutable descriptive records for species, abilities, items, types and
//! moves:
//! - `AttributeValue`: typed attribute values
//! - `DataRecord`: one record with its attributes
//! - `DataStore`: lookup by kind and key
//!
//! The dispatch core treats the store as a pure read-only function.

mod attributes;
mod record;
mod store;

pub use attributes::{AttributeValue, Attributes};
pub use record::{DataRecord, RecordKind};
pub use store::DataStore;
