//! Attribute values of static data records.
//!
//! Records carry properties like `"hp"`, `"consumable"` or `"types"`. The
//! dispatch core reads only the few keys it needs; everything else belongs
//! to the embedding game.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One attribute value.
///
/// - `Int`: base HP, power, fling damage
/// - `Bool`: consumable, contact
/// - `Text`: default ability, element
/// - `TextList`: types, tags
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Int(i64),
    Bool(bool),
    Text(String),
    TextList(Vec<String>),
}

impl AttributeValue {
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let AttributeValue::Int(n) = self {
            Some(*n)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let AttributeValue::Bool(flag) = self {
            Some(*flag)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let AttributeValue::Text(text) = self {
            Some(text.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text_list(&self) -> Option<&[String]> {
        if let AttributeValue::TextList(list) = self {
            Some(list.as_slice())
        } else {
            None
        }
    }
}

macro_rules! attribute_from {
    ($($source:ty => |$v:ident| $build:expr;)*) => {
        $(
            impl From<$source> for AttributeValue {
                fn from($v: $source) -> Self {
                    $build
                }
            }
        )*
    };
}

attribute_from! {
    i64 => |v| AttributeValue::Int(v);
    i32 => |v| AttributeValue::Int(i64::from(v));
    u32 => |v| AttributeValue::Int(i64::from(v));
    bool => |v| AttributeValue::Bool(v);
    String => |v| AttributeValue::Text(v);
    &str => |v| AttributeValue::Text(v.to_owned());
    Vec<String> => |v| AttributeValue::TextList(v);
    &[&str] => |v| AttributeValue::TextList(v.iter().map(|s| (*s).to_owned()).collect());
}

/// Attributes of one record, by key.
pub type Attributes = FxHashMap<String, AttributeValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_variant_only() {
        let hp = AttributeValue::from(45i32);
        assert_eq!(hp.as_int(), Some(45));
        assert_eq!(hp.as_bool(), None);
        assert_eq!(hp.as_text(), None);

        assert_eq!(AttributeValue::from(true).as_bool(), Some(true));
        assert_eq!(AttributeValue::from("blaze").as_text(), Some("blaze"));
    }

    #[test]
    fn test_types_from_slice() {
        let types: &[&str] = &["water", "flying"];
        let value = AttributeValue::from(types);
        assert_eq!(value.as_text_list().map(<[String]>::len), Some(2));
        assert_eq!(value.as_text_list().and_then(|t| t.first()).map(String::as_str), Some("water"));
    }

    #[test]
    fn test_untagged_json() {
        let value: AttributeValue = serde_json::from_str("[\"fire\"]").unwrap();
        assert_eq!(value, AttributeValue::TextList(vec!["fire".to_string()]));
        assert_eq!(serde_json::to_string(&AttributeValue::Int(38)).unwrap(), "38");
    }
}
