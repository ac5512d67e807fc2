//! Stable effect identifiers.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Symbolic key of an effect (`:intimidate`, `:leftovers`, `:burn`).
///
/// Used for registry lookup, duplicate detection inside a container, and
/// removal. Catalog identifiers are `'static`; identifiers read from data
/// are owned.
///
/// ```
/// use battle_dispatch::effects::EffectId;
///
/// const INTIMIDATE: EffectId = EffectId::new("intimidate");
///
/// assert_eq!(INTIMIDATE, EffectId::from(String::from("intimidate")));
/// assert_eq!(INTIMIDATE.to_string(), ":intimidate");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(Cow<'static, str>);

impl EffectId {
    /// Create an identifier from a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The identifier of "no ability"; always resolves to a no-op effect.
    #[must_use]
    pub const fn none() -> Self {
        Self::new("none")
    }

    /// The bare name without the leading colon.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for EffectId {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl From<String> for EffectId {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, ":{}", self.0)
    }
}
