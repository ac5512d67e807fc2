//! Entity identification.
//!
//! Every combatant has a unique `CombatantId`, allocated by the battle in
//! registration order. Effects are attached to an [`Owner`]: a single
//! combatant, a whole side, or the field shared by everyone.
//!
//! ```
//! use battle_dispatch::core::{CombatantId, Owner, SideId};
//!
//! let owner = Owner::Combatant(CombatantId(3));
//! assert_eq!(owner.combatant(), Some(CombatantId(3)));
//! assert_eq!(Owner::Side(SideId::new(1)).combatant(), None);
//! ```

use serde::{Deserialize, Serialize};

use super::side::SideId;

/// Unique identifier for a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub u32);

impl CombatantId {
    /// Create a combatant ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for CombatantId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Combatant({})", self.0)
    }
}

/// The entity an effect container belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// A single combatant (abilities, items, statuses, volatiles).
    Combatant(CombatantId),
    /// One side of the battle (screens, hazards, safeguard).
    Side(SideId),
    /// The shared field (weather, terrain).
    Field,
}

impl Owner {
    /// The combatant this owner refers to, if it is one.
    #[must_use]
    pub const fn combatant(self) -> Option<CombatantId> {
        match self {
            Owner::Combatant(id) => Some(id),
            _ => None,
        }
    }

    /// The side this owner refers to, if it is one.
    #[must_use]
    pub const fn side(self) -> Option<SideId> {
        match self {
            Owner::Side(id) => Some(id),
            _ => None,
        }
    }
}

impl From<CombatantId> for Owner {
    fn from(id: CombatantId) -> Self {
        Owner::Combatant(id)
    }
}

impl From<SideId> for Owner {
    fn from(id: SideId) -> Self {
        Owner::Side(id)
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Owner::Combatant(id) => write!(f, "{id}"),
            Owner::Side(id) => write!(f, "{id}"),
            Owner::Field => write!(f, "Field"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CombatantId(42)), "Combatant(42)");
        assert_eq!(format!("{}", Owner::Side(SideId::new(1))), "Side 1");
        assert_eq!(format!("{}", Owner::Field), "Field");
    }

    #[test]
    fn test_owner_accessors() {
        let owner: Owner = CombatantId(7).into();
        assert_eq!(owner.combatant(), Some(CombatantId(7)));
        assert_eq!(owner.side(), None);

        let side: Owner = SideId::new(0).into();
        assert_eq!(side.side(), Some(SideId::new(0)));
        assert_eq!(Owner::Field.combatant(), None);
    }

    #[test]
    fn test_serialization() {
        let owner = Owner::Combatant(CombatantId(123));
        let json = serde_json::to_string(&owner).unwrap();
        let back: Owner = serde_json::from_str(&json).unwrap();
        assert_eq!(owner, back);
    }
}
