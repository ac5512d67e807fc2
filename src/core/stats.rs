//! Battle vocabulary: stats, stat stages, status conditions, elemental
//! types, weather and terrain.

use serde::{Deserialize, Serialize};

/// A stat that can carry a stage modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
    Accuracy,
    Evasion,
}

impl Stat {
    /// All stage-able stats in canonical order.
    pub const ALL: [Stat; 7] = [
        Stat::Attack,
        Stat::Defense,
        Stat::SpecialAttack,
        Stat::SpecialDefense,
        Stat::Speed,
        Stat::Accuracy,
        Stat::Evasion,
    ];

    const fn slot(self) -> usize {
        match self {
            Stat::Attack => 0,
            Stat::Defense => 1,
            Stat::SpecialAttack => 2,
            Stat::SpecialDefense => 3,
            Stat::Speed => 4,
            Stat::Accuracy => 5,
            Stat::Evasion => 6,
        }
    }

    /// Snake-case key used in messages.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Stat::Attack => "attack",
            Stat::Defense => "defense",
            Stat::SpecialAttack => "special_attack",
            Stat::SpecialDefense => "special_defense",
            Stat::Speed => "speed",
            Stat::Accuracy => "accuracy",
            Stat::Evasion => "evasion",
        }
    }
}

/// Stage modifiers for every stat, clamped to `[-limit, limit]` on change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatStages {
    stages: [i8; 7],
}

impl StatStages {
    /// Current stage of a stat.
    #[must_use]
    pub fn get(&self, stat: Stat) -> i8 {
        self.stages[stat.slot()]
    }

    /// Apply `delta` clamped to `[-limit, limit]`; returns the change that
    /// actually happened.
    pub fn apply(&mut self, stat: Stat, delta: i8, limit: i8) -> i8 {
        let slot = &mut self.stages[stat.slot()];
        let before = *slot;
        *slot = before.saturating_add(delta).clamp(-limit, limit);
        *slot - before
    }

    /// Reset every stage to zero.
    pub fn clear(&mut self) {
        self.stages = [0; 7];
    }
}

/// Non-volatile status conditions. A combatant holds at most one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCondition {
    Burn,
    Freeze,
    Paralysis,
    Poison,
    Toxic,
    Sleep,
}

impl StatusCondition {
    /// Registry identifier of the effect that implements this condition.
    #[must_use]
    pub const fn effect_key(self) -> &'static str {
        match self {
            StatusCondition::Burn => "burn",
            StatusCondition::Freeze => "freeze",
            StatusCondition::Paralysis => "paralysis",
            StatusCondition::Poison => "poison",
            StatusCondition::Toxic => "toxic",
            StatusCondition::Sleep => "sleep",
        }
    }
}

/// Elemental types of combatants and of incoming damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl ElementType {
    /// Parse a lower-case type name as used in static data.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let element = match key {
            "normal" => ElementType::Normal,
            "fire" => ElementType::Fire,
            "water" => ElementType::Water,
            "electric" => ElementType::Electric,
            "grass" => ElementType::Grass,
            "ice" => ElementType::Ice,
            "fighting" => ElementType::Fighting,
            "poison" => ElementType::Poison,
            "ground" => ElementType::Ground,
            "flying" => ElementType::Flying,
            "psychic" => ElementType::Psychic,
            "bug" => ElementType::Bug,
            "rock" => ElementType::Rock,
            "ghost" => ElementType::Ghost,
            "dragon" => ElementType::Dragon,
            "dark" => ElementType::Dark,
            "steel" => ElementType::Steel,
            "fairy" => ElementType::Fairy,
            _ => return None,
        };
        Some(element)
    }
}

/// Physical/special split of incoming damage. Indirect damage (residuals,
/// hazards, recoil) has no category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageCategory {
    Physical,
    Special,
}

/// Field weather.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    Sun,
    Rain,
    Sandstorm,
}

impl Weather {
    /// Registry identifier of the field effect implementing this weather.
    #[must_use]
    pub const fn effect_key(self) -> &'static str {
        match self {
            Weather::Sun => "sunny_day",
            Weather::Rain => "rain_dance",
            Weather::Sandstorm => "sandstorm",
        }
    }
}

/// Field terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Electric,
    Grassy,
    Misty,
}

impl Terrain {
    /// Registry identifier of the field effect implementing this terrain.
    #[must_use]
    pub const fn effect_key(self) -> &'static str {
        match self {
            Terrain::Electric => "electric_terrain",
            Terrain::Grassy => "grassy_terrain",
            Terrain::Misty => "misty_terrain",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_clamping() {
        let mut stages = StatStages::default();

        assert_eq!(stages.apply(Stat::Attack, -2, 6), -2);
        assert_eq!(stages.get(Stat::Attack), -2);

        assert_eq!(stages.apply(Stat::Attack, -6, 6), -4);
        assert_eq!(stages.get(Stat::Attack), -6);

        assert_eq!(stages.apply(Stat::Attack, -1, 6), 0);
    }

    #[test]
    fn test_stage_clear() {
        let mut stages = StatStages::default();
        stages.apply(Stat::Speed, 3, 6);
        stages.clear();
        assert_eq!(stages, StatStages::default());
    }

    #[test]
    fn test_element_from_key() {
        assert_eq!(ElementType::from_key("fire"), Some(ElementType::Fire));
        assert_eq!(ElementType::from_key("shadow"), None);
    }

    #[test]
    fn test_stats_independent() {
        let mut stages = StatStages::default();
        stages.apply(Stat::Defense, 1, 6);
        for stat in Stat::ALL {
            if stat != Stat::Defense {
                assert_eq!(stages.get(stat), 0);
            }
        }
    }
}
