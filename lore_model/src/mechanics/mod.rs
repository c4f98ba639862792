//! Game mechanics vocabulary: attributes, damage kinds and scaling grades.
//!
//! Record cells abbreviate these (`Str`, `Phy`, ...). Property names are
//! always built from the expanded form, e.g. `requiresStrength`.

use serde::{Deserialize, Serialize};

/// Character attributes that equipment requires or scales with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    Strength,
    Dexterity,
    Intelligence,
    Faith,
    Arcane,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Strength,
        Attribute::Dexterity,
        Attribute::Intelligence,
        Attribute::Faith,
        Attribute::Arcane,
    ];

    /// Expand an abbreviation (`Str`, `dex`, ...) or a full name.
    pub fn from_abbreviation(text: &str) -> Option<Self> {
        let key = text.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|attr| {
            key == attr.name().to_ascii_lowercase() || key == attr.abbreviation().to_ascii_lowercase()
        })
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Attribute::Strength => "Str",
            Attribute::Dexterity => "Dex",
            Attribute::Intelligence => "Int",
            Attribute::Faith => "Fai",
            Attribute::Arcane => "Arc",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Strength => "Strength",
            Attribute::Dexterity => "Dexterity",
            Attribute::Intelligence => "Intelligence",
            Attribute::Faith => "Faith",
            Attribute::Arcane => "Arcane",
        }
    }

    pub fn requirement_predicate(&self) -> String {
        format!("requires{}", self.name())
    }

    pub fn scaling_predicate(&self) -> String {
        format!("scaling{}", self.name())
    }
}

/// Damage kinds used by attack power and damage negation tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DamageKind {
    Physical,
    Magic,
    Fire,
    Lightning,
    Holy,
}

impl DamageKind {
    pub const ALL: [DamageKind; 5] = [
        DamageKind::Physical,
        DamageKind::Magic,
        DamageKind::Fire,
        DamageKind::Lightning,
        DamageKind::Holy,
    ];

    /// Expand `Phy`, `Mag`, `Fir`, `Lit`, `Hol` or a full name.
    pub fn from_abbreviation(text: &str) -> Option<Self> {
        let key = text.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| {
            key == kind.name().to_ascii_lowercase() || key == kind.abbreviation().to_ascii_lowercase()
        })
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            DamageKind::Physical => "Phy",
            DamageKind::Magic => "Mag",
            DamageKind::Fire => "Fir",
            DamageKind::Lightning => "Lit",
            DamageKind::Holy => "Hol",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DamageKind::Physical => "Physical",
            DamageKind::Magic => "Magic",
            DamageKind::Fire => "Fire",
            DamageKind::Lightning => "Lightning",
            DamageKind::Holy => "Holy",
        }
    }

    pub fn attack_predicate(&self) -> String {
        format!("attack{}", self.name())
    }

    pub fn negation_predicate(&self) -> String {
        format!("negates{}", self.name())
    }
}

/// Letter grade of attribute scaling, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScalingGrade {
    S,
    A,
    B,
    C,
    D,
    E,
}

impl ScalingGrade {
    /// Parse a grade cell; `-` and anything else that is not a grade yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "S" => Some(ScalingGrade::S),
            "A" => Some(ScalingGrade::A),
            "B" => Some(ScalingGrade::B),
            "C" => Some(ScalingGrade::C),
            "D" => Some(ScalingGrade::D),
            "E" => Some(ScalingGrade::E),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalingGrade::S => "S",
            ScalingGrade::A => "A",
            ScalingGrade::B => "B",
            ScalingGrade::C => "C",
            ScalingGrade::D => "D",
            ScalingGrade::E => "E",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_abbreviations() {
        assert_eq!(Attribute::from_abbreviation("Str"), Some(Attribute::Strength));
        assert_eq!(Attribute::from_abbreviation(" dex "), Some(Attribute::Dexterity));
        assert_eq!(Attribute::from_abbreviation("Int"), Some(Attribute::Intelligence));
        assert_eq!(Attribute::from_abbreviation("Fai"), Some(Attribute::Faith));
        assert_eq!(Attribute::from_abbreviation("Arcane"), Some(Attribute::Arcane));
        assert_eq!(Attribute::from_abbreviation("Luck"), None);
    }

    #[test]
    fn test_attribute_predicates() {
        assert_eq!(Attribute::Strength.requirement_predicate(), "requiresStrength");
        assert_eq!(Attribute::Faith.scaling_predicate(), "scalingFaith");
    }

    #[test]
    fn test_damage_kind_abbreviations() {
        assert_eq!(DamageKind::from_abbreviation("Phy"), Some(DamageKind::Physical));
        assert_eq!(DamageKind::from_abbreviation("Lit"), Some(DamageKind::Lightning));
        assert_eq!(DamageKind::from_abbreviation("Sta"), None);
        assert_eq!(DamageKind::Holy.negation_predicate(), "negatesHoly");
        assert_eq!(DamageKind::Fire.attack_predicate(), "attackFire");
    }

    #[test]
    fn test_scaling_grade_parse() {
        assert_eq!(ScalingGrade::parse("d"), Some(ScalingGrade::D));
        assert_eq!(ScalingGrade::parse(" S "), Some(ScalingGrade::S));
        assert_eq!(ScalingGrade::parse("-"), None);
        assert_eq!(ScalingGrade::parse("AB"), None);
        assert!(ScalingGrade::S < ScalingGrade::E);
    }
}
