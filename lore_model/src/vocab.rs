//! Predicate and class names of the lore vocabulary.

/// Type assertion; the object is a class identifier.
pub const TYPE: &str = "type";
pub const LABEL: &str = "label";
pub const DESCRIPTION: &str = "description";

/// Predicates with a fixed meaning that ontology declarations may not redefine.
pub const RESERVED: [&str; 3] = [TYPE, LABEL, DESCRIPTION];

pub const MENTIONS: &str = "mentions";
pub const LOCATED_IN: &str = "locatedIn";
pub const DROPS: &str = "drops";
pub const DROPPED_BY: &str = "droppedBy";
pub const GRANTS_REWARD: &str = "grantsReward";
pub const HAS_SKILL: &str = "hasSkill";
pub const HAS_BOSS: &str = "hasBoss";
pub const HAS_NPC: &str = "hasNPC";
pub const HAS_CREATURE: &str = "hasCreature";
pub const UNLOCKS_RECIPE_FOR: &str = "unlocksRecipeFor";
pub const HAS_MAX_STATS: &str = "hasMaxStats";
/// Identity with a resource in an external dataset.
pub const SAME_AS: &str = "sameAs";

pub const GAME_ID: &str = "gameId";
pub const IMAGE: &str = "image";
pub const WEIGHT: &str = "weight";
pub const HEALTH_POINTS: &str = "healthPoints";
pub const RUNES_DROPPED: &str = "runesDropped";
pub const ROLE: &str = "role";
pub const EFFECT: &str = "effect";
pub const FP_COST: &str = "fpCost";
pub const DAMAGE_TYPE: &str = "damageType";
pub const PASSIVE_EFFECT: &str = "passiveEffect";
pub const SKILL_NAME: &str = "skillName";
pub const WEAPON_CATEGORY: &str = "weaponCategory";
pub const UNLOCKS_AFFINITY: &str = "unlocksAffinity";
pub const UPGRADE_PATH: &str = "upgradePath";
pub const UPGRADE_LEVEL: &str = "upgradeLevel";

pub const AGENT: &str = "Agent";
pub const BOSS: &str = "Boss";
pub const NPC: &str = "NPC";
pub const CREATURE: &str = "Creature";
pub const ITEM: &str = "Item";
pub const LOCATION: &str = "Location";
pub const WEAPON: &str = "Weapon";
pub const ARMOR: &str = "Armor";
pub const STAT_BLOCK: &str = "StatBlock";

pub fn is_reserved(predicate: &str) -> bool {
    RESERVED.contains(&predicate)
}
