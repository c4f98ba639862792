//! Tabular records and the categories they come from.
//!
//! Loading raw files is the job of whatever implements [`RecordSource`];
//! this module only fixes the shape a record has once it is loaded.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::SourceError;

/// Every record category the ingester knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Bosses,
    Npcs,
    Creatures,
    Locations,
    Weapons,
    Shields,
    Armors,
    Talismans,
    Sorceries,
    Incantations,
    AshesOfWar,
    Skills,
    SpiritAshes,
    Remembrances,
    Cookbooks,
    Whetblades,
    Materials,
    Consumables,
    Tools,
    KeyItems,
    GreatRunes,
    CrystalTears,
    Ammos,
    BellBearings,
    MultiplayerItems,
    UpgradeMaterials,
    WeaponUpgrades,
    ShieldUpgrades,
}

/// Extraction family of a category; each family has one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryKind {
    /// Bosses, NPCs and creatures: health, currency, locations and drops.
    Agent,
    /// Places: region membership and residents.
    Place,
    /// Weapons, shields and armor: requirements, scaling, negation.
    Equipment,
    /// Sorceries and incantations.
    Spell,
    Remembrance,
    Cookbook,
    Whetblade,
    /// Everything else that is only an item with common columns.
    Item,
    /// Per-level rows of a base entity, consumed by shadow synthesis.
    Upgrade,
}

impl Category {
    pub const ALL: [Category; 28] = [
        Category::Bosses,
        Category::Npcs,
        Category::Creatures,
        Category::Locations,
        Category::Weapons,
        Category::Shields,
        Category::Armors,
        Category::Talismans,
        Category::Sorceries,
        Category::Incantations,
        Category::AshesOfWar,
        Category::Skills,
        Category::SpiritAshes,
        Category::Remembrances,
        Category::Cookbooks,
        Category::Whetblades,
        Category::Materials,
        Category::Consumables,
        Category::Tools,
        Category::KeyItems,
        Category::GreatRunes,
        Category::CrystalTears,
        Category::Ammos,
        Category::BellBearings,
        Category::MultiplayerItems,
        Category::UpgradeMaterials,
        Category::WeaponUpgrades,
        Category::ShieldUpgrades,
    ];

    /// Class asserted for every record of this category.
    pub fn class(&self) -> &'static str {
        match self {
            Category::Bosses => "Boss",
            Category::Npcs => "NPC",
            Category::Creatures => "Creature",
            Category::Locations => "Location",
            Category::Weapons => "Weapon",
            Category::Shields => "Shield",
            Category::Armors => "Armor",
            Category::Talismans => "Talisman",
            Category::Sorceries => "Sorcery",
            Category::Incantations => "Incantation",
            Category::AshesOfWar => "AshOfWar",
            Category::Skills => "Skill",
            Category::SpiritAshes => "SpiritAsh",
            Category::Remembrances => "Remembrance",
            Category::Cookbooks => "Cookbook",
            Category::Whetblades => "Whetblade",
            Category::Materials => "Material",
            Category::Consumables => "Consumable",
            Category::Tools => "Tool",
            Category::KeyItems => "KeyItem",
            Category::GreatRunes => "GreatRune",
            Category::CrystalTears => "CrystalTear",
            Category::Ammos => "Ammo",
            Category::BellBearings => "BellBearing",
            Category::MultiplayerItems => "MultiplayerItem",
            Category::UpgradeMaterials => "UpgradeMaterial",
            Category::WeaponUpgrades => "WeaponUpgrade",
            Category::ShieldUpgrades => "ShieldUpgrade",
        }
    }

    pub fn kind(&self) -> CategoryKind {
        match self {
            Category::Bosses | Category::Npcs | Category::Creatures => CategoryKind::Agent,
            Category::Locations => CategoryKind::Place,
            Category::Weapons | Category::Shields | Category::Armors => CategoryKind::Equipment,
            Category::Sorceries | Category::Incantations => CategoryKind::Spell,
            Category::Remembrances => CategoryKind::Remembrance,
            Category::Cookbooks => CategoryKind::Cookbook,
            Category::Whetblades => CategoryKind::Whetblade,
            Category::WeaponUpgrades | Category::ShieldUpgrades => CategoryKind::Upgrade,
            _ => CategoryKind::Item,
        }
    }

    /// Conventional file name of the category in a tabular dump.
    pub fn source_name(&self) -> &'static str {
        match self {
            Category::Bosses => "bosses.csv",
            Category::Npcs => "npcs.csv",
            Category::Creatures => "creatures.csv",
            Category::Locations => "locations.csv",
            Category::Weapons => "weapons.csv",
            Category::Shields => "shields.csv",
            Category::Armors => "armors.csv",
            Category::Talismans => "talismans.csv",
            Category::Sorceries => "sorceries.csv",
            Category::Incantations => "incantations.csv",
            Category::AshesOfWar => "ashesOfWar.csv",
            Category::Skills => "skills.csv",
            Category::SpiritAshes => "spiritAshes.csv",
            Category::Remembrances => "remembrances.csv",
            Category::Cookbooks => "cookbooks.csv",
            Category::Whetblades => "whetblades.csv",
            Category::Materials => "materials.csv",
            Category::Consumables => "consumables.csv",
            Category::Tools => "tools.csv",
            Category::KeyItems => "keyItems.csv",
            Category::GreatRunes => "greatRunes.csv",
            Category::CrystalTears => "crystalTears.csv",
            Category::Ammos => "ammos.csv",
            Category::BellBearings => "bells.csv",
            Category::MultiplayerItems => "multi.csv",
            Category::UpgradeMaterials => "upgradeMaterials.csv",
            Category::WeaponUpgrades => "weapons_upgrades.csv",
            Category::ShieldUpgrades => "shields_upgrades.csv",
        }
    }

    pub fn from_source_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.source_name() == name)
    }

    /// Columns that may carry the record's display name, in priority order.
    pub fn identity_columns(&self) -> &'static [&'static str] {
        match self {
            Category::WeaponUpgrades => &["weapon name", "name"],
            Category::ShieldUpgrades => &["shield name", "name"],
            _ => &["name"],
        }
    }

    /// The primary category whose entities an upgrade category refines.
    pub fn base_category(&self) -> Option<Category> {
        match self {
            Category::WeaponUpgrades => Some(Category::Weapons),
            Category::ShieldUpgrades => Some(Category::Shields),
            _ => None,
        }
    }

    pub fn is_upgrade(&self) -> bool {
        self.kind() == CategoryKind::Upgrade
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source_name())
    }
}

/// One row of a category: column name to raw cell text.
///
/// Column names are matched case-insensitively; blank cells read as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub category: Category,
    /// Zero-based row position within its category.
    pub row: usize,
    cells: HashMap<String, String>,
}

impl Record {
    pub fn new(category: Category, row: usize) -> Self {
        Self {
            category,
            row,
            cells: HashMap::new(),
        }
    }

    /// Add a cell (builder style).
    pub fn with_cell(mut self, column: &str, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: impl Into<String>) {
        self.cells
            .insert(column.trim().to_ascii_lowercase(), value.into());
    }

    /// Trimmed cell text, or `None` when the column is missing or blank.
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.cells
            .get(&column.trim().to_ascii_lowercase())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First cell among the category's identity columns.
    pub fn identity(&self) -> Option<&str> {
        self.category
            .identity_columns()
            .iter()
            .find_map(|col| self.cell(col))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }
}

/// The input collaborator: yields the records of each category.
pub trait RecordSource: Sync {
    /// Categories this source can provide.
    fn categories(&self) -> Vec<Category>;

    /// All records of one category, in row order.
    fn records(&self, category: Category) -> Result<Vec<Record>, SourceError>;
}

/// A record source held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: BTreeMap<Category, Vec<Record>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; its row index is reassigned to its position.
    pub fn push(&mut self, mut record: Record) {
        let rows = self.records.entry(record.category).or_default();
        record.row = rows.len();
        rows.push(record);
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.push(record);
        self
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSource for InMemorySource {
    fn categories(&self) -> Vec<Category> {
        self.records.keys().copied().collect()
    }

    fn records(&self, category: Category) -> Result<Vec<Record>, SourceError> {
        Ok(self.records.get(&category).cloned().unwrap_or_default())
    }
}
