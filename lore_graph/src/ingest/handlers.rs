//! Category handlers: the columns each kind of record carries beyond the
//! common ones, and the relations they turn into.

use lore_model::{vocab, Attribute, Category, CategoryKind, DamageKind, ScalingGrade, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::cell::{Cell, StructuredValue};
use super::numeric::{self, DropEntry};
use super::RecordContext;

/// Category-specific extraction, run after the common columns.
pub trait CategoryHandler: Send + Sync {
    fn extract(&self, ctx: &mut RecordContext<'_>);
}

/// Handlers keyed by category.
///
/// Upgrade categories have no entry: their rows are consumed by shadow
/// synthesis instead of producing entities of their own.
#[derive(Clone)]
pub struct HandlerTable {
    handlers: HashMap<Category, Arc<dyn CategoryHandler>>,
}

impl Default for HandlerTable {
    fn default() -> Self {
        let agent: Arc<dyn CategoryHandler> = Arc::new(AgentHandler);
        let place: Arc<dyn CategoryHandler> = Arc::new(LocationHandler);
        let equipment: Arc<dyn CategoryHandler> = Arc::new(EquipmentHandler);
        let spell: Arc<dyn CategoryHandler> = Arc::new(SpellHandler);
        let remembrance: Arc<dyn CategoryHandler> = Arc::new(RemembranceHandler);
        let cookbook: Arc<dyn CategoryHandler> = Arc::new(CookbookHandler);
        let whetblade: Arc<dyn CategoryHandler> = Arc::new(WhetbladeHandler);
        let item: Arc<dyn CategoryHandler> = Arc::new(ItemHandler);

        let handlers = Category::ALL
            .into_iter()
            .filter_map(|category| {
                let handler = match category.kind() {
                    CategoryKind::Agent => &agent,
                    CategoryKind::Place => &place,
                    CategoryKind::Equipment => &equipment,
                    CategoryKind::Spell => &spell,
                    CategoryKind::Remembrance => &remembrance,
                    CategoryKind::Cookbook => &cookbook,
                    CategoryKind::Whetblade => &whetblade,
                    CategoryKind::Item => &item,
                    CategoryKind::Upgrade => return None,
                };
                Some((category, Arc::clone(handler)))
            })
            .collect();
        Self { handlers }
    }
}

impl HandlerTable {
    /// A table with no handlers at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Install or replace the handler of a category.
    pub fn register(&mut self, category: Category, handler: impl CategoryHandler + 'static) {
        self.handlers.insert(category, Arc::new(handler));
    }

    pub fn get(&self, category: Category) -> Option<&dyn CategoryHandler> {
        self.handlers.get(&category).map(|h| h.as_ref())
    }

    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.handlers.keys().copied().collect();
        categories.sort();
        categories
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerTable")
            .field("categories", &self.categories())
            .finish()
    }
}

/// Owned scalars of a cell.
fn owned_scalars(cell: &Cell<'_>) -> Vec<String> {
    cell.scalars().into_iter().map(str::to_string).collect()
}

/// `(key, value)` pairs of an attribute-like cell.
///
/// Accepts `{'Str': '12'}`, `[{'name': 'Str', 'amount': '12'}]` and lists of
/// plain maps.
pub(crate) fn keyed_pairs(cell: &Cell<'_>) -> Vec<(String, String)> {
    let Cell::Structured(value) = cell else {
        return Vec::new();
    };

    let mut pairs = Vec::new();
    for item in value.items() {
        let Some(entries) = item.as_map() else {
            continue;
        };
        let named = item.get("name").and_then(StructuredValue::as_scalar);
        let amount = ["amount", "scaling", "value"]
            .iter()
            .find_map(|k| item.get(k).and_then(StructuredValue::as_scalar));
        match (named, amount) {
            (Some(name), Some(amount)) => pairs.push((name.to_string(), amount.to_string())),
            _ => pairs.extend(
                entries
                    .iter()
                    .filter_map(|(k, v)| Some((k.clone(), v.as_scalar()?.to_string()))),
            ),
        }
    }
    pairs
}

pub(crate) fn is_placeholder(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text == "-" || text == "--"
}

fn extract_requirements(ctx: &mut RecordContext<'_>) {
    let cell = ctx.first_cell(&["requirements", "required attributes", "requires", "requirement"]);
    for (key, amount) in keyed_pairs(&cell) {
        if is_placeholder(&amount) {
            continue;
        }
        let (Some(attribute), Some(amount)) = (Attribute::from_abbreviation(&key), numeric::first_integer(&amount)) else {
            continue;
        };
        ctx.add_integer(&attribute.requirement_predicate(), "requirements", amount);
    }
}

fn extract_scaling(ctx: &mut RecordContext<'_>, columns: &[&str]) {
    let cell = ctx.first_cell(columns);
    for (key, grade) in keyed_pairs(&cell) {
        let (Some(attribute), Some(grade)) = (Attribute::from_abbreviation(&key), ScalingGrade::parse(&grade)) else {
            continue;
        };
        ctx.add_text(&attribute.scaling_predicate(), grade.as_str());
    }
}

/// Damage-keyed numbers; `predicate` picks attack or negation naming.
fn extract_damage(ctx: &mut RecordContext<'_>, columns: &[&str], predicate: fn(&DamageKind) -> String) {
    let cell = ctx.first_cell(columns);
    for (key, amount) in keyed_pairs(&cell) {
        if is_placeholder(&amount) {
            continue;
        }
        let (Some(kind), Some(amount)) = (DamageKind::from_abbreviation(&key), numeric::first_decimal(&amount)) else {
            continue;
        };
        ctx.add_value(&predicate(&kind), Value::float(amount));
    }
}

fn extract_effect(ctx: &mut RecordContext<'_>) {
    if let Some(effect) = ctx.first_text(&["effect", "effects"]) {
        ctx.add_text(vocab::EFFECT, effect);
        ctx.add_mentions(effect);
    }
}

fn extract_skill(ctx: &mut RecordContext<'_>) {
    if let Some(skill) = ctx.text("skill") {
        if !ctx.add_known_reference(vocab::HAS_SKILL, skill) {
            ctx.add_text(vocab::SKILL_NAME, skill);
        }
    }
}

/// Bosses, NPCs and creatures.
pub struct AgentHandler;

impl CategoryHandler for AgentHandler {
    fn extract(&self, ctx: &mut RecordContext<'_>) {
        if let Some(hp) = ctx.first_text(&["hp", "health", "health points"]).and_then(numeric::first_integer) {
            ctx.add_integer(vocab::HEALTH_POINTS, "hp", hp);
        }

        let drops = ctx.first_cell(&["drops", "drop"]);
        for entry in owned_scalars(&drops) {
            match numeric::classify_drop(&entry) {
                Some(DropEntry::Quantity(runes)) => ctx.add_integer(vocab::RUNES_DROPPED, "drops", runes),
                Some(DropEntry::Item(name)) => {
                    ctx.add_reference(vocab::DROPS, &name, vocab::ITEM);
                }
                None => {}
            }
        }

        let locations = ctx.first_cell(&["location", "locations", "region"]);
        for place in owned_scalars(&locations) {
            ctx.add_reference(vocab::LOCATED_IN, &place, vocab::LOCATION);
        }

        if let Cell::Structured(value) = ctx.cell("locations & drops") {
            for (place, drops) in value.as_map().unwrap_or_default() {
                ctx.add_reference(vocab::LOCATED_IN, place, vocab::LOCATION);
                for entry in drops.scalars() {
                    if let Some(DropEntry::Item(name)) = numeric::classify_drop(entry) {
                        ctx.add_reference(vocab::DROPS, &name, vocab::ITEM);
                    }
                }
            }
        }

        if let Some(role) = ctx.text("role") {
            ctx.add_text(vocab::ROLE, role);
        }
    }
}

/// Places: the region they belong to and who lives there.
pub struct LocationHandler;

impl CategoryHandler for LocationHandler {
    fn extract(&self, ctx: &mut RecordContext<'_>) {
        if let Some(region) = ctx.text("region") {
            ctx.add_reference(vocab::LOCATED_IN, region, vocab::LOCATION);
        }

        let residents = [
            ("bosses", vocab::HAS_BOSS, vocab::BOSS),
            ("npcs", vocab::HAS_NPC, vocab::NPC),
            ("creatures", vocab::HAS_CREATURE, vocab::CREATURE),
        ];
        for (column, predicate, class) in residents {
            let cell = ctx.cell(column);
            for name in owned_scalars(&cell) {
                ctx.add_reference(predicate, &name, class);
            }
        }
    }
}

const WEAPON_CLASSES: [(&str, &str); 42] = [
    ("daggers", "Dagger"),
    ("straight swords", "StraightSword"),
    ("greatswords", "Greatsword"),
    ("colossal swords", "ColossalSword"),
    ("light greatswords", "LightGreatsword"),
    ("curved swords", "CurvedSword"),
    ("curved greatswords", "CurvedGreatsword"),
    ("katanas", "Katana"),
    ("great katanas", "GreatKatana"),
    ("twinblades", "Twinblade"),
    ("thrusting swords", "ThrustingSword"),
    ("heavy thrusting swords", "HeavyThrustingSword"),
    ("backhand blades", "BackhandBlade"),
    ("throwing blades", "ThrowingBlade"),
    ("axes", "Axe"),
    ("greataxes", "Greataxe"),
    ("hammers", "Hammer"),
    ("great hammers", "GreatHammer"),
    ("flails", "Flail"),
    ("colossal weapons", "ColossalWeapon"),
    ("spears", "Spear"),
    ("great spears", "GreatSpear"),
    ("halberds", "Halberd"),
    ("reapers", "Reaper"),
    ("whips", "Whip"),
    ("fists", "Fist"),
    ("hand-to-hand arts", "HandToHandArt"),
    ("claws", "Claw"),
    ("beast claws", "BeastClaw"),
    ("perfume bottles", "PerfumeBottle"),
    ("light bows", "LightBow"),
    ("bows", "Bow"),
    ("greatbows", "Greatbow"),
    ("crossbows", "Crossbow"),
    ("ballistae", "Ballista"),
    ("ballistas", "Ballista"),
    ("ballista", "Ballista"),
    ("glintstone staffs", "GlintstoneStaff"),
    ("glintstone staves", "GlintstoneStaff"),
    ("sacred seals", "SacredSeal"),
    ("torches", "Torch"),
    ("torch", "Torch"),
];

const SHIELD_CLASSES: [(&str, &str); 5] = [
    ("shields", "Shield"),
    ("small shields", "SmallShield"),
    ("medium shields", "MediumShield"),
    ("greatshields", "Greatshield"),
    ("thrusting shields", "ThrustingShield"),
];

const ARMOR_CLASSES: [(&str, &str); 4] = [
    ("helm", "Helm"),
    ("chest armor", "ChestArmor"),
    ("gauntlets", "Gauntlets"),
    ("leg armor", "LegArmor"),
];

/// Subclass named by an equipment category cell, matched case-insensitively
/// with or without the plural `s`.
pub fn equipment_class(category: &str) -> Option<&'static str> {
    let key = category.trim().to_lowercase();
    WEAPON_CLASSES
        .iter()
        .chain(SHIELD_CLASSES.iter())
        .chain(ARMOR_CLASSES.iter())
        .find(|(plural, _)| *plural == key || plural.strip_suffix('s') == Some(key.as_str()))
        .map(|(_, class)| *class)
}

/// Weapons, shields and armor.
pub struct EquipmentHandler;

impl CategoryHandler for EquipmentHandler {
    fn extract(&self, ctx: &mut RecordContext<'_>) {
        let sub_category = match ctx.category() {
            Category::Armors => ctx.text("type"),
            _ => ctx.text("category"),
        };
        if let Some(sub_category) = sub_category {
            match equipment_class(sub_category) {
                Some(class) => ctx.add_type(class),
                None => ctx.add_text(vocab::WEAPON_CATEGORY, sub_category),
            }
        }

        extract_requirements(ctx);
        extract_scaling(ctx, &["stat scaling", "scaling", "scales with"]);
        extract_damage(ctx, &["attack", "attack power"], DamageKind::attack_predicate);
        extract_damage(
            ctx,
            &["damage negation", "dmg negation", "defence", "defense", "negation"],
            DamageKind::negation_predicate,
        );

        if let Some(damage_type) = ctx.text("damage type") {
            ctx.add_text(vocab::DAMAGE_TYPE, damage_type);
        }
        if let Some(passive) = ctx.first_text(&["passive effect", "passive"]) {
            ctx.add_text(vocab::PASSIVE_EFFECT, passive);
        }
        extract_skill(ctx);
    }
}

/// Sorceries and incantations.
pub struct SpellHandler;

impl CategoryHandler for SpellHandler {
    fn extract(&self, ctx: &mut RecordContext<'_>) {
        extract_effect(ctx);
        if let Some(cost) = ctx.first_text(&["fp", "fp cost", "cost"]).and_then(numeric::first_integer) {
            ctx.add_integer(vocab::FP_COST, "fp", cost);
        }
        extract_requirements(ctx);
    }
}

/// Items with no relations beyond their effect and skill.
pub struct ItemHandler;

impl CategoryHandler for ItemHandler {
    fn extract(&self, ctx: &mut RecordContext<'_>) {
        extract_effect(ctx);
        extract_skill(ctx);
    }
}

/// Remembrances: the boss that drops them and the rewards they trade for.
pub struct RemembranceHandler;

impl RemembranceHandler {
    /// Reward kinds that may prefix an option, as in "Ash of War: X".
    const KIND_PREFIXES: [&'static str; 5] = ["Weapon", "Sorcery", "Incantation", "Talisman", "Ash of War"];

    /// Split "Weapon: A / Incantation: B" into reward names.
    fn reward_names(option: &str) -> Vec<&str> {
        option
            .split('/')
            .map(|part| match part.split_once(':') {
                Some((kind, name)) if Self::is_kind(kind) => name,
                _ => part,
            })
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }

    fn is_kind(prefix: &str) -> bool {
        let prefix = prefix.trim();
        Self::KIND_PREFIXES.iter().any(|kind| kind.eq_ignore_ascii_case(prefix))
    }
}

impl CategoryHandler for RemembranceHandler {
    fn extract(&self, ctx: &mut RecordContext<'_>) {
        if let Some(boss) = ctx.text("boss") {
            ctx.add_reference(vocab::DROPPED_BY, boss, vocab::BOSS);
        }
        for column in ["option 1", "option 2"] {
            let Some(option) = ctx.text(column) else {
                continue;
            };
            for reward in Self::reward_names(option) {
                ctx.add_reference(vocab::GRANTS_REWARD, reward, vocab::ITEM);
            }
        }
    }
}

/// Cookbooks: the items whose recipes they unlock.
pub struct CookbookHandler;

impl CookbookHandler {
    const COLUMNS: [&'static str; 3] = ["unlocks", "recipes", "required items"];

    fn recipe_column(ctx: &RecordContext<'_>) -> Option<String> {
        if let Some(known) = Self::COLUMNS.iter().find(|c| ctx.text(c).is_some()) {
            return Some(known.to_string());
        }
        let mut columns: Vec<&str> = ctx
            .record()
            .columns()
            .filter(|c| c.contains("required") || c.contains("item"))
            .collect();
        columns.sort_unstable();
        columns.first().map(|c| c.to_string())
    }
}

impl CategoryHandler for CookbookHandler {
    fn extract(&self, ctx: &mut RecordContext<'_>) {
        let Some(column) = Self::recipe_column(ctx) else {
            return;
        };
        let cell = ctx.cell(&column);
        for item in owned_scalars(&cell) {
            ctx.add_reference(vocab::UNLOCKS_RECIPE_FOR, &item, vocab::ITEM);
        }
    }
}

/// Affinities a whetblade can unlock.
pub const AFFINITIES: [&str; 12] = [
    "Heavy",
    "Keen",
    "Quality",
    "Fire",
    "Flame Art",
    "Lightning",
    "Sacred",
    "Magic",
    "Cold",
    "Poison",
    "Blood",
    "Occult",
];

/// Whetblades: affinities named in their description or usage text.
pub struct WhetbladeHandler;

impl WhetbladeHandler {
    fn affinities(text: &str) -> Vec<&'static str> {
        AFFINITIES
            .iter()
            .copied()
            .filter(|affinity| {
                text.match_indices(affinity)
                    .any(|(start, m)| crate::linker::is_whole_word(text, start, start + m.len()))
            })
            .collect()
    }
}

impl CategoryHandler for WhetbladeHandler {
    fn extract(&self, ctx: &mut RecordContext<'_>) {
        let text: Vec<&str> = ["description", "usage"].iter().filter_map(|c| ctx.text(c)).collect();
        for affinity in Self::affinities(&text.join("\n")) {
            ctx.add_text(vocab::UNLOCKS_AFFINITY, affinity);
        }
    }
}
