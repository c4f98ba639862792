//! Entity Registry - the authoritative name to identifier table.
//!
//! The registry is filled in one pass over every record source by a
//! [`RegistryBuilder`], then frozen into a [`Registry`] that the linker and
//! the ingester read. Nothing can be registered after the freeze; entities
//! created later (stubs, shadow nodes) are never mention targets.

use lore_model::Identifier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::error::DataIssue;

/// Characters that split a display name into an alias and a title,
/// e.g. "Malenia, Blade of Miquella".
const ALIAS_SEPARATORS: [char; 2] = [',', ':'];

/// When a name's prefix becomes an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasPolicy {
    /// The prefix must be strictly longer than this many characters.
    pub min_len: usize,

    /// Generic prefixes that never become aliases (compared case-insensitively).
    pub stop_words: BTreeSet<String>,
}

impl Default for AliasPolicy {
    fn default() -> Self {
        Self {
            min_len: 3,
            stop_words: [
                "the", "ash of war", "ashes", "bell bearing", "cookbook", "note", "prayerbook",
                "remembrance", "spirit", "great rune", "memory", "lord", "sword",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

impl AliasPolicy {
    /// The alias a display name contributes, if any.
    pub fn alias_of(&self, name: &str) -> Option<String> {
        let (prefix, _) = name.split_once(ALIAS_SEPARATORS)?;
        let prefix = prefix.trim();
        if prefix.chars().count() <= self.min_len {
            return None;
        }
        if self.stop_words.contains(&prefix.to_lowercase()) {
            return None;
        }
        Some(prefix.to_string())
    }
}

/// One registered entity: every display name seen for it and its classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredEntity {
    pub names: BTreeSet<String>,
    pub classes: BTreeSet<String>,
}

impl RegisteredEntity {
    /// The first display name in name order.
    pub fn primary_name(&self) -> Option<&str> {
        self.names.iter().next().map(String::as_str)
    }
}

/// Mutable registry used during the registration pass.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    policy: AliasPolicy,
    entities: BTreeMap<Identifier, RegisteredEntity>,
    names: BTreeMap<String, Identifier>,
    aliases: BTreeMap<String, BTreeSet<Identifier>>,
    collisions: Vec<DataIssue>,
}

impl RegistryBuilder {
    pub fn new(policy: AliasPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Register a display name under a class.
    ///
    /// Creates the entity if absent and unions in the class. A name that
    /// normalizes onto an entity already known under a different spelling is
    /// merged into it and recorded as a collision.
    pub fn register(&mut self, name: &str, class: &str) -> Identifier {
        let name = name.trim();
        let id = Identifier::from_name(name);
        let entity = self.entities.entry(id.clone()).or_default();

        if !entity.names.contains(name) {
            let folded = name.to_lowercase();
            if let Some(existing) = entity.names.iter().find(|n| n.to_lowercase() != folded) {
                warn!(%id, first = %existing, second = %name, "identifier collision, merging");
                self.collisions.push(DataIssue::IdentifierCollision {
                    id: id.clone(),
                    first: existing.clone(),
                    second: name.to_string(),
                });
            }
            entity.names.insert(name.to_string());
        }
        entity.classes.insert(class.to_string());

        self.names.insert(name.to_string(), id.clone());
        if let Some(alias) = self.policy.alias_of(name) {
            self.aliases.entry(alias).or_default().insert(id.clone());
        }
        id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Freeze the registry.
    ///
    /// Aliases claimed by more than one entity, or equal to some entity's
    /// full name, are dropped.
    pub fn build(self) -> Registry {
        let mut aliases = BTreeMap::new();
        for (alias, owners) in self.aliases {
            if self.names.contains_key(&alias) {
                continue;
            }
            if owners.len() > 1 {
                debug!(%alias, owners = owners.len(), "ambiguous alias dropped");
                continue;
            }
            if let Some(owner) = owners.into_iter().next() {
                aliases.insert(alias, owner);
            }
        }

        Registry {
            entities: self.entities,
            names: self.names,
            aliases,
            collisions: self.collisions,
        }
    }
}

/// Frozen registry snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    entities: BTreeMap<Identifier, RegisteredEntity>,
    names: BTreeMap<String, Identifier>,
    aliases: BTreeMap<String, Identifier>,
    collisions: Vec<DataIssue>,
}

impl Registry {
    /// Resolve a display name: exact full name, then alias, then the
    /// normalized identifier of a registered entity.
    pub fn lookup(&self, name: &str) -> Option<&Identifier> {
        let name = name.trim();
        if let Some(id) = self.names.get(name).or_else(|| self.aliases.get(name)) {
            return Some(id);
        }
        self.entities
            .get_key_value(&Identifier::from_name(name))
            .map(|(id, _)| id)
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.entities.contains_key(id)
    }

    pub fn entity(&self, id: &Identifier) -> Option<&RegisteredEntity> {
        self.entities.get(id)
    }

    pub fn classes(&self, id: &Identifier) -> impl Iterator<Item = &str> {
        self.entities
            .get(id)
            .into_iter()
            .flat_map(|e| e.classes.iter().map(String::as_str))
    }

    pub fn has_class(&self, id: &Identifier, class: &str) -> bool {
        self.entities
            .get(id)
            .is_some_and(|e| e.classes.contains(class))
    }

    /// Every full name and surviving alias with its target; the linker's
    /// pattern set.
    pub fn mention_names(&self) -> impl Iterator<Item = (&str, &Identifier)> {
        self.names
            .iter()
            .chain(self.aliases.iter())
            .map(|(name, id)| (name.as_str(), id))
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &Identifier)> {
        self.aliases.iter().map(|(alias, id)| (alias.as_str(), id))
    }

    pub fn collisions(&self) -> &[DataIssue] {
        &self.collisions
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of distinct display names.
    pub fn name_count(&self) -> usize {
        self.names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[(&str, &str)]) -> Registry {
        let mut builder = RegistryBuilder::new(AliasPolicy::default());
        for (name, class) in names {
            builder.register(name, class);
        }
        builder.build()
    }

    #[test]
    fn test_register_and_lookup() {
        let reg = registry(&[("Godrick the Grafted", "Boss"), ("Stormveil Castle", "Location")]);
        let id = Identifier::from_name("Godrick the Grafted");

        assert_eq!(reg.lookup("Godrick the Grafted"), Some(&id));
        assert_eq!(reg.lookup("  godrick the grafted "), Some(&id));
        assert_eq!(reg.lookup("Margit"), None);
        assert!(reg.has_class(&id, "Boss"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_types_union_across_categories() {
        let reg = registry(&[("Smithing Stone [1]", "Material"), ("Smithing Stone [1]", "UpgradeMaterial")]);
        let id = Identifier::from_name("Smithing Stone [1]");
        assert_eq!(reg.classes(&id).collect::<Vec<_>>(), vec!["Material", "UpgradeMaterial"]);
        assert!(reg.collisions().is_empty());
    }

    #[test]
    fn test_alias_from_prefix() {
        let reg = registry(&[("Malenia, Blade of Miquella", "Boss")]);
        assert_eq!(
            reg.lookup("Malenia"),
            Some(&Identifier::from_name("Malenia, Blade of Miquella"))
        );
    }

    #[test]
    fn test_alias_rules() {
        let policy = AliasPolicy::default();
        assert_eq!(policy.alias_of("Rykard, Lord of Blasphemy").as_deref(), Some("Rykard"));
        assert_eq!(policy.alias_of("Note: Hidden Cave"), None);
        assert_eq!(policy.alias_of("Ash, of something"), None);
        assert_eq!(policy.alias_of("Starscourge Radahn"), None);
    }

    #[test]
    fn test_ambiguous_alias_dropped() {
        let reg = registry(&[
            ("Morgott, the Omen King", "Boss"),
            ("Morgott, the Grace-Given Lord", "Boss"),
        ]);
        assert_eq!(reg.lookup("Morgott"), None);
        assert_eq!(reg.aliases().count(), 0);
    }

    #[test]
    fn test_full_name_beats_alias() {
        let reg = registry(&[("Blaidd", "NPC"), ("Blaidd, the Half-Wolf", "NPC")]);
        assert_eq!(reg.lookup("Blaidd"), Some(&Identifier::from_name("Blaidd")));
        assert_eq!(reg.aliases().count(), 0);
    }

    #[test]
    fn test_collision_merges_and_records() {
        let reg = registry(&[("Malenia's Arm", "Item"), ("Malenias Arm", "Item")]);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.collisions().len(), 1);
        assert_eq!(reg.lookup("Malenias Arm"), reg.lookup("Malenia's Arm"));
    }

    #[test]
    fn test_case_variants_are_not_collisions() {
        let reg = registry(&[("Godrick the Grafted", "Boss"), ("GODRICK THE GRAFTED", "Boss")]);
        assert!(reg.collisions().is_empty());
        assert_eq!(reg.name_count(), 2);
    }

    #[test]
    fn test_mention_names_include_aliases() {
        let reg = registry(&[("Malenia, Blade of Miquella", "Boss")]);
        let names: Vec<_> = reg.mention_names().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Malenia, Blade of Miquella", "Malenia"]);
    }
}
