//! Ontology declarations consumed by the closure engine.
//!
//! The ontology is a separate artifact: a class hierarchy (child/parent
//! edges) and a list of inverse predicate pairs. It is read from TOML; the
//! default artifact is compiled into the crate.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::error;

use crate::entities::Identifier;
use crate::error::{HierarchyCycle, OntologyError};
use crate::vocab;

const BUILTIN_ONTOLOGY: &str = include_str!("ontology.toml");

/// One `child subClassOf parent` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubclassEdge {
    pub child: String,
    pub parent: String,
}

/// Two predicates that are semantic inverses of each other.
///
/// A pair with no `inverse` is symmetric: `(s, p, o)` implies `(o, p, s)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InversePair {
    pub predicate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse: Option<String>,
}

impl InversePair {
    pub fn new(predicate: impl Into<String>, inverse: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            inverse: Some(inverse.into()),
        }
    }

    pub fn symmetric(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            inverse: None,
        }
    }

    pub fn is_symmetric(&self) -> bool {
        match &self.inverse {
            None => true,
            Some(inverse) => *inverse == self.predicate,
        }
    }

    /// The partner of `predicate` within this pair, if it belongs to it.
    pub fn inverse_of(&self, predicate: &str) -> Option<&str> {
        let partner = self.inverse.as_deref().unwrap_or(&self.predicate);
        if predicate == self.predicate {
            Some(partner)
        } else if predicate == partner {
            Some(&self.predicate)
        } else {
            None
        }
    }
}

/// Class hierarchy and inverse declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyConfig {
    #[serde(default, rename = "subclass")]
    pub subclasses: Vec<SubclassEdge>,
    #[serde(default, rename = "inverse")]
    pub inverses: Vec<InversePair>,
}

impl Default for OntologyConfig {
    /// The built-in ontology, or an empty one if the embedded artifact is
    /// broken.
    fn default() -> Self {
        Self::builtin().unwrap_or_else(|err| {
            error!(%err, "built-in ontology is unusable, closure will have no rules");
            Self::empty()
        })
    }
}

impl OntologyConfig {
    /// An ontology with no classes and no inverse pairs.
    pub fn empty() -> Self {
        Self {
            subclasses: Vec::new(),
            inverses: Vec::new(),
        }
    }

    /// The ontology shipped with the crate.
    pub fn builtin() -> Result<Self, OntologyError> {
        Self::from_toml_str(BUILTIN_ONTOLOGY)
    }

    /// Parse and validate an ontology artifact.
    pub fn from_toml_str(text: &str) -> Result<Self, OntologyError> {
        let config: OntologyConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Add a subclass edge (builder style).
    pub fn with_subclass(mut self, child: &str, parent: &str) -> Self {
        self.subclasses.push(SubclassEdge {
            child: child.to_string(),
            parent: parent.to_string(),
        });
        self
    }

    /// Add an inverse pair (builder style).
    pub fn with_inverse(mut self, pair: InversePair) -> Self {
        self.inverses.push(pair);
        self
    }

    pub fn validate(&self) -> Result<(), OntologyError> {
        for edge in &self.subclasses {
            if edge.child.trim().is_empty() || edge.parent.trim().is_empty() {
                return Err(OntologyError::EmptyName { what: "class" });
            }
        }
        for pair in &self.inverses {
            let names = std::iter::once(&pair.predicate).chain(pair.inverse.iter());
            for name in names {
                if name.trim().is_empty() {
                    return Err(OntologyError::EmptyName { what: "predicate" });
                }
                if vocab::is_reserved(name) {
                    return Err(OntologyError::ReservedPredicate {
                        predicate: pair.predicate.clone(),
                        reserved: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn hierarchy(&self) -> ClassHierarchy {
        ClassHierarchy::new(
            self.subclasses
                .iter()
                .map(|e| (Identifier::from_raw(e.child.trim()), Identifier::from_raw(e.parent.trim()))),
        )
    }

    pub fn inverse_pairs(&self) -> &[InversePair] {
        &self.inverses
    }

    /// Every declared predicate mapped to all of its partners.
    pub fn inverse_map(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for pair in &self.inverses {
            let partner = pair.inverse.clone().unwrap_or_else(|| pair.predicate.clone());
            map.entry(pair.predicate.clone())
                .or_default()
                .insert(partner.clone());
            map.entry(partner).or_default().insert(pair.predicate.clone());
        }
        map
    }
}

/// Directed class graph, child to parents.
///
/// Classes that sit on a cycle are found once at construction; asking for
/// the ancestors of any class whose walk reaches one of them fails.
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
    parents: BTreeMap<Identifier, BTreeSet<Identifier>>,
    cyclic: BTreeSet<Identifier>,
}

impl ClassHierarchy {
    pub fn new(edges: impl IntoIterator<Item = (Identifier, Identifier)>) -> Self {
        let mut parents: BTreeMap<Identifier, BTreeSet<Identifier>> = BTreeMap::new();
        for (child, parent) in edges {
            parents.entry(child).or_default().insert(parent);
        }

        let cyclic = parents
            .keys()
            .filter(|class| Self::reaches(&parents, class, class))
            .cloned()
            .collect();

        Self { parents, cyclic }
    }

    /// Whether `target` is reachable from the parents of `from`.
    fn reaches(
        parents: &BTreeMap<Identifier, BTreeSet<Identifier>>,
        from: &Identifier,
        target: &Identifier,
    ) -> bool {
        let mut visited = BTreeSet::new();
        let mut queue: VecDeque<&Identifier> = parents
            .get(from)
            .into_iter()
            .flatten()
            .collect();

        while let Some(class) = queue.pop_front() {
            if class == target {
                return true;
            }
            if !visited.insert(class) {
                continue;
            }
            queue.extend(parents.get(class).into_iter().flatten());
        }
        false
    }

    pub fn parents(&self, class: &Identifier) -> impl Iterator<Item = &Identifier> {
        self.parents.get(class).into_iter().flatten()
    }

    /// Every class reachable from `class` through parent edges, excluding
    /// `class` itself.
    pub fn ancestors(&self, class: &Identifier) -> Result<BTreeSet<Identifier>, HierarchyCycle> {
        let mut found = BTreeSet::new();
        let mut queue: VecDeque<&Identifier> = VecDeque::from([class]);

        while let Some(current) = queue.pop_front() {
            if self.cyclic.contains(current) {
                return Err(HierarchyCycle {
                    class: class.clone(),
                });
            }
            for parent in self.parents(current) {
                if found.insert(parent.clone()) {
                    queue.push_back(parent);
                }
            }
        }
        Ok(found)
    }

    /// Classes that lie on a cycle.
    pub fn cyclic_classes(&self) -> &BTreeSet<Identifier> {
        &self.cyclic
    }

    pub fn is_subclass_of(&self, class: &Identifier, ancestor: &Identifier) -> bool {
        self.ancestors(class)
            .map(|set| set.contains(ancestor))
            .unwrap_or(false)
    }

    pub fn classes(&self) -> impl Iterator<Item = &Identifier> {
        self.parents.keys()
    }
}
