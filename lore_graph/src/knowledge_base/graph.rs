//! Graph Store - the set of triples plus its subject and type indices.

use lore_model::{vocab, Identifier, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Deref;

use super::{EntityView, Triple};

type Properties = BTreeMap<String, BTreeSet<Value>>;

/// Mutable triple store used while a graph is being built.
///
/// It is a true set: inserting a triple that is already present is a no-op.
/// Subjects are kept in identifier order and predicates in name order, so
/// iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStore {
    /// Subject -> predicate -> objects.
    subjects: BTreeMap<Identifier, Properties>,

    /// Index: class -> entities asserted to hold it.
    by_type: BTreeMap<Identifier, BTreeSet<Identifier>>,

    len: usize,
}

impl GraphStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple; returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        let Triple {
            subject,
            predicate,
            object,
        } = triple;

        if predicate == vocab::TYPE {
            if let Value::Reference(class) = &object {
                self.by_type
                    .entry(class.clone())
                    .or_default()
                    .insert(subject.clone());
            }
        }

        let added = self
            .subjects
            .entry(subject)
            .or_default()
            .entry(predicate)
            .or_default()
            .insert(object);
        if added {
            self.len += 1;
        }
        added
    }

    /// Insert every triple; returns how many were new.
    pub fn extend(&mut self, triples: impl IntoIterator<Item = Triple>) -> usize {
        triples
            .into_iter()
            .map(|t| self.insert(t))
            .filter(|added| *added)
            .count()
    }

    pub fn contains(&self, subject: &Identifier, predicate: &str, object: &Value) -> bool {
        self.subjects
            .get(subject)
            .and_then(|props| props.get(predicate))
            .is_some_and(|objects| objects.contains(object))
    }

    pub fn contains_triple(&self, triple: &Triple) -> bool {
        self.contains(&triple.subject, &triple.predicate, &triple.object)
    }

    /// Number of triples.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether any triple has this subject.
    pub fn has_subject(&self, subject: &Identifier) -> bool {
        self.subjects.contains_key(subject)
    }

    pub fn subjects(&self) -> impl Iterator<Item = &Identifier> {
        self.subjects.keys()
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Every triple as borrowed parts, in subject/predicate/object order.
    pub fn statements(&self) -> impl Iterator<Item = (&Identifier, &str, &Value)> {
        self.subjects.iter().flat_map(|(subject, props)| {
            props.iter().flat_map(move |(predicate, objects)| {
                objects
                    .iter()
                    .map(move |object| (subject, predicate.as_str(), object))
            })
        })
    }

    /// Every triple, owned.
    pub fn triples(&self) -> impl Iterator<Item = Triple> + '_ {
        self.statements()
            .map(|(s, p, o)| Triple::new(s.clone(), p, o.clone()))
    }

    /// Triples with the given predicate, as `(subject, object)` pairs.
    pub fn with_predicate<'a>(
        &'a self,
        predicate: &'a str,
    ) -> impl Iterator<Item = (&'a Identifier, &'a Value)> + 'a {
        self.subjects.iter().flat_map(move |(subject, props)| {
            props
                .get(predicate)
                .into_iter()
                .flatten()
                .map(move |object| (subject, object))
        })
    }

    pub fn objects(&self, subject: &Identifier, predicate: &str) -> impl Iterator<Item = &Value> {
        self.subjects
            .get(subject)
            .and_then(|props| props.get(predicate))
            .into_iter()
            .flatten()
    }

    /// Reference objects of `(subject, predicate)`.
    pub fn references(&self, subject: &Identifier, predicate: &str) -> impl Iterator<Item = &Identifier> {
        self.objects(subject, predicate).filter_map(Value::as_reference)
    }

    pub fn types_of(&self, subject: &Identifier) -> BTreeSet<&Identifier> {
        self.references(subject, vocab::TYPE).collect()
    }

    pub fn has_type(&self, subject: &Identifier, class: &str) -> bool {
        self.contains(
            subject,
            vocab::TYPE,
            &Value::Reference(Identifier::from_raw(class)),
        )
    }

    /// Entities asserted (directly or by closure) to hold `class`.
    pub fn entities_of_type(&self, class: &str) -> impl Iterator<Item = &Identifier> {
        self.by_type
            .get(&Identifier::from_raw(class))
            .into_iter()
            .flatten()
    }

    /// Classes used by at least one type assertion.
    pub fn classes(&self) -> impl Iterator<Item = &Identifier> {
        self.by_type.keys()
    }

    /// First string value of `(subject, predicate)`.
    fn first_text(&self, subject: &Identifier, predicate: &str) -> Option<&str> {
        self.objects(subject, predicate)
            .find_map(|v| v.as_literal())
            .map(|lit| lit.raw.as_str())
    }

    pub fn label(&self, subject: &Identifier) -> Option<&str> {
        self.first_text(subject, vocab::LABEL)
    }

    pub fn description(&self, subject: &Identifier) -> Option<&str> {
        self.first_text(subject, vocab::DESCRIPTION)
    }

    pub fn entity(&self, subject: &Identifier) -> Option<EntityView<'_>> {
        self.subjects
            .get_key_value(subject)
            .map(|(subject, properties)| EntityView::new(subject, properties))
    }

    /// Every entity, in identifier order.
    pub fn entities(&self) -> impl Iterator<Item = EntityView<'_>> {
        self.subjects
            .iter()
            .map(|(subject, properties)| EntityView::new(subject, properties))
    }

    /// `(subject, predicate)` pairs whose object is a reference to `target`.
    pub fn subjects_referencing(&self, target: &Identifier) -> Vec<(&Identifier, &str)> {
        let wanted = Value::Reference(target.clone());
        self.statements()
            .filter(|(_, p, o)| *p != vocab::TYPE && **o == wanted)
            .map(|(s, p, _)| (s, p))
            .collect()
    }

    /// References whose target is not the subject of any triple.
    ///
    /// Type objects are classes, not entities, and are not audited.
    pub fn dangling_references(&self) -> Vec<Triple> {
        self.statements()
            .filter(|(_, p, _)| *p != vocab::TYPE)
            .filter_map(|(s, p, o)| match o {
                Value::Reference(target) if !self.has_subject(target) => {
                    Some(Triple::new(s.clone(), p, o.clone()))
                }
                _ => None,
            })
            .collect()
    }
}

impl FromIterator<Triple> for GraphStore {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut store = GraphStore::new();
        store.extend(iter);
        store
    }
}

/// A closure-converged graph.
///
/// Only the closure engine creates one, and it exposes no mutation: consumers
/// read it through the [`GraphStore`] accessors it dereferences to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeGraph {
    store: GraphStore,
}

impl KnowledgeGraph {
    pub(crate) fn freeze(store: GraphStore) -> Self {
        Self { store }
    }

    /// A mutable copy, e.g. to extend it and run closure again.
    pub fn to_store(&self) -> GraphStore {
        self.store.clone()
    }

    pub fn into_store(self) -> GraphStore {
        self.store
    }
}

impl Deref for KnowledgeGraph {
    type Target = GraphStore;

    fn deref(&self) -> &GraphStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Identifier {
        Identifier::from_name(name)
    }

    fn sample_store() -> GraphStore {
        let godrick = id("Godrick the Grafted");
        let remembrance = id("Remembrance of the Grafted");
        let castle = id("Stormveil Castle");

        [
            Triple::type_assertion(godrick.clone(), "Boss"),
            Triple::label(godrick.clone(), "Godrick the Grafted"),
            Triple::reference(godrick.clone(), "locatedIn", castle.clone()),
            Triple::type_assertion(castle.clone(), "Location"),
            Triple::type_assertion(remembrance.clone(), "Remembrance"),
            Triple::reference(remembrance, "droppedBy", godrick),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_insert_is_set_semantics() {
        let mut store = GraphStore::new();
        let triple = Triple::label(id("Margit"), "Margit");

        assert!(store.insert(triple.clone()));
        assert!(!store.insert(triple.clone()));
        assert_eq!(store.len(), 1);
        assert!(store.contains_triple(&triple));
    }

    #[test]
    fn test_extend_counts_new() {
        let mut store = sample_store();
        let before = store.len();
        let added = store.extend([
            Triple::label(id("Godrick the Grafted"), "Godrick the Grafted"),
            Triple::label(id("Stormveil Castle"), "Stormveil Castle"),
        ]);
        assert_eq!(added, 1);
        assert_eq!(store.len(), before + 1);
    }

    #[test]
    fn test_type_index() {
        let store = sample_store();
        let bosses: Vec<_> = store.entities_of_type("Boss").collect();
        assert_eq!(bosses, vec![&id("Godrick the Grafted")]);
        assert!(store.has_type(&id("Stormveil Castle"), "Location"));
        assert_eq!(store.entities_of_type("Npc").count(), 0);
    }

    #[test]
    fn test_accessors() {
        let store = sample_store();
        let godrick = id("Godrick the Grafted");

        assert_eq!(store.label(&godrick), Some("Godrick the Grafted"));
        assert_eq!(store.description(&godrick), None);
        assert_eq!(
            store.references(&godrick, "locatedIn").collect::<Vec<_>>(),
            vec![&id("Stormveil Castle")]
        );

        let referrers = store.subjects_referencing(&godrick);
        assert_eq!(referrers, vec![(&id("Remembrance of the Grafted"), "droppedBy")]);
    }

    #[test]
    fn test_dangling_references() {
        let mut store = sample_store();
        assert!(store.dangling_references().is_empty());

        store.insert(Triple::reference(id("Margit"), "drops", id("Talisman Pouch")));
        let dangling = store.dangling_references();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].predicate, "drops");
    }

    #[test]
    fn test_statements_round_trip_through_triples() {
        let store = sample_store();
        let rebuilt: GraphStore = store.triples().collect();
        assert_eq!(rebuilt, store);
    }
}
