//! Entity views - every triple of one subject, grouped by predicate.

use lore_model::{vocab, Identifier, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Borrowed view of one entity: identifier, types, label, description and
/// its multi-valued property map.
#[derive(Debug, Clone, Copy)]
pub struct EntityView<'a> {
    id: &'a Identifier,
    properties: &'a BTreeMap<String, BTreeSet<Value>>,
}

impl<'a> EntityView<'a> {
    pub(crate) fn new(id: &'a Identifier, properties: &'a BTreeMap<String, BTreeSet<Value>>) -> Self {
        Self { id, properties }
    }

    pub fn id(&self) -> &'a Identifier {
        self.id
    }

    pub fn types(&self) -> impl Iterator<Item = &'a Identifier> {
        self.values(vocab::TYPE).filter_map(Value::as_reference)
    }

    pub fn has_type(&self, class: &str) -> bool {
        self.types().any(|t| t.as_str() == class)
    }

    pub fn label(&self) -> Option<&'a str> {
        self.text(vocab::LABEL)
    }

    pub fn description(&self) -> Option<&'a str> {
        self.text(vocab::DESCRIPTION)
    }

    fn text(&self, predicate: &str) -> Option<&'a str> {
        self.values(predicate)
            .find_map(Value::as_literal)
            .map(|lit| lit.raw.as_str())
    }

    pub fn values(&self, predicate: &str) -> impl Iterator<Item = &'a Value> {
        self.properties.get(predicate).into_iter().flatten()
    }

    /// First integer value of a predicate.
    pub fn integer(&self, predicate: &str) -> Option<i64> {
        self.values(predicate)
            .find_map(Value::as_literal)
            .and_then(|lit| lit.as_i64())
    }

    /// Properties other than type, label and description, in predicate order.
    pub fn properties(&self) -> impl Iterator<Item = (&'a str, &'a BTreeSet<Value>)> {
        self.properties
            .iter()
            .filter(|(predicate, _)| !vocab::is_reserved(predicate))
            .map(|(predicate, values)| (predicate.as_str(), values))
    }

    /// Number of triples with this subject.
    pub fn triple_count(&self) -> usize {
        self.properties.values().map(BTreeSet::len).sum()
    }
}
