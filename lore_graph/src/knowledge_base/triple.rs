//! Triple definitions - the unit fact of the graph.

use lore_model::{vocab, Identifier, Value};
use serde::{Deserialize, Serialize};

/// One `(subject, predicate, object)` fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Identifier,
    pub predicate: String,
    pub object: Value,
}

impl Triple {
    pub fn new(subject: Identifier, predicate: impl Into<String>, object: Value) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }

    /// `subject type class`.
    pub fn type_assertion(subject: Identifier, class: &str) -> Self {
        Self::new(
            subject,
            vocab::TYPE,
            Value::Reference(Identifier::from_raw(class)),
        )
    }

    pub fn label(subject: Identifier, text: impl Into<String>) -> Self {
        Self::new(subject, vocab::LABEL, Value::string(text))
    }

    pub fn reference(subject: Identifier, predicate: impl Into<String>, target: Identifier) -> Self {
        Self::new(subject, predicate, Value::Reference(target))
    }

    pub fn is_type_assertion(&self) -> bool {
        self.predicate == vocab::TYPE
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.object {
            Value::Reference(id) => write!(f, "{} {} {}", self.subject, self.predicate, id),
            Value::Literal(lit) => write!(f, "{} {} {:?}", self.subject, self.predicate, lit.raw),
            Value::External(iri) => write!(f, "{} {} <{}>", self.subject, self.predicate, iri),
        }
    }
}
