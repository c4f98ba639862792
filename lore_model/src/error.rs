//! Errors raised by model-level collaborators.

use thiserror::Error;

/// A record source could not be read at all.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("record source `{source_name}` is unreadable: {reason}")]
    Unreadable { source_name: String, reason: String },
}

/// The ontology artifact is unusable.
#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("ontology is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("ontology declares an empty {what} name")]
    EmptyName { what: &'static str },

    #[error("inverse pair `{predicate}` names the reserved predicate `{reserved}`")]
    ReservedPredicate { predicate: String, reserved: String },
}

/// Type materialization cannot proceed for a class whose ancestry loops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("class `{class}` reaches a cycle in the class hierarchy")]
pub struct HierarchyCycle {
    pub class: crate::entities::Identifier,
}
