//! Error types of the lore graph.
//!
//! Only [`PipelineError`] stops a run. Everything recoverable is a
//! [`DataIssue`]: it is logged, recorded in the run report and the run
//! carries on.

use lore_model::{Category, Identifier, OntologyError, SourceError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal pipeline failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Ontology(#[from] OntologyError),

    #[error("pipeline configuration is not valid TOML: {0}")]
    Config(#[from] toml::de::Error),

    #[error("external link for `{name}` is not an absolute http(s) IRI outside the graph: {iri}")]
    ExternalLink { name: String, iri: String },
}

/// A persisted statement line could not be read back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

/// Failures while saving or loading a persisted graph.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Recoverable data-quality problems found during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum DataIssue {
    /// The record has no identity cell and was skipped.
    #[error("{category} row {row}: no identity field, record skipped")]
    MalformedRecord { category: Category, row: usize },

    /// A semi-structured cell could not be parsed and was dropped.
    #[error("{category} row {row}: column `{column}` is not parseable, field dropped")]
    MalformedStructuredField {
        category: Category,
        row: usize,
        column: String,
    },

    /// A relation named a target the registry does not know.
    #[error("{subject} {predicate} `{target}`: target is not registered")]
    UnresolvedReference {
        subject: Identifier,
        predicate: String,
        target: String,
    },

    /// Two distinct display names normalize to one identifier; they merge.
    #[error("`{first}` and `{second}` both normalize to {id}, merged")]
    IdentifierCollision {
        id: Identifier,
        first: String,
        second: String,
    },

    /// Type materialization skipped a class whose ancestry loops.
    #[error("class {class} reaches a hierarchy cycle, materialization skipped")]
    CyclicHierarchy { class: Identifier },

    /// Upgrade rows name a base entity never seen in its primary category.
    #[error("{category}: upgrade rows for `{base}` have no base entity, skipped")]
    OrphanUpgrade { category: Category, base: String },

    /// One category of the source could not be read; the others were.
    #[error("{category}: unreadable, category skipped: {reason}")]
    UnreadableCategory { category: Category, reason: String },
}

/// Discriminant of a [`DataIssue`], used for report counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueKind {
    MalformedRecord,
    MalformedStructuredField,
    UnresolvedReference,
    IdentifierCollision,
    CyclicHierarchy,
    OrphanUpgrade,
    UnreadableCategory,
}

impl DataIssue {
    pub fn kind(&self) -> IssueKind {
        match self {
            DataIssue::MalformedRecord { .. } => IssueKind::MalformedRecord,
            DataIssue::MalformedStructuredField { .. } => IssueKind::MalformedStructuredField,
            DataIssue::UnresolvedReference { .. } => IssueKind::UnresolvedReference,
            DataIssue::IdentifierCollision { .. } => IssueKind::IdentifierCollision,
            DataIssue::CyclicHierarchy { .. } => IssueKind::CyclicHierarchy,
            DataIssue::OrphanUpgrade { .. } => IssueKind::OrphanUpgrade,
            DataIssue::UnreadableCategory { .. } => IssueKind::UnreadableCategory,
        }
    }
}
