//! Knowledge Base module - the triple store every stage writes into.
//!
//! The store consists of:
//! - **Triples**: `(subject, predicate, object)` facts with set semantics
//! - **Entity views**: every triple of one subject grouped by predicate
//! - **Persistence**: a line-oriented statement format that round-trips exactly
//! - **Documents**: per-entity flattening for the retrieval layer

pub mod document;
mod entity;
mod graph;
pub mod ntriples;
mod triple;

pub use document::EntityDocument;
pub use entity::*;
pub use graph::*;
pub use triple::*;
