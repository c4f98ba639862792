//! # Lore Graph
//!
//! Turns the tabular records of a fictional world into one consistent,
//! closure-complete knowledge graph. This crate owns the algorithms; the
//! vocabulary it speaks lives in `lore_model`.
//!
//! ## Pipeline
//!
//! 1. **registry**: one pass over every source assigns identifiers to names
//! 2. **linker**: the frozen registry compiles into a multi-pattern text matcher
//! 3. **ingest**: each record becomes a set of triples (parallel across records)
//! 4. **shadow**: upgrade rows collapse into one max-level node per path
//! 5. **external**: configured `sameAs` links attach to registered entities
//! 6. **closure**: type materialization and inverse sync run to a fixpoint
//!
//! The result is a [`KnowledgeGraph`]: read-only, persisted with
//! [`knowledge_base::ntriples`] and flattened for retrieval with
//! [`EntityDocument`].

pub mod closure;
pub mod error;
pub mod external;
pub mod ingest;
pub mod knowledge_base;
pub mod linker;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod shadow;

pub use closure::*;
pub use error::*;
pub use external::*;
pub use ingest::{Contribution, Ingester};
pub use knowledge_base::*;
pub use linker::*;
pub use pipeline::*;
pub use registry::*;
pub use report::*;
pub use shadow::*;
