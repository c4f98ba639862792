//! # Lore Model
//!
//! The "world bible" of the lore graph: the vocabulary every other stage
//! speaks. This crate holds no graph algorithms.
//!
//! ## Contents
//!
//! - **entities**: canonical identifiers, the identity normalizer and literal/reference values
//! - **mechanics**: game vocabulary used when reading records (attributes, damage kinds, scaling grades)
//! - **records**: the finite category enumeration, tabular records and the record source seam
//! - **ontology**: class hierarchy and inverse-pair declarations consumed by closure
//! - **vocab**: predicate and class names shared by ingestion and persistence

pub mod entities;
pub mod error;
pub mod mechanics;
pub mod ontology;
pub mod records;
pub mod vocab;

pub use entities::*;
pub use error::*;
pub use mechanics::*;
pub use ontology::*;
pub use records::*;
