//! External links - `sameAs` statements tying entities to resources in
//! other datasets.
//!
//! The link table maps display names to absolute IRIs. It is configuration,
//! read from TOML like the rest of [`PipelineConfig`](crate::PipelineConfig);
//! a default table ships with the crate.

use lore_model::{vocab, Identifier, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error};

use crate::error::PipelineError;
use crate::knowledge_base::{ntriples, Triple};
use crate::registry::Registry;

const BUILTIN_LINKS: &str = include_str!("links.toml");

/// Display name to external IRI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalLinks {
    links: BTreeMap<String, String>,
}

/// Statements produced by applying the table to a registry.
#[derive(Debug, Clone, Default)]
pub struct LinkResolution {
    pub triples: Vec<Triple>,
    /// Names in the table that no registered entity answers to.
    pub unmatched: Vec<String>,
}

impl Default for ExternalLinks {
    fn default() -> Self {
        Self::builtin().unwrap_or_else(|err| {
            error!(%err, "built-in external link table is unusable");
            Self::empty()
        })
    }
}

impl ExternalLinks {
    pub fn empty() -> Self {
        Self {
            links: BTreeMap::new(),
        }
    }

    /// The link table shipped with the crate.
    pub fn builtin() -> Result<Self, PipelineError> {
        Self::from_toml_str(BUILTIN_LINKS)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        let links: Self = toml::from_str(text)?;
        links.validate()?;
        Ok(links)
    }

    /// Add a link (builder style).
    pub fn with_link(mut self, name: &str, iri: &str) -> Self {
        self.links.insert(name.to_string(), iri.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(name, iri)| (name.as_str(), iri.as_str()))
    }

    /// Every target must be an absolute http(s) IRI outside the graph's own
    /// namespaces, writable between angle brackets.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (name, iri) in &self.links {
            let absolute = iri.starts_with("http://") || iri.starts_with("https://");
            let writable = !iri.chars().any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"'));
            let foreign = !iri.starts_with(ntriples::VOCAB_NS);
            if name.trim().is_empty() || !absolute || !writable || !foreign {
                return Err(PipelineError::ExternalLink {
                    name: name.clone(),
                    iri: iri.clone(),
                });
            }
        }
        Ok(())
    }

    /// One `sameAs` statement per name the registry resolves.
    ///
    /// Several names may resolve to one entity; each keeps its own link.
    pub fn resolve(&self, registry: &Registry) -> LinkResolution {
        let mut resolution = LinkResolution::default();
        for (name, iri) in self.iter() {
            match registry.lookup(name) {
                Some(id) => resolution.triples.push(Self::link(id, iri)),
                None => {
                    debug!(name, "external link names no registered entity");
                    resolution.unmatched.push(name.to_string());
                }
            }
        }
        resolution
    }

    fn link(id: &Identifier, iri: &str) -> Triple {
        Triple::new(id.clone(), vocab::SAME_AS, Value::external(iri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AliasPolicy, RegistryBuilder};

    fn registry() -> Registry {
        let mut builder = RegistryBuilder::new(AliasPolicy::default());
        builder.register("Malenia, Blade of Miquella", "Boss");
        builder.register("Limgrave", "Location");
        builder.build()
    }

    #[test]
    fn test_builtin_table_is_ok() {
        let links = ExternalLinks::builtin().unwrap();
        assert!(!links.is_empty());
        assert_eq!(links, ExternalLinks::default());
        assert!(links.iter().all(|(_, iri)| iri.starts_with("http://www.wikidata.org/entity/Q")));
    }

    #[test]
    fn test_resolve_emits_same_as_for_registered_names() {
        let links = ExternalLinks::empty()
            .with_link("Malenia Blade of Miquella", "http://www.wikidata.org/entity/Q111174620")
            .with_link("Limgrave", "http://www.wikidata.org/entity/Q111174615")
            .with_link("Caelid", "http://www.wikidata.org/entity/Q111174168");

        let resolution = links.resolve(&registry());
        assert_eq!(resolution.unmatched, vec!["Caelid".to_string()]);
        assert_eq!(resolution.triples.len(), 2);
        assert!(resolution.triples.contains(&Triple::new(
            Identifier::from_name("Malenia, Blade of Miquella"),
            "sameAs",
            Value::external("http://www.wikidata.org/entity/Q111174620"),
        )));
    }

    #[test]
    fn test_from_toml_str() {
        let links = ExternalLinks::from_toml_str(
            r#"
            "Limgrave" = "https://www.wikidata.org/entity/Q111174615"
            "#,
        )
        .unwrap();
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_rejects_unusable_targets() {
        for iri in [
            "Q111174615",
            "http://example.org/has space",
            "http://www.semanticweb.org/fall2025/eldenring/id/Limgrave",
        ] {
            let links = ExternalLinks::empty().with_link("Limgrave", iri);
            assert!(
                matches!(links.validate(), Err(PipelineError::ExternalLink { .. })),
                "{iri}"
            );
        }
        assert!(matches!(
            ExternalLinks::from_toml_str("Limgrave = 3"),
            Err(PipelineError::Config(_))
        ));
    }
}
