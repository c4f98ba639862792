//! Pipeline orchestration.
//!
//! Phases run strictly one after another; each completes before the next
//! reads its output:
//!
//! 1. read every source and build the registry
//! 2. compile the mention linker from the frozen registry
//! 3. ingest all non-upgrade records
//! 4. synthesize shadow nodes from upgrade records
//! 5. attach external links
//! 6. audit dangling references
//! 7. run closure to a fixpoint
//!
//! Only the closed graph leaves [`Pipeline::run`].

use lore_model::{OntologyConfig, Record, RecordSource};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::closure::ClosureEngine;
use crate::error::{DataIssue, PipelineError};
use crate::external::ExternalLinks;
use crate::ingest::Ingester;
use crate::knowledge_base::{GraphStore, KnowledgeGraph};
use crate::linker::MentionLinker;
use crate::registry::{AliasPolicy, Registry, RegistryBuilder};
use crate::report::{RunId, RunReport};
use crate::shadow::ShadowSynthesizer;

/// Configuration of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// When a name prefix becomes a mention alias.
    pub alias: AliasPolicy,

    /// Spread ingestion, synthesis and closure scans over a thread pool.
    pub parallel: bool,

    /// Class hierarchy and inverse relations used by closure.
    pub ontology: OntologyConfig,

    /// Display names mapped to the external resources they are the same as.
    pub external_links: ExternalLinks,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            alias: AliasPolicy::default(),
            parallel: true,
            ontology: OntologyConfig::default(),
            external_links: ExternalLinks::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML configuration; omitted sections keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        let config: Self = toml::from_str(text)?;
        config.ontology.validate()?;
        config.external_links.validate()?;
        Ok(config)
    }
}

/// Builds a closed knowledge graph from a record source.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(PipelineConfig::default())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every phase over `source`.
    ///
    /// Fails only when no category of the source can be read. Every other
    /// problem is recorded in the returned report.
    pub fn run(&self, source: &dyn RecordSource) -> Result<(KnowledgeGraph, RunReport), PipelineError> {
        let run_id = RunId::new();
        let mut report = RunReport::new(run_id);
        let parallel = self.config.parallel;

        let (records, registry) = info_span!("registry", %run_id).in_scope(|| {
            let records = Self::read_all(source, &mut report)?;
            let registry = self.build_registry(&records);
            info!(entities = registry.len(), names = registry.name_count(), "registry built");
            Ok::<_, PipelineError>((records, registry))
        })?;
        report.names_registered = registry.name_count();
        report.extend(registry.collisions().iter().cloned());

        let linker = info_span!("linker", %run_id).in_scope(|| MentionLinker::compile(&registry));

        let mut store = GraphStore::new();
        info_span!("ingest", %run_id).in_scope(|| {
            let ingester = Ingester::new(&registry, &linker);
            let primary: Vec<Record> = records
                .iter()
                .filter(|r| ingester.handles(r.category))
                .cloned()
                .collect();
            report.records_seen = primary.len();

            for contribution in ingester.ingest(&primary, parallel) {
                if !contribution.is_skipped() {
                    report.records_ingested += 1;
                }
                let issues = contribution.merge_into(&mut store);
                report.extend(issues);
            }
            info!(
                records = report.records_ingested,
                skipped = report.records_seen - report.records_ingested,
                triples = store.len(),
                "records ingested"
            );
        });

        info_span!("shadow", %run_id).in_scope(|| {
            let synthesis = ShadowSynthesizer::new(&registry).synthesize(&records, parallel);
            report.shadow_nodes = synthesis.nodes.len();
            store.extend(synthesis.triples);
            report.extend(synthesis.issues);
            info!(nodes = report.shadow_nodes, "shadow nodes synthesized");
        });

        info_span!("external", %run_id).in_scope(|| {
            let resolution = self.config.external_links.resolve(&registry);
            report.external_links = resolution.triples.len();
            store.extend(resolution.triples);
            info!(
                links = report.external_links,
                unmatched = resolution.unmatched.len(),
                "external links attached"
            );
        });

        info_span!("audit", %run_id).in_scope(|| {
            for triple in store.dangling_references() {
                if let Some(target) = triple.object.as_reference() {
                    warn!(subject = %triple.subject, predicate = %triple.predicate, %target, "dangling reference");
                    report.record(DataIssue::UnresolvedReference {
                        subject: triple.subject.clone(),
                        predicate: triple.predicate.clone(),
                        target: target.to_string(),
                    });
                }
            }
        });
        report.triples_ingested = store.len();

        let graph = info_span!("closure", %run_id).in_scope(|| {
            let engine = ClosureEngine::from_ontology(&self.config.ontology);
            let (graph, closure) = engine.run(store, parallel);
            report.extend(closure.issues.iter().cloned());
            report.closure = closure;
            graph
        });
        report.triples_final = graph.len();

        info!(
            %run_id,
            triples = report.triples_final,
            issues = report.issues.len(),
            "pipeline finished"
        );
        Ok((graph, report))
    }

    /// Every record of every readable category the source offers.
    ///
    /// An unreadable category is skipped and reported; the run fails only
    /// when the source offers categories and none of them can be read.
    fn read_all(source: &dyn RecordSource, report: &mut RunReport) -> Result<Vec<Record>, PipelineError> {
        let mut records = Vec::new();
        let mut read = 0;
        let mut last_error = None;
        for category in source.categories() {
            match source.records(category) {
                Ok(mut batch) => {
                    info!(%category, rows = batch.len(), "source read");
                    records.append(&mut batch);
                    read += 1;
                }
                Err(err) => {
                    warn!(%category, %err, "category unreadable, skipped");
                    report.record(DataIssue::UnreadableCategory {
                        category,
                        reason: err.to_string(),
                    });
                    last_error = Some(err);
                }
            }
        }
        match last_error {
            Some(err) if read == 0 => Err(err.into()),
            _ => Ok(records),
        }
    }

    /// One pass over all primary records; upgrade rows only refine entities
    /// and never introduce names.
    fn build_registry(&self, records: &[Record]) -> Registry {
        let mut builder = RegistryBuilder::new(self.config.alias.clone());
        for record in records.iter().filter(|r| !r.category.is_upgrade()) {
            if let Some(name) = record.identity() {
                builder.register(name, record.category.class());
            }
        }
        builder.build()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}
