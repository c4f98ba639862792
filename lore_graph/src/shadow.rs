//! Shadow Node Synthesizer - one derived stat block per upgrade path.
//!
//! Upgrade categories hold one row per `(base, path, level)`. Rows are
//! grouped by the node they derive, so paths that normalize alike share a
//! group; the highest level of each group becomes a `StatBlock` node linked
//! from its base by `hasMaxStats`.

use lore_model::{vocab, Attribute, Category, DamageKind, Identifier, Record, ScalingGrade, Value};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::error::DataIssue;
use crate::ingest::{is_placeholder, keyed_pairs, numeric, ParserChain};
use crate::knowledge_base::Triple;
use crate::registry::Registry;

/// Path assigned to rows whose upgrade cell names none.
pub const BASELINE_PATH: &str = "Standard";

/// Path and level parsed from an upgrade cell such as `"Heavy +5"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeStep {
    pub path: String,
    pub level: u32,
}

impl UpgradeStep {
    /// Parse `"Heavy Dagger +5"` given base name `"Dagger"`.
    ///
    /// The base name is removed from the path. A blank path is
    /// [`BASELINE_PATH`]; a missing or unparsable level is zero.
    pub fn parse(text: &str, base_name: &str) -> Self {
        let text = text.trim();
        let (path, level) = match text.rsplit_once('+') {
            Some((path, level)) => (path, level.trim().parse().unwrap_or(0)),
            None => (text, 0),
        };

        let path = path.replace(base_name, " ");
        let path = path.split_whitespace().collect::<Vec<_>>().join(" ");
        let path = if path.is_empty() {
            BASELINE_PATH.to_string()
        } else {
            path
        };
        Self { path, level }
    }
}

/// Derived nodes and links produced by one synthesis run.
#[derive(Debug, Clone, Default)]
pub struct Synthesis {
    pub nodes: Vec<Identifier>,
    pub triples: Vec<Triple>,
    pub issues: Vec<DataIssue>,
}

/// Groups upgrade rows and builds stat-block nodes.
pub struct ShadowSynthesizer<'r> {
    registry: &'r Registry,
    parsers: ParserChain,
}

struct Group<'a> {
    base: Identifier,
    base_name: &'a str,
    step: UpgradeStep,
    record: &'a Record,
}

impl<'r> ShadowSynthesizer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            parsers: ParserChain::default(),
        }
    }

    pub fn with_parsers(mut self, parsers: ParserChain) -> Self {
        self.parsers = parsers;
        self
    }

    /// Synthesize nodes for the upgrade rows in `records`.
    ///
    /// Rows of non-upgrade categories are ignored. Rows whose base was never
    /// registered in its primary category are skipped and reported once per
    /// base.
    pub fn synthesize(&self, records: &[Record], parallel: bool) -> Synthesis {
        let mut synthesis = Synthesis::default();
        let mut orphans: BTreeSet<(Category, String)> = BTreeSet::new();
        let mut groups: BTreeMap<Identifier, Group<'_>> = BTreeMap::new();

        for record in records {
            let Some(base_category) = record.category.base_category() else {
                continue;
            };
            let Some(base_name) = record.identity() else {
                synthesis.issues.push(DataIssue::MalformedRecord {
                    category: record.category,
                    row: record.row,
                });
                continue;
            };
            let base = match self.registry.lookup(base_name) {
                Some(id) if self.registry.has_class(id, base_category.class()) => id.clone(),
                _ => {
                    if orphans.insert((record.category, base_name.to_string())) {
                        warn!(category = %record.category, base = base_name, "upgrade rows for unknown base");
                    }
                    continue;
                }
            };

            let step = UpgradeStep::parse(record.cell("upgrade").unwrap_or_default(), base_name);
            let key = Identifier::shadow(&base, &step.path);
            let candidate = Group {
                base,
                base_name,
                step,
                record,
            };
            match groups.get_mut(&key) {
                Some(best) if !Self::outranks(&candidate, best) => {}
                Some(best) => *best = candidate,
                None => {
                    groups.insert(key, candidate);
                }
            }
        }

        synthesis
            .issues
            .extend(orphans.into_iter().map(|(category, base)| DataIssue::OrphanUpgrade { category, base }));

        let built: Vec<(Identifier, Vec<Triple>, Vec<DataIssue>)> = if parallel {
            groups.into_iter().collect::<Vec<_>>().par_iter().map(|(node, g)| self.build(node, g)).collect()
        } else {
            groups.iter().map(|(node, g)| self.build(node, g)).collect()
        };

        for (node, triples, issues) in built {
            synthesis.nodes.push(node);
            synthesis.triples.extend(triples);
            synthesis.issues.extend(issues);
        }
        debug!(nodes = synthesis.nodes.len(), "shadow synthesis finished");
        synthesis
    }

    /// Higher level wins; equal levels keep the earlier row.
    fn outranks(candidate: &Group<'_>, best: &Group<'_>) -> bool {
        candidate.step.level > best.step.level
            || (candidate.step.level == best.step.level && candidate.record.row < best.record.row)
    }

    fn build(&self, node: &Identifier, group: &Group<'_>) -> (Identifier, Vec<Triple>, Vec<DataIssue>) {
        let record = group.record;
        let node = node.clone();
        let mut issues = Vec::new();
        let mut triples = vec![
            Triple::type_assertion(node.clone(), vocab::STAT_BLOCK),
            Triple::label(
                node.clone(),
                format!("{} ({} +{})", group.base_name, group.step.path, group.step.level),
            ),
            Triple::new(node.clone(), vocab::UPGRADE_PATH, Value::string(group.step.path.as_str())),
            Triple::new(node.clone(), vocab::UPGRADE_LEVEL, Value::integer(i64::from(group.step.level))),
            Triple::reference(group.base.clone(), vocab::HAS_MAX_STATS, node.clone()),
        ];

        let mut read = |column: &str| match self.parsers.read(record.cell(column)) {
            Ok(cell) => keyed_pairs(&cell),
            Err(_) => {
                issues.push(DataIssue::MalformedStructuredField {
                    category: record.category,
                    row: record.row,
                    column: column.to_string(),
                });
                Vec::new()
            }
        };

        for (key, amount) in read("attack power") {
            if let (Some(kind), Some(amount)) = (DamageKind::from_abbreviation(&key), numeric::first_decimal(&amount)) {
                triples.push(Triple::new(node.clone(), kind.attack_predicate(), Value::float(amount)));
            }
        }
        for (key, grade) in read("stat scaling") {
            if let (Some(attribute), Some(grade)) = (Attribute::from_abbreviation(&key), ScalingGrade::parse(&grade)) {
                triples.push(Triple::new(node.clone(), attribute.scaling_predicate(), Value::string(grade.as_str())));
            }
        }
        for (key, amount) in read("damage reduction (%)") {
            if is_placeholder(&amount) {
                continue;
            }
            if let (Some(kind), Some(amount)) = (DamageKind::from_abbreviation(&key), numeric::first_decimal(&amount)) {
                triples.push(Triple::new(node.clone(), kind.negation_predicate(), Value::float(amount)));
            }
        }

        (node, triples, issues)
    }
}
