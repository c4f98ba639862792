//! Closure Engine - derives implied facts until nothing new follows.
//!
//! Two rules, both monotone and idempotent:
//!
//! - **type materialization**: an entity holding class `T` also holds every
//!   ancestor of `T` in the class hierarchy
//! - **inverse sync**: for each declared pair `(P, P')`, `(s, P, o)` implies
//!   `(o, P', s)`
//!
//! Each pass scans the whole store against both rules (in parallel when
//! asked), merges the candidates by set union and repeats until a pass adds
//! nothing. Passes must run in order; only the scan inside a pass is split.

use lore_model::{vocab, ClassHierarchy, HierarchyCycle, Identifier, OntologyConfig, Value};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::error::DataIssue;
use crate::knowledge_base::{GraphStore, KnowledgeGraph, Triple};

/// Where a closure run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClosureState {
    #[default]
    Running,
    /// A full pass added nothing. Terminal for the snapshot.
    Converged,
}

/// What one closure run derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureReport {
    /// Passes run, including the final pass that added nothing.
    pub passes: usize,
    pub type_triples_added: usize,
    pub inverse_triples_added: usize,
    /// One `CyclicHierarchy` per held class whose ancestry could not be
    /// walked; those classes are not materialized.
    pub issues: Vec<DataIssue>,
    pub state: ClosureState,
}

impl ClosureReport {
    pub fn triples_added(&self) -> usize {
        self.type_triples_added + self.inverse_triples_added
    }
}

/// Candidates found by one scan over the store.
#[derive(Debug, Default)]
struct Pass {
    types: BTreeSet<Triple>,
    inverses: BTreeSet<Triple>,
    cyclic: BTreeSet<Identifier>,
}

/// Runs type materialization and inverse sync to a fixpoint.
#[derive(Debug, Clone, Default)]
pub struct ClosureEngine {
    hierarchy: ClassHierarchy,
    inverses: BTreeMap<String, BTreeSet<String>>,
}

impl ClosureEngine {
    pub fn new(hierarchy: ClassHierarchy, inverses: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self { hierarchy, inverses }
    }

    pub fn from_ontology(ontology: &OntologyConfig) -> Self {
        Self::new(ontology.hierarchy(), ontology.inverse_map())
    }

    pub fn hierarchy(&self) -> &ClassHierarchy {
        &self.hierarchy
    }

    /// Close `store` and freeze the result.
    pub fn run(&self, mut store: GraphStore, parallel: bool) -> (KnowledgeGraph, ClosureReport) {
        let mut report = ClosureReport::default();
        let mut reported: BTreeSet<Identifier> = BTreeSet::new();

        while report.state == ClosureState::Running {
            let pass = self.scan(&store, parallel);
            report.passes += 1;

            for class in pass.cyclic {
                if reported.insert(class.clone()) {
                    warn!(%class, "class hierarchy cycle, type materialization skipped");
                    report.issues.push(DataIssue::CyclicHierarchy { class });
                }
            }

            let types = store.extend(pass.types);
            let inverses = store.extend(pass.inverses);
            report.type_triples_added += types;
            report.inverse_triples_added += inverses;
            debug!(pass = report.passes, types, inverses, "closure pass");

            if types + inverses == 0 {
                report.state = ClosureState::Converged;
            }
        }

        info!(
            passes = report.passes,
            added = report.triples_added(),
            triples = store.len(),
            "closure converged"
        );
        (KnowledgeGraph::freeze(store), report)
    }

    fn scan(&self, store: &GraphStore, parallel: bool) -> Pass {
        let ancestry: BTreeMap<&Identifier, Result<BTreeSet<Identifier>, HierarchyCycle>> = store
            .classes()
            .map(|class| (class, self.hierarchy.ancestors(class)))
            .collect();
        let subjects: Vec<&Identifier> = store.subjects().collect();
        let predicates: Vec<(&String, &BTreeSet<String>)> = self.inverses.iter().collect();

        let mut pass = Pass::default();
        if parallel {
            let (types, cyclic) = subjects
                .par_iter()
                .map(|s| Self::materialize(store, &ancestry, s))
                .reduce(Default::default, merge_types);
            pass.types = types;
            pass.cyclic = cyclic;
            pass.inverses = predicates
                .par_iter()
                .map(|(p, partners)| Self::synchronize(store, p, partners))
                .reduce(BTreeSet::new, union);
        } else {
            let (types, cyclic) = subjects
                .iter()
                .map(|s| Self::materialize(store, &ancestry, s))
                .fold(Default::default(), merge_types);
            pass.types = types;
            pass.cyclic = cyclic;
            pass.inverses = predicates
                .iter()
                .map(|(p, partners)| Self::synchronize(store, p, partners))
                .fold(BTreeSet::new(), union);
        }
        pass
    }

    /// Missing ancestor types of one subject, plus held classes on a cycle.
    fn materialize(
        store: &GraphStore,
        ancestry: &BTreeMap<&Identifier, Result<BTreeSet<Identifier>, HierarchyCycle>>,
        subject: &Identifier,
    ) -> (BTreeSet<Triple>, BTreeSet<Identifier>) {
        let mut types = BTreeSet::new();
        let mut cyclic = BTreeSet::new();
        for class in store.types_of(subject) {
            match ancestry.get(class) {
                Some(Ok(ancestors)) => {
                    for ancestor in ancestors {
                        let object = Value::Reference(ancestor.clone());
                        if !store.contains(subject, vocab::TYPE, &object) {
                            types.insert(Triple::new(subject.clone(), vocab::TYPE, object));
                        }
                    }
                }
                Some(Err(cycle)) => {
                    cyclic.insert(cycle.class.clone());
                }
                None => {}
            }
        }
        (types, cyclic)
    }

    /// Missing inverse triples for every use of `predicate`.
    fn synchronize(store: &GraphStore, predicate: &str, partners: &BTreeSet<String>) -> BTreeSet<Triple> {
        let mut out = BTreeSet::new();
        for (subject, object) in store.with_predicate(predicate) {
            let Value::Reference(target) = object else {
                continue;
            };
            let back = Value::Reference(subject.clone());
            for partner in partners {
                if !store.contains(target, partner, &back) {
                    out.insert(Triple::new(target.clone(), partner.as_str(), back.clone()));
                }
            }
        }
        out
    }
}

fn union(mut a: BTreeSet<Triple>, b: BTreeSet<Triple>) -> BTreeSet<Triple> {
    a.extend(b);
    a
}

fn merge_types(
    mut a: (BTreeSet<Triple>, BTreeSet<Identifier>),
    b: (BTreeSet<Triple>, BTreeSet<Identifier>),
) -> (BTreeSet<Triple>, BTreeSet<Identifier>) {
    a.0.extend(b.0);
    a.1.extend(b.1);
    a
}
