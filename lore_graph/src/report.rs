//! Run-level accounting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::closure::ClosureReport;
use crate::error::{DataIssue, IssueKind};

/// Unique identifier of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a run did and every recoverable issue it met.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,

    /// Display names registered in the registry pass.
    pub names_registered: usize,

    /// Records handed to the ingester, and how many produced an entity.
    pub records_seen: usize,
    pub records_ingested: usize,

    /// Triples in the store before closure.
    pub triples_ingested: usize,

    pub shadow_nodes: usize,

    /// `sameAs` statements attached from the external link table.
    pub external_links: usize,

    pub closure: ClosureReport,

    /// Triples in the final, converged graph.
    pub triples_final: usize,

    pub issues: Vec<DataIssue>,
}

impl RunReport {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            ..Self::default()
        }
    }

    pub fn record(&mut self, issue: DataIssue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = DataIssue>) {
        self.issues.extend(issues);
    }

    /// Number of recorded issues of one kind.
    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind() == kind).count()
    }

    /// Issue counts by kind; kinds that never occurred are absent.
    pub fn issue_counts(&self) -> BTreeMap<IssueKind, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_model::Category;

    #[test]
    fn test_issue_counts() {
        let mut report = RunReport::new(RunId::new());
        report.record(DataIssue::MalformedRecord {
            category: Category::Bosses,
            row: 0,
        });
        report.record(DataIssue::MalformedRecord {
            category: Category::Npcs,
            row: 2,
        });
        report.record(DataIssue::OrphanUpgrade {
            category: Category::WeaponUpgrades,
            base: "Nameless Blade".into(),
        });

        assert_eq!(report.count(IssueKind::MalformedRecord), 2);
        assert_eq!(report.count(IssueKind::CyclicHierarchy), 0);
        assert_eq!(report.issue_counts().len(), 2);
    }

    #[test]
    fn test_report_serializes() {
        let report = RunReport::new(RunId::new());
        let json = report.to_json().unwrap();
        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run_id, report.run_id);
    }
}
