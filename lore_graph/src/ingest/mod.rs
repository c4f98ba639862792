//! Record Ingester - turns one tabular record into graph contributions.
//!
//! Every record gets a type assertion, a label, its description (scanned for
//! mentions) and the common columns. Category-specific extraction is looked
//! up in a [`HandlerTable`]. Records are independent, so a batch can be
//! ingested in parallel; each record yields an owned [`Contribution`] that a
//! single writer later merges into the store.

pub mod cell;
mod handlers;
pub mod numeric;

pub use cell::{Cell, CellParser, ParserChain, StructuredValue};
pub use handlers::*;
pub(crate) use handlers::{is_placeholder, keyed_pairs};

use lore_model::{vocab, Category, Identifier, Record, Value};
use rayon::prelude::*;
use tracing::debug;

use crate::error::DataIssue;
use crate::knowledge_base::{GraphStore, Triple};
use crate::linker::MentionLinker;
use crate::registry::Registry;

/// Triples and issues produced by one record.
#[derive(Debug, Clone, Default)]
pub struct Contribution {
    /// The record's entity; `None` if the record was skipped.
    pub subject: Option<Identifier>,
    pub triples: Vec<Triple>,
    pub issues: Vec<DataIssue>,
}

impl Contribution {
    fn skipped(issue: DataIssue) -> Self {
        Self {
            subject: None,
            triples: Vec::new(),
            issues: vec![issue],
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.subject.is_none()
    }

    /// Insert the triples into `store`; returns the issues.
    pub fn merge_into(self, store: &mut GraphStore) -> Vec<DataIssue> {
        store.extend(self.triples);
        self.issues
    }
}

/// Per-record extraction state handed to a [`CategoryHandler`].
pub struct RecordContext<'r> {
    record: &'r Record,
    subject: Identifier,
    registry: &'r Registry,
    linker: &'r MentionLinker,
    parsers: &'r ParserChain,
    triples: Vec<Triple>,
    issues: Vec<DataIssue>,
}

impl<'r> RecordContext<'r> {
    pub fn record(&self) -> &'r Record {
        self.record
    }

    pub fn category(&self) -> Category {
        self.record.category
    }

    pub fn subject(&self) -> &Identifier {
        &self.subject
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Trimmed, non-blank text of a column.
    pub fn text(&self, column: &str) -> Option<&'r str> {
        self.record.cell(column)
    }

    /// Text of the first present column among `columns`.
    pub fn first_text(&self, columns: &[&str]) -> Option<&'r str> {
        columns.iter().find_map(|c| self.record.cell(c))
    }

    /// Read a column through the parser chain.
    ///
    /// An unparseable cell is recorded as an issue and reads as absent.
    pub fn cell(&mut self, column: &str) -> Cell<'r> {
        match self.parsers.read(self.record.cell(column)) {
            Ok(cell) => cell,
            Err(_) => {
                debug!(category = %self.record.category, row = self.record.row, column, "unparseable cell");
                self.issues.push(DataIssue::MalformedStructuredField {
                    category: self.record.category,
                    row: self.record.row,
                    column: column.to_string(),
                });
                Cell::Absent
            }
        }
    }

    /// The first present column among `columns`, read through the chain.
    pub fn first_cell(&mut self, columns: &[&str]) -> Cell<'r> {
        match columns.iter().find(|c| self.record.cell(c).is_some()) {
            Some(column) => self.cell(column),
            None => Cell::Absent,
        }
    }

    pub fn add_type(&mut self, class: &str) {
        self.triples
            .push(Triple::type_assertion(self.subject.clone(), class));
    }

    pub fn add_value(&mut self, predicate: &str, value: Value) {
        self.triples
            .push(Triple::new(self.subject.clone(), predicate, value));
    }

    /// Add a whole number read from `column`.
    ///
    /// Amounts beyond the integer literal range are dropped and reported as
    /// a malformed field of `column`.
    pub fn add_integer(&mut self, predicate: &str, column: &str, amount: u64) {
        match i64::try_from(amount) {
            Ok(amount) => self.add_value(predicate, Value::integer(amount)),
            Err(_) => {
                debug!(category = %self.record.category, row = self.record.row, column, amount, "integer out of range");
                self.issues.push(DataIssue::MalformedStructuredField {
                    category: self.record.category,
                    row: self.record.row,
                    column: column.to_string(),
                });
            }
        }
    }

    pub fn add_text(&mut self, predicate: &str, text: &str) {
        self.add_value(predicate, Value::string(text.trim()));
    }

    /// Link the record's entity to the entity named `name`.
    ///
    /// Names the registry does not know become stubs typed `stub_class` and
    /// are reported as unresolved. Names with no alphanumeric content and
    /// references back to the subject itself are dropped. A trailing `:` is
    /// not part of the name.
    pub fn add_reference(&mut self, predicate: &str, name: &str, stub_class: &str) -> Option<Identifier> {
        let name = name.trim().trim_end_matches(':').trim_end();
        if !name.chars().any(char::is_alphanumeric) {
            return None;
        }

        let target = match self.registry.lookup(name) {
            Some(id) => id.clone(),
            None => {
                let id = Identifier::from_name(name);
                debug!(subject = %self.subject, predicate, target = name, "stubbing unresolved reference");
                self.triples.push(Triple::type_assertion(id.clone(), stub_class));
                self.triples.push(Triple::label(id.clone(), name));
                self.issues.push(DataIssue::UnresolvedReference {
                    subject: self.subject.clone(),
                    predicate: predicate.to_string(),
                    target: name.to_string(),
                });
                id
            }
        };

        if target == self.subject {
            return None;
        }
        self.triples
            .push(Triple::reference(self.subject.clone(), predicate, target.clone()));
        Some(target)
    }

    /// Link to `name` only if it is registered; returns whether it was.
    pub fn add_known_reference(&mut self, predicate: &str, name: &str) -> bool {
        match self.registry.lookup(name) {
            Some(target) if *target != self.subject => {
                self.triples
                    .push(Triple::reference(self.subject.clone(), predicate, target.clone()));
                true
            }
            _ => false,
        }
    }

    /// Emit one `mentions` edge per distinct registered name in `text`.
    pub fn add_mentions(&mut self, text: &str) {
        for target in self.linker.link(&self.subject, text) {
            self.triples
                .push(Triple::reference(self.subject.clone(), vocab::MENTIONS, target));
        }
    }

    fn finish(self) -> Contribution {
        Contribution {
            subject: Some(self.subject),
            triples: self.triples,
            issues: self.issues,
        }
    }
}

/// Ingests records against a frozen registry and compiled linker.
pub struct Ingester<'r> {
    registry: &'r Registry,
    linker: &'r MentionLinker,
    parsers: ParserChain,
    handlers: HandlerTable,
}

impl<'r> Ingester<'r> {
    pub fn new(registry: &'r Registry, linker: &'r MentionLinker) -> Self {
        Self {
            registry,
            linker,
            parsers: ParserChain::default(),
            handlers: HandlerTable::default(),
        }
    }

    pub fn with_parsers(mut self, parsers: ParserChain) -> Self {
        self.parsers = parsers;
        self
    }

    pub fn with_handlers(mut self, handlers: HandlerTable) -> Self {
        self.handlers = handlers;
        self
    }

    /// Whether records of this category are handled here.
    pub fn handles(&self, category: Category) -> bool {
        self.handlers.get(category).is_some()
    }

    /// Extract one record. Never fails: problems become issues.
    pub fn ingest_record(&self, record: &Record) -> Contribution {
        let Some(handler) = self.handlers.get(record.category) else {
            return Contribution::default();
        };
        let Some(name) = record.identity() else {
            return Contribution::skipped(DataIssue::MalformedRecord {
                category: record.category,
                row: record.row,
            });
        };

        let mut ctx = RecordContext {
            record,
            subject: Identifier::from_name(name),
            registry: self.registry,
            linker: self.linker,
            parsers: &self.parsers,
            triples: Vec::new(),
            issues: Vec::new(),
        };

        ctx.add_type(record.category.class());
        ctx.add_text(vocab::LABEL, name);
        extract_common(&mut ctx);
        handler.extract(&mut ctx);
        ctx.finish()
    }

    /// Extract a batch, optionally in parallel. Output order follows input.
    pub fn ingest(&self, records: &[Record], parallel: bool) -> Vec<Contribution> {
        if parallel {
            records.par_iter().map(|r| self.ingest_record(r)).collect()
        } else {
            records.iter().map(|r| self.ingest_record(r)).collect()
        }
    }
}

/// Columns every category may carry.
fn extract_common(ctx: &mut RecordContext<'_>) {
    if let Some(description) = ctx.text("description") {
        ctx.add_text(vocab::DESCRIPTION, description);
        ctx.add_mentions(description);
    }
    if let Some(game_id) = ctx.text("id").and_then(numeric::first_integer) {
        ctx.add_integer(vocab::GAME_ID, "id", game_id);
    }
    if let Some(image) = ctx.text("image") {
        ctx.add_text(vocab::IMAGE, image);
    }
    if let Some(weight) = ctx.text("weight").and_then(numeric::first_decimal) {
        ctx.add_value(vocab::WEIGHT, Value::float(weight));
    }
}
