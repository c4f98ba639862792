//! Per-entity documents for the retrieval layer.
//!
//! A document flattens one entity into text: its label, description, types
//! and `(predicate, object)` facts with references resolved to labels.

use lore_model::{Identifier, Value};
use serde::{Deserialize, Serialize};

use super::GraphStore;

/// One `(predicate text, object text)` line of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFact {
    pub predicate: String,
    pub object: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDocument {
    pub id: Identifier,
    /// The entity's label, or its identifier when it has none.
    pub title: String,
    pub description: Option<String>,
    pub types: Vec<String>,
    /// Ordered by predicate name, then by object.
    pub facts: Vec<DocumentFact>,
}

impl EntityDocument {
    pub fn build(graph: &GraphStore, id: &Identifier) -> Option<Self> {
        let entity = graph.entity(id)?;

        let facts = entity
            .properties()
            .flat_map(|(predicate, values)| {
                let predicate = humanize(predicate);
                values.iter().map(move |value| DocumentFact {
                    predicate: predicate.clone(),
                    object: object_text(graph, value),
                })
            })
            .collect();

        Some(Self {
            id: id.clone(),
            title: entity.label().unwrap_or(id.as_str()).to_string(),
            description: entity.description().map(str::to_string),
            types: entity.types().map(|t| t.as_str().to_string()).collect(),
            facts,
        })
    }

    /// Documents of every entity, in identifier order.
    pub fn all(graph: &GraphStore) -> Vec<Self> {
        graph
            .subjects()
            .filter_map(|id| Self::build(graph, id))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Plain-text rendering, one fact per line.
    pub fn render(&self) -> String {
        let mut out = self.title.clone();
        if !self.types.is_empty() {
            out.push_str("\nTypes: ");
            out.push_str(&self.types.join(", "));
        }
        if let Some(description) = &self.description {
            out.push('\n');
            out.push_str(description);
        }
        for fact in &self.facts {
            out.push_str(&format!("\n- {}: {}", fact.predicate, fact.object));
        }
        out
    }
}

fn object_text(graph: &GraphStore, value: &Value) -> String {
    match value {
        Value::Reference(target) => graph
            .label(target)
            .unwrap_or(target.as_str())
            .to_string(),
        Value::Literal(literal) => literal.raw.clone(),
        Value::External(iri) => iri.clone(),
    }
}

/// `requiresStrength` -> `requires strength`; acronyms keep their case.
fn humanize(predicate: &str) -> String {
    let chars: Vec<char> = predicate.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let boundary = i > 0
            && c.is_ascii_uppercase()
            && (!chars[i - 1].is_ascii_uppercase()
                || chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase()));
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .into_iter()
        .map(|w| {
            if w.len() > 1 && w.chars().all(|c| c.is_ascii_uppercase()) {
                w
            } else {
                w.to_ascii_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
