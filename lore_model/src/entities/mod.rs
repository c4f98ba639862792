//! Entity identities for the lore graph.
//!
//! Every entity is keyed by an [`Identifier`] derived from its display name by
//! [`normalize`]. The mapping is many-to-one: distinct names can collapse to
//! the same identifier (and empty or symbol-only names all collapse to
//! [`SENTINEL`]). Callers merge on collision and report it.

mod value;

pub use value::*;

use serde::{Deserialize, Serialize};

/// Identifier reserved for names with no alphanumeric content.
pub const SENTINEL: &str = "Unknown";

/// Separates a base identifier from the grouping key of a derived node.
///
/// [`normalize`] only ever emits ASCII alphanumerics, so no primary identifier
/// can contain it.
pub const SHADOW_SEPARATOR: char = '/';

/// Canonical, deterministic key of an entity or class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Derive the identifier of a display name.
    pub fn from_name(name: &str) -> Self {
        Self(normalize(name))
    }

    /// Wrap an already-canonical token, e.g. a class name or a persisted id.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The identifier every symbol-only name collapses to.
    pub fn sentinel() -> Self {
        Self(SENTINEL.to_string())
    }

    /// Identifier of a node derived from `base` and a grouping key.
    pub fn shadow(base: &Identifier, key: &str) -> Self {
        Self(format!("{}{}{}", base.0, SHADOW_SEPARATOR, normalize(key)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_sentinel(&self) -> bool {
        self.0 == SENTINEL
    }

    /// Whether this identifier was produced by [`Identifier::shadow`].
    pub fn is_shadow(&self) -> bool {
        self.0.contains(SHADOW_SEPARATOR)
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Map a display name to its canonical identifier text.
///
/// `+` reads as "Plus" and `&` as "And"; apostrophes vanish; any other
/// non-alphanumeric character separates words. Words are split further at
/// camel-case boundaries, capitalized and concatenated, so "Godrick the
/// Grafted", "GODRICK THE GRAFTED" and "GodrickTheGrafted" all become
/// `GodrickTheGrafted`.
///
/// One pass can expose new camel boundaries ("A Tale" -> "ATale"), so passes
/// repeat until the text stops changing. Every pass keeps or removes capital
/// letters and never adds one past the first position, which bounds the loop
/// by the length of the text.
pub fn normalize(name: &str) -> String {
    let mut current = normalize_once(name);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut chunk = String::new();

    for ch in name.chars() {
        match ch {
            '+' => {
                flush_chunk(&mut chunk, &mut words);
                words.push("Plus".to_string());
            }
            '&' => {
                flush_chunk(&mut chunk, &mut words);
                words.push("And".to_string());
            }
            '\'' | '\u{2019}' => {}
            c if c.is_ascii_alphanumeric() => chunk.push(c),
            _ => flush_chunk(&mut chunk, &mut words),
        }
    }
    flush_chunk(&mut chunk, &mut words);

    if words.is_empty() {
        return SENTINEL.to_string();
    }
    words.iter().map(|w| capitalize(w)).collect()
}

fn flush_chunk(chunk: &mut String, words: &mut Vec<String>) {
    if chunk.is_empty() {
        return;
    }
    words.extend(split_camel(chunk).into_iter().map(str::to_string));
    chunk.clear();
}

/// Split an ASCII alphanumeric run before each capital that follows a
/// non-capital, and before the last capital of an acronym that starts a word.
fn split_camel(chunk: &str) -> Vec<&str> {
    let bytes = chunk.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;

    for i in 1..bytes.len() {
        let prev = bytes[i - 1];
        let cur = bytes[i];
        let next_is_lower = bytes.get(i + 1).is_some_and(|b| b.is_ascii_lowercase());
        if cur.is_ascii_uppercase() && (!prev.is_ascii_uppercase() || next_is_lower) {
            parts.push(&chunk[start..i]);
            start = i;
        }
    }
    parts.push(&chunk[start..]);
    parts
}

fn capitalize(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.push(first.to_ascii_uppercase());
        out.extend(chars.map(|c| c.to_ascii_lowercase()));
    }
    out
}
