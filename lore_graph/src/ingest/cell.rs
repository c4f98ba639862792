//! Semi-structured cell reading.
//!
//! Cells may embed nested key/value or list syntax as text. Reading one tries
//! an ordered chain of [`CellParser`]s: a strict literal parser, JSON, then a
//! regular-expression scan. If every parser fails the cell is reported as
//! unparseable and callers treat it as absent.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag},
    character::complete::{char, digit1, multispace0, none_of},
    combinator::{all_consuming, map, opt, recognize, value},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};
use regex::Regex;
use std::sync::LazyLock;

/// Parsed form of a semi-structured cell.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredValue {
    /// Key/value pairs in source order.
    Map(Vec<(String, StructuredValue)>),
    List(Vec<StructuredValue>),
    Scalar(String),
}

impl StructuredValue {
    pub fn scalar(text: impl Into<String>) -> Self {
        StructuredValue::Scalar(text.into())
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            StructuredValue::Scalar(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, StructuredValue)]> {
        match self {
            StructuredValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Value of the first key equal to `key`, ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<&StructuredValue> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// Elements of a list; a lone scalar or map is a one-element list.
    pub fn items(&self) -> Vec<&StructuredValue> {
        match self {
            StructuredValue::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }

    /// Every non-blank scalar inside, depth first.
    pub fn scalars(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_scalars(&mut out);
        out
    }

    fn collect_scalars<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            StructuredValue::Scalar(s) if !s.trim().is_empty() => out.push(s.trim()),
            StructuredValue::Scalar(_) => {}
            StructuredValue::List(items) => items.iter().for_each(|i| i.collect_scalars(out)),
            StructuredValue::Map(entries) => entries.iter().for_each(|(_, v)| v.collect_scalars(out)),
        }
    }
}

/// A cell after reading.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Structured(StructuredValue),
    Unstructured(&'a str),
    Absent,
}

impl<'a> Cell<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }

    /// Scalars of a structured cell, or the raw text as a single item.
    pub fn scalars(&self) -> Vec<&str> {
        match self {
            Cell::Structured(v) => v.scalars(),
            Cell::Unstructured(text) => vec![*text],
            Cell::Absent => Vec::new(),
        }
    }
}

/// The text looked structured but no parser in the chain understood it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnparseableCell;

/// One strategy for turning cell text into a [`StructuredValue`].
pub trait CellParser: Send + Sync {
    fn name(&self) -> &'static str;

    fn parse(&self, text: &str) -> Option<StructuredValue>;
}

/// Ordered fallback chain of parsers.
pub struct ParserChain {
    parsers: Vec<Box<dyn CellParser>>,
}

impl Default for ParserChain {
    fn default() -> Self {
        Self::new()
            .with_parser(LiteralParser)
            .with_parser(JsonParser)
            .with_parser(KeyValueScanParser)
    }
}

impl ParserChain {
    /// An empty chain; every structured-looking cell is unparseable.
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    pub fn with_parser(mut self, parser: impl CellParser + 'static) -> Self {
        self.parsers.push(Box::new(parser));
        self
    }

    pub fn parser_names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    /// Read a raw cell.
    ///
    /// Blank cells are absent. Text opening with `{`, `[` or `(` must parse
    /// through the chain; anything else is unstructured text.
    pub fn read<'a>(&self, raw: Option<&'a str>) -> Result<Cell<'a>, UnparseableCell> {
        let text = match raw.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Ok(Cell::Absent),
        };
        if !text.starts_with(['{', '[', '(']) {
            return Ok(Cell::Unstructured(text));
        }
        self.parsers
            .iter()
            .find_map(|p| p.parse(text))
            .map(Cell::Structured)
            .ok_or(UnparseableCell)
    }
}

// ============================================================================
// Literal parser
// ============================================================================

/// Strict parser for literal syntax: dicts, lists, tuples, quoted strings,
/// numbers, `None`, `True` and `False`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralParser;

impl CellParser for LiteralParser {
    fn name(&self) -> &'static str {
        "literal"
    }

    fn parse(&self, text: &str) -> Option<StructuredValue> {
        all_consuming(delimited(multispace0, literal, multispace0))(text)
            .ok()
            .map(|(_, v)| v)
    }
}

fn literal(input: &str) -> IResult<&str, StructuredValue> {
    alt((
        dict,
        map(sequence('[', ']'), StructuredValue::List),
        map(sequence('(', ')'), StructuredValue::List),
        map(quoted, StructuredValue::Scalar),
        map(number, StructuredValue::scalar),
        value(StructuredValue::scalar(""), tag("None")),
        value(StructuredValue::scalar("True"), tag("True")),
        value(StructuredValue::scalar("False"), tag("False")),
    ))(input)
}

fn ws<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, inner, multispace0)
}

fn dict(input: &str) -> IResult<&str, StructuredValue> {
    let key = alt((quoted, map(number, str::to_string)));
    let entry = separated_pair(ws(key), char(':'), ws(literal));
    map(
        delimited(
            char('{'),
            terminated(separated_list0(char(','), entry), opt(ws(char(',')))),
            preceded(multispace0, char('}')),
        ),
        StructuredValue::Map,
    )(input)
}

fn sequence<'a>(
    open: char,
    close: char,
) -> impl FnMut(&'a str) -> IResult<&'a str, Vec<StructuredValue>> {
    delimited(
        char(open),
        terminated(separated_list0(char(','), ws(literal)), opt(ws(char(',')))),
        preceded(multispace0, char(close)),
    )
}

fn number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    alt((quoted_with('\''), quoted_with('"')))(input)
}

fn quoted_with<'a>(quote: char) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    let normal: &'static str = if quote == '\'' { "'\\" } else { "\"\\" };
    delimited(
        char(quote),
        map(
            opt(escaped_transform(
                none_of(normal),
                '\\',
                alt((
                    value('\\', char('\\')),
                    value('\'', char('\'')),
                    value('"', char('"')),
                    value('\n', char('n')),
                    value('\t', char('t')),
                )),
            )),
            Option::unwrap_or_default,
        ),
        char(quote),
    )
}

// ============================================================================
// JSON parser
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl CellParser for JsonParser {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, text: &str) -> Option<StructuredValue> {
        serde_json::from_str::<serde_json::Value>(text)
            .ok()
            .map(from_json)
    }
}

fn from_json(value: serde_json::Value) -> StructuredValue {
    use serde_json::Value as Json;
    match value {
        Json::Object(entries) => {
            StructuredValue::Map(entries.into_iter().map(|(k, v)| (k, from_json(v))).collect())
        }
        Json::Array(items) => StructuredValue::List(items.into_iter().map(from_json).collect()),
        Json::String(s) => StructuredValue::Scalar(s),
        Json::Null => StructuredValue::scalar(""),
        other => StructuredValue::Scalar(other.to_string()),
    }
}

// ============================================================================
// Regular-expression scan
// ============================================================================

/// Best-effort recovery for truncated or otherwise broken literals: quoted
/// `key: value` pairs inside braces, quoted items inside brackets.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyValueScanParser;

static PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]([^'"]+)['"]\s*:\s*(?:['"]([^'"]*)['"]|(-?\d+(?:[.,]\d+)*))"#).unwrap()
});

static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"'([^']*)'|"([^"]*)""#).unwrap());

impl CellParser for KeyValueScanParser {
    fn name(&self) -> &'static str {
        "key-value scan"
    }

    fn parse(&self, text: &str) -> Option<StructuredValue> {
        if text.starts_with('{') {
            let entries: Vec<(String, StructuredValue)> = PAIR_RE
                .captures_iter(text)
                .filter_map(|caps| {
                    let key = caps.get(1)?.as_str().trim().to_string();
                    let value = caps.get(2).or_else(|| caps.get(3))?.as_str().trim();
                    Some((key, StructuredValue::scalar(value)))
                })
                .collect();
            (!entries.is_empty()).then_some(StructuredValue::Map(entries))
        } else {
            let items: Vec<StructuredValue> = ITEM_RE
                .captures_iter(text)
                .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
                .map(|m| StructuredValue::scalar(m.as_str()))
                .collect();
            (!items.is_empty()).then_some(StructuredValue::List(items))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> StructuredValue {
        StructuredValue::Map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), StructuredValue::scalar(*v)))
                .collect(),
        )
    }

    #[test]
    fn test_literal_dict() {
        let parsed = LiteralParser.parse("{'Str': '12', 'Dex': '-'}").unwrap();
        assert_eq!(parsed, map(&[("Str", "12"), ("Dex", "-")]));
        assert_eq!(parsed.get("str").and_then(|v| v.as_scalar()), Some("12"));
    }

    #[test]
    fn test_literal_nested() {
        let parsed = LiteralParser
            .parse("[{'name': 'Phy', 'amount': 110}, {'name': 'Mag', 'amount': 0}, ]")
            .unwrap();
        let items = parsed.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("amount").and_then(|v| v.as_scalar()), Some("110"));
    }

    #[test]
    fn test_literal_strings_and_escapes() {
        let parsed = LiteralParser
            .parse(r#"["Godrick's Great Rune", 'it\'s', '', None, True, (1, 2.5)]"#)
            .unwrap();
        assert_eq!(parsed.scalars(), vec!["Godrick's Great Rune", "it's", "True", "1", "2.5"]);
    }

    #[test]
    fn test_literal_rejects_garbage() {
        assert!(LiteralParser.parse("{'Str': '12'").is_none());
        assert!(LiteralParser.parse("[1, 2] extra").is_none());
    }

    #[test]
    fn test_json_fallback() {
        let parsed = JsonParser.parse(r#"{"drops": ["Runes", null], "ok": true}"#).unwrap();
        assert_eq!(parsed.get("ok").and_then(|v| v.as_scalar()), Some("true"));
        assert_eq!(parsed.scalars(), vec!["Runes", "true"]);
    }

    #[test]
    fn test_scan_recovers_truncated_dict() {
        let parsed = KeyValueScanParser.parse("{'Str': '12', 'Dex': 14, 'Int'").unwrap();
        assert_eq!(parsed, map(&[("Str", "12"), ("Dex", "14")]));
    }

    #[test]
    fn test_chain_reading() {
        let chain = ParserChain::default();
        assert_eq!(chain.read(None), Ok(Cell::Absent));
        assert_eq!(chain.read(Some("   ")), Ok(Cell::Absent));
        assert_eq!(chain.read(Some("Limgrave")), Ok(Cell::Unstructured("Limgrave")));
        assert!(matches!(chain.read(Some("['a', 'b']")), Ok(Cell::Structured(_))));
        assert!(matches!(chain.read(Some("{'a': 'b'")), Ok(Cell::Structured(_))));
        assert_eq!(chain.read(Some("{broken")), Err(UnparseableCell));
        assert_eq!(chain.parser_names(), vec!["literal", "json", "key-value scan"]);
    }

    #[test]
    fn test_empty_chain_rejects_structured() {
        let chain = ParserChain::new();
        assert_eq!(chain.read(Some("[1]")), Err(UnparseableCell));
    }
}
