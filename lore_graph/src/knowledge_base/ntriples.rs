//! N-Triples persistence for the graph store.
//!
//! One statement per line, absolute IRIs, typed literals. Entities live
//! under [`ENTITY_NS`], classes and lore predicates under [`VOCAB_NS`];
//! `type`, `label` and `description` use the RDF/RDFS terms and `sameAs`
//! the OWL one. Object IRIs outside both namespaces are external links.
//! Reading a written document back yields a set-equal store.

use lore_model::{vocab, Datatype, Identifier, Literal, Value};
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while1},
    character::complete::{char, none_of, space0, space1},
    combinator::{all_consuming, map, opt, value},
    error::{convert_error, ParseError as NomParseError, VerboseError},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use super::{GraphStore, Triple};
use crate::error::{ParseError, PersistenceError};

pub const VOCAB_NS: &str = "http://www.semanticweb.org/fall2025/eldenring/";
pub const ENTITY_NS: &str = "http://www.semanticweb.org/fall2025/eldenring/id/";

const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
const RDFS_COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
const OWL_SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

// ============================================================================
// Writing
// ============================================================================

/// Serialize every triple of the store, one statement per line.
pub fn to_ntriples(store: &GraphStore) -> String {
    let mut out = String::with_capacity(store.len() * 96);
    for (subject, predicate, object) in store.statements() {
        statement(&mut out, subject, predicate, object);
    }
    out
}

/// Stream the serialized store into a writer.
pub fn write_ntriples<W: Write>(store: &GraphStore, mut writer: W) -> io::Result<()> {
    let mut line = String::new();
    for (subject, predicate, object) in store.statements() {
        line.clear();
        statement(&mut line, subject, predicate, object);
        writer.write_all(line.as_bytes())?;
    }
    writer.flush()
}

pub fn save(store: &GraphStore, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
    let file = fs::File::create(path)?;
    write_ntriples(store, io::BufWriter::new(file))?;
    Ok(())
}

fn statement(out: &mut String, subject: &Identifier, predicate: &str, object: &Value) {
    out.push('<');
    out.push_str(ENTITY_NS);
    out.push_str(subject.as_str());
    out.push_str("> <");
    out.push_str(&predicate_iri(predicate));
    out.push_str("> ");
    match object {
        Value::Reference(target) => {
            let ns = if predicate == vocab::TYPE { VOCAB_NS } else { ENTITY_NS };
            out.push('<');
            out.push_str(ns);
            out.push_str(target.as_str());
            out.push('>');
        }
        Value::Literal(literal) => {
            out.push('"');
            escape_into(out, &literal.raw);
            out.push_str("\"^^<");
            out.push_str(XSD_NS);
            out.push_str(literal.datatype.xsd_name());
            out.push('>');
        }
        Value::External(iri) => {
            out.push('<');
            out.push_str(iri);
            out.push('>');
        }
    }
    out.push_str(" .\n");
}

fn predicate_iri(predicate: &str) -> String {
    match predicate {
        vocab::TYPE => RDF_TYPE.to_string(),
        vocab::LABEL => RDFS_LABEL.to_string(),
        vocab::DESCRIPTION => RDFS_COMMENT.to_string(),
        vocab::SAME_AS => OWL_SAME_AS.to_string(),
        other => format!("{VOCAB_NS}{other}"),
    }
}

fn escape_into(out: &mut String, raw: &str) {
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
}

// ============================================================================
// Reading
// ============================================================================

/// Rebuild a store from serialized statements.
///
/// Blank lines and `#` comments are skipped. The first malformed line stops
/// the parse.
pub fn parse_ntriples(text: &str) -> Result<GraphStore, ParseError> {
    let mut store = GraphStore::new();
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        store.insert(parse_line(trimmed, index + 1)?);
    }
    Ok(store)
}

pub fn load(path: impl AsRef<Path>) -> Result<GraphStore, PersistenceError> {
    let text = fs::read_to_string(path)?;
    Ok(parse_ntriples(&text)?)
}

enum Term<'a> {
    Iri(&'a str),
    Literal(String, Option<&'a str>),
}

fn parse_line(line: &str, number: usize) -> Result<Triple, ParseError> {
    let (_, (subject, predicate, object)) =
        all_consuming(statement_parser::<VerboseError<&str>>)(line).map_err(|e| match e {
            nom::Err::Error(e) | nom::Err::Failure(e) => ParseError {
                line: number,
                reason: convert_error(line, e).trim().to_string(),
            },
            nom::Err::Incomplete(_) => ParseError {
                line: number,
                reason: "incomplete statement".to_string(),
            },
        })?;

    let fail = |reason: String| ParseError {
        line: number,
        reason,
    };

    let subject = subject
        .strip_prefix(ENTITY_NS)
        .ok_or_else(|| fail(format!("subject <{subject}> is outside the entity namespace")))?;
    let predicate = predicate_name(predicate)
        .ok_or_else(|| fail(format!("predicate <{predicate}> is outside the vocabulary")))?;

    let object = match object {
        Term::Iri(iri) => match iri.strip_prefix(ENTITY_NS).or_else(|| iri.strip_prefix(VOCAB_NS)) {
            Some("") => return Err(fail(format!("object <{iri}> names no entity"))),
            Some(id) => Value::Reference(Identifier::from_raw(id)),
            None => Value::External(iri.to_string()),
        },
        Term::Literal(raw, datatype) => {
            let datatype = match datatype {
                None => Datatype::String,
                Some(iri) => iri
                    .strip_prefix(XSD_NS)
                    .and_then(Datatype::from_xsd_name)
                    .ok_or_else(|| fail(format!("unsupported datatype <{iri}>")))?,
            };
            Value::Literal(Literal::new(datatype, raw))
        }
    };

    Ok(Triple::new(Identifier::from_raw(subject), predicate, object))
}

fn predicate_name(iri: &str) -> Option<String> {
    match iri {
        RDF_TYPE => Some(vocab::TYPE.to_string()),
        RDFS_LABEL => Some(vocab::LABEL.to_string()),
        RDFS_COMMENT => Some(vocab::DESCRIPTION.to_string()),
        OWL_SAME_AS => Some(vocab::SAME_AS.to_string()),
        other => other
            .strip_prefix(VOCAB_NS)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
    }
}

fn statement_parser<'a, E: NomParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, (&'a str, &'a str, Term<'a>), E> {
    terminated(
        tuple((iri_ref, preceded(space1, iri_ref), preceded(space1, term))),
        pair(preceded(space0, char('.')), space0),
    )(input)
}

fn term<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, Term<'a>, E> {
    alt((
        map(iri_ref, Term::Iri),
        map(pair(quoted, opt(preceded(tag("^^"), iri_ref))), |(raw, dt)| {
            Term::Literal(raw, dt)
        }),
    ))(input)
}

fn iri_ref<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    delimited(
        char('<'),
        take_while1(|c: char| c != '>' && !c.is_whitespace()),
        char('>'),
    )(input)
}

fn quoted<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, String, E> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                none_of("\"\\"),
                '\\',
                alt((
                    value('\\', char('\\')),
                    value('"', char('"')),
                    value('\n', char('n')),
                    value('\r', char('r')),
                    value('\t', char('t')),
                )),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Identifier {
        Identifier::from_name(name)
    }

    fn sample_store() -> GraphStore {
        let moonveil = id("Moonveil");
        let shadow = Identifier::shadow(&moonveil, "Standard");
        [
            Triple::type_assertion(moonveil.clone(), "Katana"),
            Triple::label(moonveil.clone(), "Moonveil"),
            Triple::new(
                moonveil.clone(),
                "description",
                Value::string("Katana forged by \"Gelmir\"\nwith a glintstone blade\\edge"),
            ),
            Triple::new(moonveil.clone(), "requiresIntelligence", Value::integer(23)),
            Triple::new(moonveil.clone(), "weight", Value::float(6.5)),
            Triple::new(moonveil.clone(), "scalingDexterity", Value::string("")),
            Triple::reference(moonveil.clone(), "hasMaxStats", shadow.clone()),
            Triple::type_assertion(shadow.clone(), "StatBlock"),
            Triple::new(shadow, "upgradeLevel", Value::integer(10)),
            Triple::new(moonveil.clone(), "sameAs", Value::external("http://www.wikidata.org/entity/Q1")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_round_trip_is_set_equal() {
        let store = sample_store();
        let text = to_ntriples(&store);
        let parsed = parse_ntriples(&text).unwrap();
        assert_eq!(parsed, store);
    }

    #[test]
    fn test_line_shape() {
        let text = to_ntriples(&sample_store());
        assert_eq!(text.lines().count(), 10);
        for line in text.lines() {
            assert!(line.starts_with('<'), "{line}");
            assert!(line.ends_with(" ."), "{line}");
        }
        assert!(text.contains(&format!("<{ENTITY_NS}Moonveil> <{RDF_TYPE}> <{VOCAB_NS}Katana> .")));
        assert!(text.contains(&format!(
            "<{ENTITY_NS}Moonveil> <{VOCAB_NS}requiresIntelligence> \"23\"^^<{XSD_NS}integer> ."
        )));
        assert!(text.contains(&format!(
            "<{ENTITY_NS}Moonveil> <{OWL_SAME_AS}> <http://www.wikidata.org/entity/Q1> ."
        )));
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let text = format!(
            "# header\n\n<{ENTITY_NS}Margit> <{RDFS_LABEL}> \"Margit\" .\n"
        );
        let store = parse_ntriples(&text).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.label(&id("Margit")), Some("Margit"));
    }

    #[test]
    fn test_malformed_line_reports_number() {
        let text = format!(
            "<{ENTITY_NS}Margit> <{RDFS_LABEL}> \"Margit\" .\n<{ENTITY_NS}Margit> oops\n"
        );
        let err = parse_ntriples(&text).unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_rejects_foreign_namespace() {
        let text = format!("<http://example.org/x> <{RDFS_LABEL}> \"x\" .");
        let err = parse_ntriples(&text).unwrap_err();
        assert!(err.reason.contains("entity namespace"));
    }

    #[test]
    fn test_file_round_trip() {
        let store = sample_store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.nt");

        save(&store, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, store);
    }
}
