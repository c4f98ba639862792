//! Property values: typed literals, references to other entities and links
//! to resources outside the graph.

use serde::{Deserialize, Serialize};

use super::Identifier;

/// Literal datatypes understood by the graph and its persisted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Datatype {
    String,
    Integer,
    Float,
}

impl Datatype {
    /// Local name under the XML Schema namespace.
    pub fn xsd_name(&self) -> &'static str {
        match self {
            Datatype::String => "string",
            Datatype::Integer => "integer",
            Datatype::Float => "float",
        }
    }

    pub fn from_xsd_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Datatype::String),
            "integer" => Some(Datatype::Integer),
            "float" => Some(Datatype::Float),
            _ => None,
        }
    }
}

/// A literal keeps its lexical form so that values compare and hash exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub datatype: Datatype,
    pub raw: String,
}

impl Literal {
    pub fn new(datatype: Datatype, raw: impl Into<String>) -> Self {
        Self {
            datatype,
            raw: raw.into(),
        }
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::new(Datatype::String, text)
    }

    pub fn integer(value: i64) -> Self {
        Self::new(Datatype::Integer, value.to_string())
    }

    pub fn float(value: f64) -> Self {
        Self::new(Datatype::Float, value.to_string())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.datatype {
            Datatype::Integer => self.raw.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.datatype {
            Datatype::Integer | Datatype::Float => self.raw.parse().ok(),
            Datatype::String => None,
        }
    }
}

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    Literal(Literal),
    Reference(Identifier),
    /// Absolute IRI of a resource in another dataset.
    External(String),
}

impl Value {
    pub fn reference(id: Identifier) -> Self {
        Value::Reference(id)
    }

    pub fn external(iri: impl Into<String>) -> Self {
        Value::External(iri.into())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Value::Literal(Literal::string(text))
    }

    pub fn integer(value: i64) -> Self {
        Value::Literal(Literal::integer(value))
    }

    pub fn float(value: f64) -> Self {
        Value::Literal(Literal::float(value))
    }

    pub fn as_reference(&self) -> Option<&Identifier> {
        match self {
            Value::Reference(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Value::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn as_external(&self) -> Option<&str> {
        match self {
            Value::External(iri) => Some(iri),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_constructors() {
        assert_eq!(Literal::integer(12).raw, "12");
        assert_eq!(Literal::integer(12).as_i64(), Some(12));
        assert_eq!(Literal::float(0.5).as_f64(), Some(0.5));
        assert_eq!(Literal::string("D").as_i64(), None);
    }

    #[test]
    fn test_datatype_xsd_names() {
        for dt in [Datatype::String, Datatype::Integer, Datatype::Float] {
            assert_eq!(Datatype::from_xsd_name(dt.xsd_name()), Some(dt));
        }
        assert_eq!(Datatype::from_xsd_name("boolean"), None);
    }

    #[test]
    fn test_value_accessors() {
        let id = Identifier::from_name("Limgrave");
        let reference = Value::reference(id.clone());
        assert_eq!(reference.as_reference(), Some(&id));
        assert!(reference.as_literal().is_none());
        assert!(Value::string("text").as_reference().is_none());

        let link = Value::external("http://www.wikidata.org/entity/Q111174615");
        assert_eq!(link.as_external(), Some("http://www.wikidata.org/entity/Q111174615"));
        assert!(link.as_reference().is_none());
        assert!(link.as_literal().is_none());
    }
}
