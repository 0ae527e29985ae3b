//! RDF serialization formats
//!
//! Supports:
//! - RDF/XML (default)
//! - N-Triples
//! - Turtle
//! - N3 (read with the Turtle grammar, written as Turtle)

mod rio;

use super::types::{TermError, Triple};
use std::io::{self, Read, Write};
use thiserror::Error;

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RdfFormat {
    /// RDF/XML format (.rdf)
    #[default]
    RdfXml,
    /// N-Triples format (.nt)
    NTriples,
    /// Turtle format (.ttl)
    Turtle,
    /// Notation3 (.n3)
    N3,
}

impl RdfFormat {
    /// Resolve a serialization language name.
    ///
    /// `None` means the default language, RDF/XML. Names are matched
    /// case-insensitively; `RDF/XML-ABBREV` is a synonym for `RDF/XML`.
    pub fn from_name(name: Option<&str>) -> Result<Self, UnsupportedFormat> {
        let Some(name) = name else {
            return Ok(RdfFormat::RdfXml);
        };
        match name.trim().to_ascii_uppercase().as_str() {
            "RDF/XML" | "RDF/XML-ABBREV" | "XML" => Ok(RdfFormat::RdfXml),
            "N-TRIPLE" | "N-TRIPLES" | "NTRIPLES" | "NT" => Ok(RdfFormat::NTriples),
            "TURTLE" | "TTL" => Ok(RdfFormat::Turtle),
            "N3" => Ok(RdfFormat::N3),
            _ => Err(UnsupportedFormat(name.to_string())),
        }
    }

    /// Canonical language name
    pub fn name(&self) -> &'static str {
        match self {
            RdfFormat::RdfXml => "RDF/XML",
            RdfFormat::NTriples => "N-TRIPLE",
            RdfFormat::Turtle => "TURTLE",
            RdfFormat::N3 => "N3",
        }
    }
}

/// A serialization language name no reader or writer exists for
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported RDF format: {0}")]
pub struct UnsupportedFormat(pub String);

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Turtle / N-Triples syntax error
    #[error("Turtle parse error: {0}")]
    Turtle(#[from] rio_turtle::TurtleError),

    /// RDF/XML syntax error
    #[error("RDF/XML parse error: {0}")]
    RdfXml(#[from] rio_xml::RdfXmlError),

    /// A parsed term could not be represented
    #[error("Invalid term: {0}")]
    Term(#[from] TermError),

    /// The namespace base is not an absolute IRI
    #[error("Invalid base IRI {iri}: {reason}")]
    InvalidBase {
        /// The rejected base
        iri: String,
        /// Why it was rejected
        reason: String,
    },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Output was not valid UTF-8
    #[error("Serialization error: {0}")]
    Serialize(String),
}

pub type SerializeResult<T> = Result<T, SerializeError>;

/// RDF parser
pub struct RdfParser;

impl RdfParser {
    /// Parse RDF data from a reader.
    ///
    /// `base_iri` resolves relative IRIs in formats that have them.
    pub fn parse(
        reader: impl Read,
        base_iri: Option<&str>,
        format: RdfFormat,
    ) -> ParseResult<Vec<Triple>> {
        let reader = io::BufReader::new(reader);
        match format {
            RdfFormat::RdfXml => rio::parse_rdf_xml(reader, base_iri),
            RdfFormat::Turtle | RdfFormat::N3 => rio::parse_turtle(reader, base_iri),
            RdfFormat::NTriples => rio::parse_ntriples(reader),
        }
    }

    /// Parse RDF data from a string
    pub fn parse_str(
        input: &str,
        base_iri: Option<&str>,
        format: RdfFormat,
    ) -> ParseResult<Vec<Triple>> {
        Self::parse(input.as_bytes(), base_iri, format)
    }
}

/// RDF serializer
pub struct RdfSerializer;

impl RdfSerializer {
    /// Serialize triples to a writer, returning the writer once the
    /// document is complete and flushed.
    pub fn serialize<'a, W: Write>(
        triples: impl IntoIterator<Item = &'a Triple>,
        writer: W,
        format: RdfFormat,
    ) -> SerializeResult<W> {
        let mut writer = match format {
            RdfFormat::RdfXml => rio::write_rdf_xml(triples, writer)?,
            RdfFormat::Turtle | RdfFormat::N3 => rio::write_turtle(triples, writer)?,
            RdfFormat::NTriples => rio::write_ntriples(triples, writer)?,
        };
        writer.flush()?;
        Ok(writer)
    }

    /// Serialize triples to a string
    pub fn serialize_to_string<'a>(
        triples: impl IntoIterator<Item = &'a Triple>,
        format: RdfFormat,
    ) -> SerializeResult<String> {
        let output = Self::serialize(triples, Vec::new(), format)?;
        String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
    }
}
