//! Bridges between the rio parsers/formatters and the statement model

use super::{ParseError, ParseResult};
use crate::rdf::{BlankNode, Literal, NamedNode, RdfObject, RdfPredicate, RdfSubject, Triple};
use oxiri::Iri;
use oxrdf::vocab::xsd;
use rio_api::formatter::TriplesFormatter;
use rio_api::model as rio;
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesFormatter, NTriplesParser, TurtleFormatter, TurtleParser};
use rio_xml::{RdfXmlFormatter, RdfXmlParser};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};

/// Document blank-node labels mapped to fresh nodes for one parse
type BlankScope = HashMap<String, BlankNode>;

pub(super) fn parse_turtle(reader: impl BufRead, base_iri: Option<&str>) -> ParseResult<Vec<Triple>> {
    collect(TurtleParser::new(reader, resolve_base(base_iri)?))
}

pub(super) fn parse_ntriples(reader: impl BufRead) -> ParseResult<Vec<Triple>> {
    collect(NTriplesParser::new(reader))
}

pub(super) fn parse_rdf_xml(reader: impl BufRead, base_iri: Option<&str>) -> ParseResult<Vec<Triple>> {
    collect(RdfXmlParser::new(reader, resolve_base(base_iri)?))
}

fn resolve_base(base_iri: Option<&str>) -> ParseResult<Option<Iri<String>>> {
    base_iri
        .map(|iri| {
            Iri::parse(iri.to_string()).map_err(|e| ParseError::InvalidBase {
                iri: iri.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// Every parse mints its own blank nodes: a label is stable within one
/// document and never shared with another.
fn collect<P>(mut parser: P) -> ParseResult<Vec<Triple>>
where
    P: TriplesParser,
    ParseError: From<P::Error>,
{
    let mut triples = Vec::new();
    let mut blanks = BlankScope::new();
    parser.parse_all(&mut |t| -> ParseResult<()> {
        triples.push(Triple::new(
            convert_subject(t.subject, &mut blanks)?,
            convert_predicate(t.predicate)?,
            convert_object(t.object, &mut blanks)?,
        ));
        Ok(())
    })?;
    Ok(triples)
}

fn fresh_blank(label: &str, blanks: &mut BlankScope) -> BlankNode {
    blanks.entry(label.to_string()).or_default().clone()
}

pub(super) fn write_turtle<'a, W: Write>(
    triples: impl IntoIterator<Item = &'a Triple>,
    writer: W,
) -> io::Result<W> {
    let mut formatter = TurtleFormatter::new(writer);
    format_all(&mut formatter, triples)?;
    formatter.finish()
}

pub(super) fn write_ntriples<'a, W: Write>(
    triples: impl IntoIterator<Item = &'a Triple>,
    writer: W,
) -> io::Result<W> {
    let mut formatter = NTriplesFormatter::new(writer);
    format_all(&mut formatter, triples)?;
    formatter.finish()
}

/// RDF/XML with every IRI written out in full
pub(super) fn write_rdf_xml<'a, W: Write>(
    triples: impl IntoIterator<Item = &'a Triple>,
    writer: W,
) -> io::Result<W> {
    let mut formatter = RdfXmlFormatter::new(writer)?;
    format_all(&mut formatter, triples)?;
    formatter.finish()
}

fn format_all<'a, F>(formatter: &mut F, triples: impl IntoIterator<Item = &'a Triple>) -> io::Result<()>
where
    F: TriplesFormatter<Error = io::Error>,
{
    for triple in triples {
        formatter.format(&rio::Triple {
            subject: rio_subject(&triple.subject),
            predicate: rio::NamedNode {
                iri: triple.predicate.as_str(),
            },
            object: rio_object(&triple.object),
        })?;
    }
    Ok(())
}

fn rio_subject(subject: &RdfSubject) -> rio::Subject<'_> {
    match subject {
        RdfSubject::NamedNode(n) => rio::Subject::NamedNode(rio::NamedNode { iri: n.as_str() }),
        RdfSubject::BlankNode(b) => rio::Subject::BlankNode(rio::BlankNode { id: b.as_str() }),
    }
}

fn rio_object(object: &RdfObject) -> rio::Term<'_> {
    match object {
        RdfObject::NamedNode(n) => rio::Term::NamedNode(rio::NamedNode { iri: n.as_str() }),
        RdfObject::BlankNode(b) => rio::Term::BlankNode(rio::BlankNode { id: b.as_str() }),
        RdfObject::Literal(l) => {
            let literal = l.inner();
            let value = literal.value();
            rio::Term::Literal(if let Some(language) = literal.language() {
                rio::Literal::LanguageTaggedString { value, language }
            } else if literal.datatype() == xsd::STRING {
                rio::Literal::Simple { value }
            } else {
                rio::Literal::Typed {
                    value,
                    datatype: rio::NamedNode {
                        iri: literal.datatype().as_str(),
                    },
                }
            })
        }
    }
}

fn convert_subject(s: rio::Subject<'_>, blanks: &mut BlankScope) -> ParseResult<RdfSubject> {
    match s {
        rio::Subject::NamedNode(n) => Ok(RdfSubject::NamedNode(NamedNode::new(n.iri)?)),
        rio::Subject::BlankNode(b) => Ok(RdfSubject::BlankNode(fresh_blank(b.id, blanks))),
        #[allow(unreachable_patterns)]
        other => Err(crate::rdf::TermError::Unsupported(other.to_string()).into()),
    }
}

fn convert_predicate(p: rio::NamedNode<'_>) -> ParseResult<RdfPredicate> {
    Ok(RdfPredicate::new(p.iri)?)
}

fn convert_object(o: rio::Term<'_>, blanks: &mut BlankScope) -> ParseResult<RdfObject> {
    match o {
        rio::Term::NamedNode(n) => Ok(RdfObject::NamedNode(NamedNode::new(n.iri)?)),
        rio::Term::BlankNode(b) => Ok(RdfObject::BlankNode(fresh_blank(b.id, blanks))),
        rio::Term::Literal(rio::Literal::Simple { value }) => {
            Ok(RdfObject::Literal(Literal::new_simple_literal(value)))
        }
        rio::Term::Literal(rio::Literal::LanguageTaggedString { value, language }) => Ok(
            RdfObject::Literal(Literal::new_language_tagged_literal(value, language)?),
        ),
        rio::Term::Literal(rio::Literal::Typed { value, datatype }) => Ok(RdfObject::Literal(
            Literal::new_typed_literal(value, NamedNode::new(datatype.iri)?),
        )),
        #[allow(unreachable_patterns)]
        other => Err(crate::rdf::TermError::Unsupported(other.to_string()).into()),
    }
}
