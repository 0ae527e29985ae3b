//! RDF statement model and serialization
//!
//! - Statements (subject-predicate-object) with structural equality
//! - RDF/XML, N-Triples, Turtle and N3 readers and writers
//!
//! # Example
//!
//! ```rust
//! use rdfsync::rdf::{Literal, NamedNode, RdfFormat, RdfPredicate, RdfSerializer, Triple};
//!
//! let subject = NamedNode::new("http://example.org/alice").unwrap();
//! let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let object = Literal::new_simple_literal("Alice");
//!
//! let triple = Triple::new(subject.into(), predicate, object.into());
//! let nt = RdfSerializer::serialize_to_string([&triple], RdfFormat::NTriples).unwrap();
//! assert!(nt.contains("\"Alice\""));
//! ```

mod types;
mod serialization;

pub use types::{
    BlankNode, Literal, NamedNode, RdfObject, RdfPredicate, RdfSubject, TermError, TermResult,
    Triple,
};

pub use serialization::{
    ParseError, ParseResult, RdfFormat, RdfParser, RdfSerializer, SerializeError,
    SerializeResult, UnsupportedFormat,
};
