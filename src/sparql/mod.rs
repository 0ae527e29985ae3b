//! SPARQL query support
//!
//! Requests are classified with the spargebra grammar and evaluated by the
//! oxigraph engine over a snapshot of the graph store.
//!
//! # Example
//!
//! ```rust
//! use rdfsync::rdf::RdfFormat;
//! use rdfsync::store::GraphStore;
//!
//! let mut store = GraphStore::memory("people");
//! store
//!     .load_from_str(
//!         r#"<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> "Alice" ."#,
//!         None,
//!         RdfFormat::NTriples,
//!     )
//!     .unwrap();
//!
//! let results = store
//!     .execute_select("SELECT ?name WHERE { ?person <http://xmlns.com/foaf/0.1/name> ?name }")
//!     .unwrap();
//! assert_eq!(results.len(), 1);
//! ```

mod executor;
mod parser;
mod results;

pub use executor::{QueryExecutor, UpdateOutcome};
pub use parser::QueryKind;
pub use results::{QuerySolution, ResultFormat, SelectResults, SparqlResults};
