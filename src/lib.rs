//! rdfsync
//!
//! A uniform RDF graph store over interchangeable backends, with SPARQL
//! execution, statement-level diffing and bulk record transfer.
//!
//! # Components
//!
//! - [`store`]: the `GraphStore` handle over memory, relational (`rdb`) and
//!   quad-store (`sdb`) backends
//! - [`factory`]: builds stores from a flat configuration selected by `type`
//! - [`sparql`]: select / ask / construct / describe / update dispatch and
//!   result serialization
//! - [`diff`]: the set difference of two graphs
//! - [`bridge`]: bulk import and removal of keyed RDF fragments
//!
//! ## Example Usage
//!
//! ```rust
//! use rdfsync::diff::{diff, DiffOptions};
//! use rdfsync::rdf::RdfFormat;
//! use rdfsync::store::GraphStore;
//!
//! let mut previous = GraphStore::memory("previous");
//! previous
//!     .load_from_str(
//!         r#"<http://example.org/a> <http://example.org/p> "old" ."#,
//!         None,
//!         RdfFormat::NTriples,
//!     )
//!     .unwrap();
//!
//! let mut incoming = GraphStore::memory("incoming");
//! incoming
//!     .load_from_str(
//!         r#"<http://example.org/a> <http://example.org/p> "new" ."#,
//!         None,
//!         RdfFormat::NTriples,
//!     )
//!     .unwrap();
//!
//! // Statements to add
//! let mut additions = GraphStore::memory("additions");
//! diff(&incoming, &previous, &mut additions, &DiffOptions::new()).unwrap();
//! assert_eq!(additions.size().unwrap(), 1);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod config;
pub mod diff;
pub mod error;
pub mod factory;
pub mod rdf;
pub mod sparql;
pub mod store;

// Re-export main types for convenience
pub use bridge::{BridgeReport, Record, RecordBridge};
pub use config::{ConfigError, ConfigMap};
pub use diff::{DiffOptions, DiffSummary};
pub use error::{StoreError, StoreResult};
pub use factory::StoreFactory;
pub use rdf::{RdfFormat, Triple};
pub use sparql::{QueryExecutor, QueryKind, ResultFormat, SelectResults, SparqlResults};
pub use store::{BackendKind, ConnectionParams, Dataset, GraphEvent, GraphEventListener, GraphStore};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), VERSION);
        assert!(!version().is_empty());
    }
}
