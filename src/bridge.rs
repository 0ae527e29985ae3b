//! Bulk transfer between keyed records and a graph store
//!
//! Each record carries a serialized RDF fragment. A record that does not
//! parse is logged and skipped; the rest of the batch still goes through.

use crate::error::{StoreError, StoreResult};
use crate::rdf::{RdfFormat, RdfParser};
use crate::store::GraphStore;
use tracing::{debug, warn};

/// A named text blob holding an RDF fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub payload: String,
}

impl Record {
    pub fn new(id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
        }
    }
}

/// Outcome of a bulk transfer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeReport {
    /// Records applied
    pub processed: usize,
    /// Records skipped because they did not parse
    pub failed: usize,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Import,
    Remove,
}

/// Moves record fragments into or out of a graph store
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordBridge {
    format: RdfFormat,
}

impl RecordBridge {
    /// Bridge for fragments in the given serialization
    pub fn new(format: RdfFormat) -> Self {
        Self { format }
    }

    /// Add every record's statements to `store`
    pub fn import_all(
        &self,
        store: &mut GraphStore,
        records: impl IntoIterator<Item = Record>,
        base_iri: Option<&str>,
    ) -> StoreResult<BridgeReport> {
        self.transfer(store, records, base_iri, Direction::Import)
    }

    /// Remove every record's statements from `store`
    pub fn remove_all(
        &self,
        store: &mut GraphStore,
        records: impl IntoIterator<Item = Record>,
        base_iri: Option<&str>,
    ) -> StoreResult<BridgeReport> {
        self.transfer(store, records, base_iri, Direction::Remove)
    }

    fn transfer(
        &self,
        store: &mut GraphStore,
        records: impl IntoIterator<Item = Record>,
        base_iri: Option<&str>,
        direction: Direction,
    ) -> StoreResult<BridgeReport> {
        if store.is_closed() {
            return Err(StoreError::Closed(store.model_name().to_string()));
        }

        let mut report = BridgeReport::default();
        for record in records {
            let triples = match RdfParser::parse_str(&record.payload, base_iri, self.format) {
                Ok(triples) => triples,
                Err(e) => {
                    warn!("skipping record '{}': {}", record.id, e);
                    report.failed += 1;
                    continue;
                }
            };
            let changed = match direction {
                Direction::Import => store.insert_statements(&triples)?,
                Direction::Remove => store.remove_statements(&triples)?,
            };
            debug!("record '{}': {} statements changed", record.id, changed);
            report.processed += 1;
        }

        debug!(
            "{:?} into '{}': {} processed, {} failed",
            direction,
            store.model_name(),
            report.processed,
            report.failed
        );
        Ok(report)
    }
}
