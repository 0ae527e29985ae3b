//! Set difference between two graphs
//!
//! `diff(minuend, subtrahend, output)` adds to `output` every statement of
//! the minuend that the subtrahend does not hold. Diffing a harvest against
//! the previous one in both directions yields the statements to add and the
//! statements to retract.
//!
//! Blank nodes compare by their backend-local identifiers. Every parse mints
//! fresh blank nodes, so two graphs loaded separately from the same document
//! never agree on them and their blank-node statements always differ.

use crate::error::StoreResult;
use crate::rdf::{RdfFormat, RdfSerializer, Triple};
use crate::store::GraphStore;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Diff options
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    subject_namespace: Option<String>,
    dump_file: Option<PathBuf>,
    dump_format: RdfFormat,
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only emit statements whose subject IRI starts with `namespace`
    pub fn with_subject_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.subject_namespace = Some(namespace.into());
        self
    }

    /// Also write the difference to `path`
    pub fn with_dump_file(mut self, path: impl AsRef<Path>, format: RdfFormat) -> Self {
        self.dump_file = Some(path.as_ref().to_path_buf());
        self.dump_format = format;
        self
    }

    fn keeps(&self, triple: &Triple) -> bool {
        match &self.subject_namespace {
            Some(ns) => triple.subject.iri().is_some_and(|iri| iri.starts_with(ns.as_str())),
            None => true,
        }
    }
}

/// What a diff did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Statements of the minuend examined
    pub compared: usize,
    /// Statements written to the output
    pub emitted: usize,
}

/// Add `minuend − subtrahend` to `output`.
///
/// The output is not cleared first; truncate it beforehand for a pure
/// difference.
pub fn diff(
    minuend: &GraphStore,
    subtrahend: &GraphStore,
    output: &mut GraphStore,
    options: &DiffOptions,
) -> StoreResult<DiffSummary> {
    let existing: HashSet<Triple> = subtrahend.statements()?.into_iter().collect();
    let candidates = minuend.statements()?;
    let compared = candidates.len();

    let delta: Vec<Triple> = candidates
        .into_iter()
        .filter(|t| !existing.contains(t) && options.keeps(t))
        .collect();
    output.insert_statements(&delta)?;

    if let Some(path) = &options.dump_file {
        let file = File::create(path)?;
        RdfSerializer::serialize(&delta, BufWriter::new(file), options.dump_format)?;
        debug!("wrote difference to {}", path.display());
    }

    info!(
        "'{}' minus '{}': {} of {} statements into '{}'",
        minuend.model_name(),
        subtrahend.model_name(),
        delta.len(),
        compared,
        output.model_name()
    );
    Ok(DiffSummary {
        compared,
        emitted: delta.len(),
    })
}
