//! Storage backends behind a graph store

use super::memory::MemoryBackend;
use super::params::{BackendKind, ConnectionParams};
use super::quad::QuadBackend;
use super::relational::RelationalBackend;
use super::Dataset;
use crate::error::StoreResult;
use crate::rdf::{NamedNode, Triple};

/// Operations every backend provides for its named graph
pub(crate) trait BackendAdapter {
    /// Add statements, returning how many were not already present
    fn insert(&mut self, triples: &[Triple]) -> StoreResult<usize>;

    /// Remove statements, returning how many were present
    fn remove(&mut self, triples: &[Triple]) -> StoreResult<usize>;

    fn contains(&self, triple: &Triple) -> StoreResult<bool>;

    /// True if any statement has `subject` as its subject
    fn contains_subject(&self, subject: &NamedNode) -> StoreResult<bool>;

    fn statements(&self) -> StoreResult<Vec<Triple>>;

    fn len(&self) -> StoreResult<usize>;

    /// Remove every statement of this graph
    fn truncate(&mut self) -> StoreResult<()>;

    /// Every graph reachable through the same connection
    fn dataset(&self) -> StoreResult<Dataset>;

    fn begin(&mut self) -> StoreResult<()>;

    fn commit(&mut self) -> StoreResult<()>;
}

/// The closed set of backends
pub(crate) enum Backend {
    Memory(MemoryBackend),
    Relational(RelationalBackend),
    QuadStore(QuadBackend),
}

impl Backend {
    /// Establish the backend named by `params`
    pub(crate) fn open(params: &ConnectionParams) -> StoreResult<Self> {
        Ok(match params.backend() {
            BackendKind::Memory => Backend::Memory(MemoryBackend::new(params.model_name())),
            BackendKind::Relational => Backend::Relational(RelationalBackend::open(params)?),
            BackendKind::QuadStore => Backend::QuadStore(QuadBackend::open(params)?),
        })
    }

    pub(crate) fn adapter(&self) -> &dyn BackendAdapter {
        match self {
            Backend::Memory(b) => b,
            Backend::Relational(b) => b,
            Backend::QuadStore(b) => b,
        }
    }

    pub(crate) fn adapter_mut(&mut self) -> &mut dyn BackendAdapter {
        match self {
            Backend::Memory(b) => b,
            Backend::Relational(b) => b,
            Backend::QuadStore(b) => b,
        }
    }

    /// Release the underlying connection
    pub(crate) fn close(self) -> StoreResult<()> {
        match self {
            Backend::Memory(_) => Ok(()),
            Backend::Relational(b) => b.close(),
            Backend::QuadStore(b) => b.close(),
        }
    }
}
