//! The uniform graph store handle

use super::backend::Backend;
use super::events::{GraphEvent, GraphEventListener};
use super::params::{BackendKind, ConnectionParams};
use super::Dataset;
use crate::error::{StoreError, StoreResult};
use crate::rdf::{NamedNode, RdfFormat, RdfParser, RdfSerializer, Triple};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// A named graph on one of the backends
///
/// Every operation fails with [`StoreError::Closed`] once [`close`](Self::close)
/// has been called.
pub struct GraphStore {
    params: ConnectionParams,
    backend: Option<Backend>,
    listeners: Vec<Box<dyn GraphEventListener>>,
}

impl GraphStore {
    /// Connect to the backend described by `params`
    pub fn open(params: ConnectionParams) -> StoreResult<Self> {
        let backend = Backend::open(&params)?;
        info!(
            "opened {} graph '{}'",
            params.backend(),
            params.model_name()
        );
        Ok(Self {
            params,
            backend: Some(backend),
            listeners: Vec::new(),
        })
    }

    /// Empty in-memory graph
    pub fn memory(model_name: impl Into<String>) -> Self {
        let params = ConnectionParams::memory(model_name);
        let backend = Backend::Memory(super::memory::MemoryBackend::new(params.model_name()));
        Self {
            params,
            backend: Some(backend),
            listeners: Vec::new(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.params.model_name()
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.params.backend()
    }

    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    fn backend(&self) -> StoreResult<&Backend> {
        self.backend
            .as_ref()
            .ok_or_else(|| StoreError::Closed(self.params.model_name().to_string()))
    }

    fn backend_mut(&mut self) -> StoreResult<&mut Backend> {
        match self.backend.as_mut() {
            Some(backend) => Ok(backend),
            None => Err(StoreError::Closed(self.params.model_name().to_string())),
        }
    }

    /// Add statements, returning how many were new
    pub fn insert_statements(&mut self, triples: &[Triple]) -> StoreResult<usize> {
        self.backend_mut()?.adapter_mut().insert(triples)
    }

    /// Remove statements, returning how many were present
    pub fn remove_statements(&mut self, triples: &[Triple]) -> StoreResult<usize> {
        self.backend_mut()?.adapter_mut().remove(triples)
    }

    /// Parse a document and add its statements.
    ///
    /// The whole document is parsed before anything is added, so a
    /// malformed document leaves the graph untouched.
    pub fn load_from_reader(
        &mut self,
        reader: impl Read,
        base_iri: Option<&str>,
        format: RdfFormat,
    ) -> StoreResult<usize> {
        self.backend()?;
        let triples = RdfParser::parse(reader, base_iri, format)?;
        let added = self.insert_statements(&triples)?;
        debug!(
            "loaded {} statements ({} new) into '{}'",
            triples.len(),
            added,
            self.model_name()
        );
        Ok(added)
    }

    pub fn load_from_str(
        &mut self,
        rdf: &str,
        base_iri: Option<&str>,
        format: RdfFormat,
    ) -> StoreResult<usize> {
        self.load_from_reader(rdf.as_bytes(), base_iri, format)
    }

    pub fn load_from_file(
        &mut self,
        path: impl AsRef<Path>,
        base_iri: Option<&str>,
        format: RdfFormat,
    ) -> StoreResult<usize> {
        let file = File::open(path.as_ref())?;
        self.load_from_reader(file, base_iri, format)
    }

    /// Copy every statement of `source` into this graph
    pub fn load_from_store(&mut self, source: &GraphStore) -> StoreResult<usize> {
        let triples = source.statements()?;
        self.insert_statements(&triples)
    }

    /// Parse a document and remove its statements; absent statements are ignored.
    ///
    /// The document's blank nodes are fresh, so statements mentioning them
    /// never match anything already stored.
    pub fn remove_from_reader(
        &mut self,
        reader: impl Read,
        base_iri: Option<&str>,
        format: RdfFormat,
    ) -> StoreResult<usize> {
        self.backend()?;
        let triples = RdfParser::parse(reader, base_iri, format)?;
        self.remove_statements(&triples)
    }

    pub fn remove_from_file(
        &mut self,
        path: impl AsRef<Path>,
        base_iri: Option<&str>,
        format: RdfFormat,
    ) -> StoreResult<usize> {
        let file = File::open(path.as_ref())?;
        self.remove_from_reader(file, base_iri, format)
    }

    /// Remove every statement of `source` from this graph
    pub fn remove_from_store(&mut self, source: &GraphStore) -> StoreResult<usize> {
        let triples = source.statements()?;
        self.remove_statements(&triples)
    }

    /// Write the whole graph as RDF/XML and flush the sink
    pub fn export_to(&self, sink: impl Write) -> StoreResult<()> {
        self.export_as(sink, RdfFormat::RdfXml)
    }

    /// Write the whole graph in the given language and flush the sink
    pub fn export_as(&self, sink: impl Write, format: RdfFormat) -> StoreResult<()> {
        let triples = self.statements()?;
        RdfSerializer::serialize(&triples, sink, format)?;
        Ok(())
    }

    pub fn export_to_string(&self) -> StoreResult<String> {
        let mut buffer = Vec::new();
        self.export_to(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| StoreError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    pub fn export_to_file(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let file = File::create(path.as_ref())?;
        self.export_to(BufWriter::new(file))
    }

    /// Snapshot of every statement
    pub fn statements(&self) -> StoreResult<Vec<Triple>> {
        self.backend()?.adapter().statements()
    }

    pub fn contains(&self, triple: &Triple) -> StoreResult<bool> {
        self.backend()?.adapter().contains(triple)
    }

    /// Number of statements
    pub fn size(&self) -> StoreResult<usize> {
        self.backend()?.adapter().len()
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.size()? == 0)
    }

    /// True if at least one statement has `uri` as its subject
    pub fn contains_subject_uri(&self, uri: &str) -> StoreResult<bool> {
        let subject = NamedNode::new(uri)?;
        self.backend()?.adapter().contains_subject(&subject)
    }

    /// Remove every statement of this graph; other graphs on the same
    /// connection are untouched
    pub fn truncate(&mut self) -> StoreResult<()> {
        self.backend_mut()?.adapter_mut().truncate()?;
        info!("truncated graph '{}'", self.model_name());
        Ok(())
    }

    /// Release the backend connection
    pub fn close(&mut self) -> StoreResult<()> {
        let backend = self
            .backend
            .take()
            .ok_or_else(|| StoreError::Closed(self.params.model_name().to_string()))?;
        backend.close()?;
        info!("closed graph '{}'", self.model_name());
        Ok(())
    }

    /// A new store on the same connection parameters addressing `model_name`.
    ///
    /// The neighbor opens its own connection. Memory graphs share nothing, so
    /// the neighbor of a memory graph is empty.
    pub fn clone_as_neighbor(&self, model_name: &str) -> StoreResult<GraphStore> {
        self.backend()?;
        GraphStore::open(self.params.neighbor(model_name))
    }

    /// Every named graph reachable through this store's connection
    pub fn connection_dataset(&self) -> StoreResult<Dataset> {
        self.backend()?.adapter().dataset()
    }

    /// Register a listener for bulk-modification events
    pub fn register_listener(&mut self, listener: impl GraphEventListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub(crate) fn notify(&self, event: GraphEvent) {
        for listener in &self.listeners {
            listener.on_event(self.model_name(), event);
        }
    }

    pub(crate) fn begin(&mut self) -> StoreResult<()> {
        self.backend_mut()?.adapter_mut().begin()
    }

    pub(crate) fn commit(&mut self) -> StoreResult<()> {
        self.backend_mut()?.adapter_mut().commit()
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("params", &self.params)
            .field("closed", &self.is_closed())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
