//! Every named graph reachable through one connection

use crate::rdf::Triple;
use std::collections::BTreeMap;

/// Named graphs keyed by model name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    graphs: BTreeMap<String, Vec<Triple>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a statement to the named graph, creating the graph if needed
    pub fn insert(&mut self, graph: &str, triple: Triple) {
        self.graphs.entry(graph.to_string()).or_default().push(triple);
    }

    /// Add a graph's statements wholesale
    pub fn insert_graph(&mut self, graph: &str, triples: Vec<Triple>) {
        self.graphs.entry(graph.to_string()).or_default().extend(triples);
    }

    /// Graph names in sorted order
    pub fn graph_names(&self) -> impl Iterator<Item = &str> {
        self.graphs.keys().map(String::as_str)
    }

    /// Statements of one graph
    pub fn graph(&self, name: &str) -> Option<&[Triple]> {
        self.graphs.get(name).map(Vec::as_slice)
    }

    /// Number of graphs
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Statements across all graphs
    pub fn statement_count(&self) -> usize {
        self.graphs.values().map(Vec::len).sum()
    }
}
