//! SPARQL query executor
//!
//! Queries run against a snapshot of the graph loaded into an in-memory
//! oxigraph store. Updates run against such a snapshot too; the difference
//! between the snapshot before and after the update is then applied to the
//! backend inside a transaction.

use super::parser::QueryKind;
use super::results::{QuerySolution, ResultFormat, SelectResults, SparqlResults};
use crate::error::{StoreError, StoreResult};
use crate::rdf::{RdfFormat, RdfObject, RdfSerializer, Triple};
use crate::store::{GraphEvent, GraphStore};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use oxrdf::{GraphName, GraphNameRef, Triple as OxTriple};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use tracing::{debug, error};

const NOT_A_QUERY: &str = "Query Invalid: Not Select, Construct, Ask, or Describe";

/// Evaluates read queries against one graph store
pub struct QueryExecutor<'a> {
    store: &'a GraphStore,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Run a query of the expected kind and hand back the engine's results
    fn run(&self, query: &str, expected: &[QueryKind]) -> StoreResult<QueryResults> {
        let kind = QueryKind::detect(query)?;
        if !expected.contains(&kind) {
            return Err(StoreError::InvalidQuery(format!(
                "expected {expected:?} query, got {kind:?}"
            )));
        }
        let snapshot = snapshot(&self.store.statements()?)?;
        debug!("evaluating {:?} query on '{}'", kind, self.store.model_name());
        Ok(snapshot.query(query)?)
    }

    /// Run a SELECT query
    pub fn select(&self, query: &str) -> StoreResult<SelectResults> {
        match self.run(query, &[QueryKind::Select])? {
            QueryResults::Solutions(solutions) => {
                let variables = solutions
                    .variables()
                    .iter()
                    .map(|v| v.as_str().to_string())
                    .collect();
                let mut rows = Vec::new();
                for solution in solutions {
                    let mut row = QuerySolution::new();
                    for (variable, term) in solution?.iter() {
                        row.bind(variable.as_str(), RdfObject::try_from(term.clone())?);
                    }
                    rows.push(row);
                }
                Ok(SelectResults {
                    variables,
                    solutions: rows,
                })
            }
            _ => Err(StoreError::Evaluation("SELECT did not produce solutions".into())),
        }
    }

    /// Run an ASK query
    pub fn ask(&self, query: &str) -> StoreResult<bool> {
        match self.run(query, &[QueryKind::Ask])? {
            QueryResults::Boolean(value) => Ok(value),
            _ => Err(StoreError::Evaluation("ASK did not produce a boolean".into())),
        }
    }

    /// Run a CONSTRUCT query into a new in-memory graph
    pub fn construct(&self, query: &str) -> StoreResult<GraphStore> {
        self.graph_store(query, QueryKind::Construct)
    }

    /// Run a DESCRIBE query into a new in-memory graph
    pub fn describe(&self, query: &str) -> StoreResult<GraphStore> {
        self.graph_store(query, QueryKind::Describe)
    }

    fn graph_store(&self, query: &str, kind: QueryKind) -> StoreResult<GraphStore> {
        let triples = self.graph(query, &[kind])?;
        let mut result = GraphStore::memory(String::new());
        result.insert_statements(&triples)?;
        Ok(result)
    }

    fn graph(&self, query: &str, expected: &[QueryKind]) -> StoreResult<Vec<Triple>> {
        match self.run(query, expected)? {
            QueryResults::Graph(triples) => {
                let mut graph = Vec::new();
                for triple in triples {
                    graph.push(Triple::try_from(triple?)?);
                }
                Ok(graph)
            }
            _ => Err(StoreError::Evaluation("query did not produce a graph".into())),
        }
    }

    /// Run any read query
    pub fn evaluate(&self, query: &str) -> StoreResult<SparqlResults> {
        match QueryKind::detect(query)? {
            QueryKind::Select => Ok(SparqlResults::Bindings(self.select(query)?)),
            QueryKind::Ask => Ok(SparqlResults::Boolean(self.ask(query)?)),
            kind @ (QueryKind::Construct | QueryKind::Describe) => {
                Ok(SparqlResults::Graph(self.graph(query, &[kind])?))
            }
            QueryKind::Update => Err(StoreError::InvalidQuery(NOT_A_QUERY.into())),
        }
    }

    /// Run a read query and serialize its results to `out`.
    ///
    /// SELECT results use [`ResultFormat::lookup`]; ASK writes the bare word
    /// `true` or `false` with no line terminator; CONSTRUCT and DESCRIBE results are written in the RDF
    /// serialization named by `format` (RDF/XML when `None`).
    pub fn execute<W: Write>(&self, query: &str, format: Option<&str>, out: &mut W) -> StoreResult<()> {
        match self.evaluate(query)? {
            SparqlResults::Bindings(results) => results.write(out, ResultFormat::lookup(format)),
            SparqlResults::Boolean(value) => {
                write!(out, "{value}")?;
                out.flush()?;
                Ok(())
            }
            SparqlResults::Graph(triples) => {
                let format = RdfFormat::from_name(format)?;
                RdfSerializer::serialize(&triples, &mut *out, format)?;
                Ok(())
            }
        }
    }
}

/// Counts of statements an update changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub added: usize,
    pub removed: usize,
}

/// Brackets an update with `StartRead`/`FinishRead` and `begin`/`commit`.
///
/// Dropping an open scope still emits `FinishRead` and commits.
struct UpdateScope<'a> {
    store: &'a mut GraphStore,
    open: bool,
}

impl<'a> UpdateScope<'a> {
    fn begin(store: &'a mut GraphStore) -> StoreResult<Self> {
        store.begin()?;
        store.notify(GraphEvent::StartRead);
        Ok(Self { store, open: true })
    }

    fn close(&mut self) -> StoreResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.store.notify(GraphEvent::FinishRead);
        self.store.commit()
    }
}

impl Drop for UpdateScope<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!("commit after update on '{}' failed: {}", self.store.model_name(), e);
        }
    }
}

impl GraphStore {
    /// Run a SELECT query
    pub fn execute_select(&self, query: &str) -> StoreResult<SelectResults> {
        QueryExecutor::new(self).select(query)
    }

    /// Run an ASK query
    pub fn execute_ask(&self, query: &str) -> StoreResult<bool> {
        QueryExecutor::new(self).ask(query)
    }

    /// Run a CONSTRUCT query into a new in-memory graph
    pub fn execute_construct(&self, query: &str) -> StoreResult<GraphStore> {
        QueryExecutor::new(self).construct(query)
    }

    /// Run a DESCRIBE query into a new in-memory graph
    pub fn execute_describe(&self, query: &str) -> StoreResult<GraphStore> {
        QueryExecutor::new(self).describe(query)
    }

    /// Run a read query and write its serialized results to `out`
    pub fn execute_query<W: Write>(
        &self,
        query: &str,
        format: Option<&str>,
        out: &mut W,
    ) -> StoreResult<()> {
        QueryExecutor::new(self).execute(query, format, out)
    }

    /// Run a SPARQL update against this graph.
    ///
    /// Only the default graph is affected; `GRAPH` clauses naming other
    /// graphs have no effect on the store.
    pub fn execute_update(&mut self, update: &str) -> StoreResult<UpdateOutcome> {
        spargebra::Update::parse(update, None)
            .map_err(|e| StoreError::InvalidQuery(e.to_string()))?;

        let mut scope = UpdateScope::begin(self)?;
        let applied = apply_update(&mut *scope.store, update);
        let committed = scope.close();
        let outcome = applied?;
        committed?;
        Ok(outcome)
    }
}

fn apply_update(store: &mut GraphStore, update: &str) -> StoreResult<UpdateOutcome> {
    let before: HashSet<Triple> = store.statements()?.into_iter().collect();
    let engine = snapshot(before.iter())?;
    let baseline = default_graph(&engine)?;
    engine.update(update)?;
    let after = default_graph(&engine)?;

    // The engine may rewrite a term's lexical form; map such rewrites back to
    // what the backend holds before deleting.
    let mut rewritten = HashMap::new();
    for original in before.iter().filter(|t| !baseline.contains(*t)) {
        if let Some(stored) = normalize(original)? {
            rewritten.insert(stored, original.clone());
        }
    }

    let removed: Vec<Triple> = baseline
        .difference(&after)
        .filter_map(|t| {
            if before.contains(t) {
                Some(t.clone())
            } else {
                rewritten.get(t).cloned()
            }
        })
        .collect();
    let added: Vec<Triple> = after.difference(&baseline).cloned().collect();

    let outcome = UpdateOutcome {
        removed: store.remove_statements(&removed)?,
        added: store.insert_statements(&added)?,
    };
    debug!(
        "update on '{}': {} added, {} removed",
        store.model_name(),
        outcome.added,
        outcome.removed
    );
    Ok(outcome)
}

/// Load statements into the default graph of a fresh in-memory engine
fn snapshot<'t>(triples: impl IntoIterator<Item = &'t Triple>) -> StoreResult<Store> {
    let store = Store::new()?;
    for triple in triples {
        store.insert(&triple.to_oxrdf().in_graph(GraphName::DefaultGraph))?;
    }
    Ok(store)
}

fn default_graph(store: &Store) -> StoreResult<HashSet<Triple>> {
    let mut triples = HashSet::new();
    for quad in store.quads_for_pattern(None, None, None, Some(GraphNameRef::DefaultGraph)) {
        let quad = quad?;
        triples.insert(Triple::try_from(OxTriple::new(
            quad.subject,
            quad.predicate,
            quad.object,
        ))?);
    }
    Ok(triples)
}

/// The form the engine stores `triple` in
fn normalize(triple: &Triple) -> StoreResult<Option<Triple>> {
    let scratch = snapshot([triple])?;
    Ok(default_graph(&scratch)?.into_iter().next())
}
