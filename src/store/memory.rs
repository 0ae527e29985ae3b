//! In-memory graph backend
//!
//! A hash set of statements plus a subject index, so subject existence
//! checks do not scan the graph. Nothing is shared between instances: a
//! neighbor of a memory graph starts empty.

use super::backend::BackendAdapter;
use super::Dataset;
use crate::error::StoreResult;
use crate::rdf::{NamedNode, RdfObject, RdfPredicate, RdfSubject, Triple};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Process-local graph
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryBackend {
    model_name: String,

    /// All statements (primary storage)
    triples: HashSet<Triple>,

    /// SP index: Subject -> Predicate -> Set of Objects
    spo_index: HashMap<RdfSubject, HashMap<RdfPredicate, HashSet<RdfObject>>>,
}

impl MemoryBackend {
    pub(crate) fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            ..Self::default()
        }
    }

    fn insert_one(&mut self, triple: &Triple) -> bool {
        if !self.triples.insert(triple.clone()) {
            return false;
        }
        self.spo_index
            .entry(triple.subject.clone())
            .or_default()
            .entry(triple.predicate.clone())
            .or_default()
            .insert(triple.object.clone());
        true
    }

    fn remove_one(&mut self, triple: &Triple) -> bool {
        if !self.triples.remove(triple) {
            return false;
        }
        if let Some(preds) = self.spo_index.get_mut(&triple.subject) {
            if let Some(objs) = preds.get_mut(&triple.predicate) {
                objs.remove(&triple.object);
                if objs.is_empty() {
                    preds.remove(&triple.predicate);
                }
            }
            if preds.is_empty() {
                self.spo_index.remove(&triple.subject);
            }
        }
        true
    }
}

impl BackendAdapter for MemoryBackend {
    fn insert(&mut self, triples: &[Triple]) -> StoreResult<usize> {
        Ok(triples.iter().filter(|t| self.insert_one(t)).count())
    }

    fn remove(&mut self, triples: &[Triple]) -> StoreResult<usize> {
        Ok(triples.iter().filter(|t| self.remove_one(t)).count())
    }

    fn contains(&self, triple: &Triple) -> StoreResult<bool> {
        Ok(self.triples.contains(triple))
    }

    fn contains_subject(&self, subject: &NamedNode) -> StoreResult<bool> {
        Ok(self
            .spo_index
            .contains_key(&RdfSubject::NamedNode(subject.clone())))
    }

    fn statements(&self) -> StoreResult<Vec<Triple>> {
        Ok(self.triples.iter().cloned().collect())
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.triples.len())
    }

    fn truncate(&mut self) -> StoreResult<()> {
        self.triples.clear();
        self.spo_index.clear();
        Ok(())
    }

    fn dataset(&self) -> StoreResult<Dataset> {
        let mut dataset = Dataset::new();
        dataset.insert_graph(&self.model_name, self.statements()?);
        Ok(dataset)
    }

    /// Mutations apply immediately; there is nothing to open
    fn begin(&mut self) -> StoreResult<()> {
        debug!("memory graph '{}': begin", self.model_name);
        Ok(())
    }

    /// Nothing to flush
    fn commit(&mut self) -> StoreResult<()> {
        debug!("memory graph '{}': commit", self.model_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::Literal;

    fn triple(subject: &str, object: &str) -> Triple {
        Triple::new(
            NamedNode::new(subject).unwrap().into(),
            RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap(),
            Literal::new_simple_literal(object).into(),
        )
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut backend = MemoryBackend::new("g");
        let t = triple("http://example.org/alice", "Alice");

        assert_eq!(backend.insert(&[t.clone(), t.clone()]).unwrap(), 1);
        assert_eq!(backend.insert(&[t.clone()]).unwrap(), 0);
        assert_eq!(backend.len().unwrap(), 1);
        assert!(backend.contains(&t).unwrap());
    }

    #[test]
    fn test_remove_maintains_subject_index() {
        let mut backend = MemoryBackend::new("g");
        let alice = NamedNode::new("http://example.org/alice").unwrap();
        let first = triple(alice.as_str(), "Alice");
        let second = triple(alice.as_str(), "Alicia");
        backend.insert(&[first.clone(), second.clone()]).unwrap();

        assert_eq!(backend.remove(&[first]).unwrap(), 1);
        assert!(backend.contains_subject(&alice).unwrap());

        assert_eq!(backend.remove(&[second.clone(), second]).unwrap(), 1);
        assert!(!backend.contains_subject(&alice).unwrap());
        assert_eq!(backend.len().unwrap(), 0);
    }

    #[test]
    fn test_truncate() {
        let mut backend = MemoryBackend::new("g");
        backend
            .insert(&[triple("http://example.org/a", "A"), triple("http://example.org/b", "B")])
            .unwrap();
        backend.truncate().unwrap();
        assert_eq!(backend.len().unwrap(), 0);
        assert!(backend.statements().unwrap().is_empty());
    }

    #[test]
    fn test_dataset_holds_only_this_graph() {
        let mut backend = MemoryBackend::new("http://example.org/g");
        backend.insert(&[triple("http://example.org/a", "A")]).unwrap();
        let dataset = backend.dataset().unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.graph("http://example.org/g").map(<[Triple]>::len), Some(1));
    }

    #[test]
    fn test_mutations_inside_begin_are_visible_immediately() {
        let mut backend = MemoryBackend::new("g");
        backend.begin().unwrap();
        backend.insert(&[triple("http://example.org/a", "A")]).unwrap();
        assert_eq!(backend.len().unwrap(), 1);
        backend.commit().unwrap();
        backend.commit().unwrap();
        assert_eq!(backend.len().unwrap(), 1);
    }
}
