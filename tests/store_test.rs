use rdfsync::rdf::{BlankNode, Literal, NamedNode, RdfFormat, RdfPredicate, Triple};
use rdfsync::store::{BackendKind, ConnectionParams, GraphStore};
use rdfsync::StoreError;
use std::path::Path;

const PEOPLE: &str = r#"
    @prefix ex: <http://example.org/> .
    @prefix foaf: <http://xmlns.com/foaf/0.1/> .
    ex:alice foaf:name "Alice"@en ;
        foaf:age "30"^^<http://www.w3.org/2001/XMLSchema#integer> ;
        foaf:knows ex:bob .
    ex:bob foaf:name "Bob" .
"#;

fn params(kind: BackendKind, dir: &Path, model: &str) -> ConnectionParams {
    let params = ConnectionParams::new(kind).with_model_name(model);
    match kind {
        BackendKind::Memory => params,
        BackendKind::Relational => {
            params.with_db_url(format!("jdbc:sqlite:{}", dir.join("rdb.db").display()))
        }
        BackendKind::QuadStore => {
            params.with_db_url(format!("jdbc:sqlite:{}", dir.join("sdb.db").display()))
        }
    }
}

const BACKENDS: [BackendKind; 3] = [
    BackendKind::Memory,
    BackendKind::Relational,
    BackendKind::QuadStore,
];

fn alice_name() -> Triple {
    Triple::new(
        NamedNode::new("http://example.org/alice").unwrap().into(),
        RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap(),
        Literal::new_language_tagged_literal("Alice", "en").unwrap().into(),
    )
}

#[test]
fn test_set_semantics_on_every_backend() {
    for kind in BACKENDS {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GraphStore::open(params(kind, dir.path(), "people")).unwrap();

        assert_eq!(store.load_from_str(PEOPLE, None, RdfFormat::Turtle).unwrap(), 4, "{kind}");
        assert_eq!(store.load_from_str(PEOPLE, None, RdfFormat::Turtle).unwrap(), 0, "{kind}");
        assert_eq!(store.size().unwrap(), 4, "{kind}");
        assert!(store.contains(&alice_name()).unwrap(), "{kind}");
        assert!(store.contains_subject_uri("http://example.org/bob").unwrap(), "{kind}");
        assert!(!store.contains_subject_uri("http://example.org/carol").unwrap(), "{kind}");
    }
}

#[test]
fn test_backends_agree_on_statements() {
    let dir = tempfile::tempdir().unwrap();
    let mut snapshots = Vec::new();
    for kind in BACKENDS {
        let mut store = GraphStore::open(params(kind, dir.path(), "people")).unwrap();
        store.load_from_str(PEOPLE, None, RdfFormat::Turtle).unwrap();
        let mut statements: Vec<String> =
            store.statements().unwrap().iter().map(|t| t.to_string()).collect();
        statements.sort();
        snapshots.push(statements);
    }
    assert_eq!(snapshots[0], snapshots[1]);
    assert_eq!(snapshots[0], snapshots[2]);
}

#[test]
fn test_remove_and_truncate() {
    for kind in BACKENDS {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GraphStore::open(params(kind, dir.path(), "people")).unwrap();
        store.load_from_str(PEOPLE, None, RdfFormat::Turtle).unwrap();

        let removed = store
            .remove_from_reader(
                r#"<http://example.org/bob> <http://xmlns.com/foaf/0.1/name> "Bob" .
                   <http://example.org/carol> <http://xmlns.com/foaf/0.1/name> "Carol" ."#
                    .as_bytes(),
                None,
                RdfFormat::NTriples,
            )
            .unwrap();
        assert_eq!(removed, 1, "{kind}");
        assert_eq!(store.size().unwrap(), 3, "{kind}");

        store.truncate().unwrap();
        assert_eq!(store.size().unwrap(), 0, "{kind}");
        store.truncate().unwrap();
        assert!(store.is_empty().unwrap(), "{kind}");
    }
}

#[test]
fn test_rdf_xml_roundtrip() {
    for kind in BACKENDS {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GraphStore::open(params(kind, dir.path(), "people")).unwrap();
        store.load_from_str(PEOPLE, None, RdfFormat::Turtle).unwrap();

        let file = dir.path().join("people.rdf");
        store.export_to_file(&file).unwrap();

        let mut reloaded = GraphStore::memory("reloaded");
        reloaded.load_from_file(&file, None, RdfFormat::RdfXml).unwrap();
        assert_eq!(reloaded.size().unwrap(), store.size().unwrap(), "{kind}");
        for triple in store.statements().unwrap() {
            assert!(reloaded.contains(&triple).unwrap(), "{kind}: lost {triple}");
        }
    }
}

#[test]
fn test_load_from_store() {
    let mut source = GraphStore::memory("source");
    source.load_from_str(PEOPLE, None, RdfFormat::Turtle).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut target = GraphStore::open(params(BackendKind::QuadStore, dir.path(), "target")).unwrap();
    assert_eq!(target.load_from_store(&source).unwrap(), 4);
    assert_eq!(target.remove_from_store(&source).unwrap(), 4);
    assert!(target.is_empty().unwrap());
}

#[test]
fn test_blank_nodes_survive_sql_backends() {
    let triple = Triple::new(
        BlankNode::with_id("n1").unwrap().into(),
        RdfPredicate::new("http://example.org/p").unwrap(),
        BlankNode::with_id("n2").unwrap().into(),
    );
    for kind in [BackendKind::Relational, BackendKind::QuadStore] {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GraphStore::open(params(kind, dir.path(), "g")).unwrap();
        store.insert_statements(std::slice::from_ref(&triple)).unwrap();
        assert_eq!(store.statements().unwrap(), vec![triple.clone()], "{kind}");
    }
}

#[test]
fn test_separate_loads_keep_blank_nodes_apart() {
    let address = r#"
        @prefix ex: <http://example.org/> .
        ex:alice ex:address [ ex:city "Paris" ] .
    "#;
    for kind in BACKENDS {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GraphStore::open(params(kind, dir.path(), "g")).unwrap();
        assert_eq!(store.load_from_str(address, None, RdfFormat::Turtle).unwrap(), 2, "{kind}");
        assert_eq!(store.load_from_str(address, None, RdfFormat::Turtle).unwrap(), 2, "{kind}");
        assert_eq!(store.size().unwrap(), 4, "{kind}");

        let joined = store
            .execute_select(
                "SELECT ?c WHERE { ?s <http://example.org/address> ?a . ?a <http://example.org/city> ?c }",
            )
            .unwrap();
        assert_eq!(joined.len(), 2, "{kind}");
    }
}

#[test]
fn test_sql_graphs_persist_across_connections() {
    for kind in [BackendKind::Relational, BackendKind::QuadStore] {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GraphStore::open(params(kind, dir.path(), "people")).unwrap();
        store.load_from_str(PEOPLE, None, RdfFormat::Turtle).unwrap();
        store.close().unwrap();

        let reopened = GraphStore::open(params(kind, dir.path(), "people")).unwrap();
        assert_eq!(reopened.size().unwrap(), 4, "{kind}");
    }
}

#[test]
fn test_neighbors_share_the_connection_target() {
    for kind in [BackendKind::Relational, BackendKind::QuadStore] {
        let dir = tempfile::tempdir().unwrap();
        let mut people = GraphStore::open(params(kind, dir.path(), "people")).unwrap();
        people.load_from_str(PEOPLE, None, RdfFormat::Turtle).unwrap();

        let mut scratch = people.clone_as_neighbor("scratch").unwrap();
        assert_eq!(scratch.model_name(), "scratch");
        assert_eq!(scratch.params().db_url(), people.params().db_url());
        assert!(scratch.is_empty().unwrap(), "{kind}");

        scratch.insert_statements(&[alice_name()]).unwrap();
        scratch.truncate().unwrap();
        assert_eq!(people.size().unwrap(), 4, "{kind}");

        scratch.insert_statements(&[alice_name()]).unwrap();
        let dataset = people.connection_dataset().unwrap();
        assert_eq!(dataset.graph_names().collect::<Vec<_>>(), vec!["people", "scratch"], "{kind}");
        assert_eq!(dataset.statement_count(), 5, "{kind}");
    }
}

#[test]
fn test_memory_neighbor_is_fresh() {
    let mut people = GraphStore::memory("people");
    people.load_from_str(PEOPLE, None, RdfFormat::Turtle).unwrap();
    let neighbor = people.clone_as_neighbor("other").unwrap();
    assert!(neighbor.is_empty().unwrap());
    assert_eq!(people.connection_dataset().unwrap().len(), 1);
}

#[test]
fn test_operations_after_close() {
    for kind in BACKENDS {
        let dir = tempfile::tempdir().unwrap();
        let mut store = GraphStore::open(params(kind, dir.path(), "people")).unwrap();
        store.close().unwrap();

        assert!(matches!(store.size(), Err(StoreError::Closed(_))), "{kind}");
        assert!(matches!(
            store.load_from_str(PEOPLE, None, RdfFormat::Turtle),
            Err(StoreError::Closed(_))
        ));
        assert!(matches!(store.export_to_string(), Err(StoreError::Closed(_))));
        assert!(matches!(store.close(), Err(StoreError::Closed(_))));
    }
}

#[test]
fn test_unreachable_database() {
    let params = ConnectionParams::new(BackendKind::Relational)
        .with_db_url("jdbc:sqlite:/nonexistent/dir/graph.db");
    assert!(matches!(
        GraphStore::open(params),
        Err(StoreError::Connection { .. })
    ));
}
