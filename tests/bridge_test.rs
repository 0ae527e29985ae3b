use rdfsync::bridge::{BridgeReport, Record, RecordBridge};
use rdfsync::store::{BackendKind, ConnectionParams, GraphStore};
use rdfsync::RdfFormat;

fn person(id: &str, name: &str) -> Record {
    Record::new(
        id,
        format!(
            r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:foaf="http://xmlns.com/foaf/0.1/">
  <rdf:Description rdf:about="http://example.org/{id}">
    <foaf:name>{name}</foaf:name>
    <rdf:type rdf:resource="http://xmlns.com/foaf/0.1/Person"/>
  </rdf:Description>
</rdf:RDF>"#
        ),
    )
}

fn records() -> Vec<Record> {
    vec![
        person("alice", "Alice"),
        Record::new("broken", "<rdf:RDF><unclosed"),
        person("carol", "Carol"),
    ]
}

#[test]
fn test_import_skips_unparseable_records() {
    let mut store = GraphStore::memory("people");
    let report = RecordBridge::default()
        .import_all(&mut store, records(), None)
        .unwrap();

    assert_eq!(report, BridgeReport { processed: 2, failed: 1 });
    assert_eq!(store.size().unwrap(), 4);
    assert!(store.contains_subject_uri("http://example.org/alice").unwrap());
    assert!(store.contains_subject_uri("http://example.org/carol").unwrap());
}

#[test]
fn test_remove_all() {
    let dir = tempfile::tempdir().unwrap();
    let params = ConnectionParams::new(BackendKind::Relational)
        .with_model_name("people")
        .with_db_url(format!("jdbc:sqlite:{}", dir.path().join("bridge.db").display()));
    let mut store = GraphStore::open(params).unwrap();
    let bridge = RecordBridge::new(RdfFormat::RdfXml);

    bridge.import_all(&mut store, records(), None).unwrap();
    store
        .load_from_str(
            r#"<http://example.org/bob> <http://xmlns.com/foaf/0.1/name> "Bob" ."#,
            None,
            RdfFormat::NTriples,
        )
        .unwrap();

    let report = bridge.remove_all(&mut store, records(), None).unwrap();
    assert_eq!(report, BridgeReport { processed: 2, failed: 1 });
    assert_eq!(store.size().unwrap(), 1);
    assert!(store.contains_subject_uri("http://example.org/bob").unwrap());
}

#[test]
fn test_ntriples_records() {
    let mut store = GraphStore::memory("g");
    let records = (0..5).map(|i| {
        Record::new(
            format!("r{i}"),
            format!(r#"<http://example.org/r{i}> <http://example.org/index> "{i}" ."#),
        )
    });
    let report = RecordBridge::new(RdfFormat::NTriples)
        .import_all(&mut store, records, None)
        .unwrap();
    assert_eq!(report.processed, 5);
    assert_eq!(store.size().unwrap(), 5);
}

fn address(id: &str, city: &str) -> Record {
    Record::new(
        id,
        format!(
            r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:ex="http://example.org/">
  <rdf:Description rdf:about="http://example.org/{id}">
    <ex:addr rdf:parseType="Resource">
      <ex:city>{city}</ex:city>
    </ex:addr>
  </rdf:Description>
</rdf:RDF>"#
        ),
    )
}

#[test]
fn test_records_do_not_share_blank_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let params = ConnectionParams::new(BackendKind::QuadStore)
        .with_model_name("addresses")
        .with_db_url(format!("jdbc:sqlite:{}", dir.path().join("addr.db").display()));
    let mut store = GraphStore::open(params).unwrap();

    let report = RecordBridge::default()
        .import_all(&mut store, vec![address("a", "Paris"), address("b", "Rome")], None)
        .unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(store.size().unwrap(), 4);

    let results = store
        .execute_select(
            r#"PREFIX ex: <http://example.org/>
               SELECT ?s ?c WHERE { ?s ex:addr ?x . ?x ex:city ?c } ORDER BY ?c"#,
        )
        .unwrap();
    assert_eq!(results.len(), 2);
    let pairs: Vec<(String, String)> = results
        .solutions
        .iter()
        .map(|s| (s.get("s").unwrap().to_string(), s.get("c").unwrap().to_string()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("<http://example.org/a>".to_string(), "\"Paris\"".to_string()),
            ("<http://example.org/b>".to_string(), "\"Rome\"".to_string()),
        ]
    );
}
