use rdfsync::diff::{diff, DiffOptions};
use rdfsync::rdf::{Literal, NamedNode, RdfFormat, RdfParser, RdfPredicate, Triple};
use rdfsync::store::GraphStore;

const NS: &str = "http://test.vivoweb.org/harvester/test/diff/";
const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

fn statement(res: &str, prop: &str, value: &str) -> Triple {
    Triple::new(
        NamedNode::new(&format!("{NS}{res}")).unwrap().into(),
        RdfPredicate::new(&format!("{NS}{prop}")).unwrap(),
        Literal::new_typed_literal(value, NamedNode::new(XSD_STRING).unwrap()).into(),
    )
}

struct Fixture {
    original: GraphStore,
    incoming: GraphStore,
    output: GraphStore,
    shared: Vec<Triple>,
    subs: Vec<Triple>,
    adds: Vec<Triple>,
}

fn fixture() -> Fixture {
    let shared = vec![
        statement("resA", "propA", "resApropA"),
        statement("resA", "propB", "resApropB"),
        statement("resA", "propC", "resApropC"),
        statement("resB", "propB", "resBpropB"),
        statement("resB", "propD", "resBpropD"),
        statement("resC", "propA", "resCpropA"),
        statement("resC", "propD", "resCpropD"),
        statement("resD", "propB", "resDpropB"),
        statement("resD", "propC", "resDpropC"),
        statement("resD", "propD", "resDpropD"),
    ];
    let subs = vec![
        statement("resA", "propD", "resApropDold"),
        statement("resB", "propA", "resBpropAold"),
        statement("resC", "propC", "resCpropCold"),
    ];
    let adds = vec![
        statement("resA", "propD", "resApropDnew"),
        statement("resB", "propA", "resBpropAnew"),
        statement("resC", "propB", "resCpropBnew"),
    ];

    let mut original = GraphStore::memory("original");
    original.insert_statements(&shared).unwrap();
    original.insert_statements(&subs).unwrap();

    let mut incoming = GraphStore::memory("incoming");
    incoming.insert_statements(&shared).unwrap();
    incoming.insert_statements(&adds).unwrap();

    Fixture {
        original,
        incoming,
        output: GraphStore::memory("output"),
        shared,
        subs,
        adds,
    }
}

fn holds(store: &GraphStore, triples: &[Triple]) -> Vec<bool> {
    triples.iter().map(|t| store.contains(t).unwrap()).collect()
}

#[test]
fn test_diff_adds() {
    let mut f = fixture();
    diff(&f.incoming, &f.original, &mut f.output, &DiffOptions::new()).unwrap();

    assert!(!f.output.is_empty().unwrap());
    assert!(holds(&f.output, &f.adds).iter().all(|held| *held));
    assert!(holds(&f.output, &f.subs).iter().all(|held| !*held));
    assert!(holds(&f.output, &f.shared).iter().all(|held| !*held));
}

#[test]
fn test_diff_subs() {
    let mut f = fixture();
    let summary = diff(&f.original, &f.incoming, &mut f.output, &DiffOptions::new()).unwrap();

    assert_eq!(summary.compared, 13);
    assert_eq!(summary.emitted, 3);
    assert!(holds(&f.output, &f.subs).iter().all(|held| *held));
    assert!(holds(&f.output, &f.adds).iter().all(|held| !*held));
    assert!(holds(&f.output, &f.shared).iter().all(|held| !*held));
}

#[test]
fn test_diff_same() {
    let mut f = fixture();
    let summary = diff(&f.original, &f.original, &mut f.output, &DiffOptions::new()).unwrap();

    assert_eq!(summary.emitted, 0);
    assert!(f.output.is_empty().unwrap());
}

#[test]
fn test_diff_is_antisymmetric() {
    let mut f = fixture();
    let mut reverse = GraphStore::memory("reverse");
    diff(&f.original, &f.incoming, &mut f.output, &DiffOptions::new()).unwrap();
    diff(&f.incoming, &f.original, &mut reverse, &DiffOptions::new()).unwrap();

    for triple in f.output.statements().unwrap() {
        assert!(!reverse.contains(&triple).unwrap(), "{triple} in both directions");
    }
}

#[test]
fn test_diff_dump_file() {
    let mut f = fixture();
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("subs.nt");
    let options = DiffOptions::new().with_dump_file(&dump, RdfFormat::NTriples);
    diff(&f.original, &f.incoming, &mut f.output, &options).unwrap();

    let written = std::fs::read_to_string(&dump).unwrap();
    let dumped = RdfParser::parse_str(&written, None, RdfFormat::NTriples).unwrap();
    assert_eq!(dumped.len(), f.subs.len());
    for sub in &f.subs {
        assert!(dumped.contains(sub));
    }
}

#[test]
fn test_typed_and_plain_literals_differ() {
    let mut typed = GraphStore::memory("typed");
    typed
        .load_from_str(
            r#"<http://example.org/a> <http://example.org/p> "5"^^<http://www.w3.org/2001/XMLSchema#int> ."#,
            None,
            RdfFormat::NTriples,
        )
        .unwrap();
    let mut plain = GraphStore::memory("plain");
    plain
        .load_from_str(
            r#"<http://example.org/a> <http://example.org/p> "5" ."#,
            None,
            RdfFormat::NTriples,
        )
        .unwrap();

    let mut out = GraphStore::memory("out");
    let summary = diff(&typed, &plain, &mut out, &DiffOptions::new()).unwrap();
    assert_eq!(summary.emitted, 1);
}
