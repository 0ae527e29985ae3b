//! Quad-store backend
//!
//! Terms live once in a `nodes` table; statements are rows of node ids in a
//! `quads` table keyed by (graph, subject, predicate, object). Two layouts
//! decide how node ids are assigned:
//!
//! - `layout2/index`: sequential ids, looked up on every access
//! - `layout2/hash`: ids derived from a SHA-256 digest of the term, so
//!   lookups need no round trip
//!
//! The layout is fixed when the database is first formatted.

use super::backend::BackendAdapter;
use super::params::ConnectionParams;
use super::{sql, Dataset};
use crate::config::{ConfigError, KEY_DB_LAYOUT};
use crate::error::{StoreError, StoreResult};
use crate::rdf::{NamedNode, RdfObject, RdfPredicate, RdfSubject, TermResult, Triple};
use rusqlite::{ffi, params, Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS quad_meta (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS nodes (
        id       INTEGER PRIMARY KEY,
        kind     INTEGER NOT NULL,
        lex      TEXT NOT NULL,
        lang     TEXT NOT NULL DEFAULT '',
        datatype TEXT NOT NULL DEFAULT '',
        UNIQUE (kind, lex, lang, datatype)
    );
    CREATE TABLE IF NOT EXISTS quads (
        g INTEGER NOT NULL,
        s INTEGER NOT NULL,
        p INTEGER NOT NULL,
        o INTEGER NOT NULL,
        PRIMARY KEY (g, s, p, o)
    );
    CREATE INDEX IF NOT EXISTS idx_quads_gpo ON quads (g, p, o);
    CREATE INDEX IF NOT EXISTS idx_quads_gos ON quads (g, o, s);
";

const SELECT_STATEMENTS: &str = "
    SELECT s.kind, s.lex, p.lex, o.kind, o.lex, o.lang, o.datatype, g.lex
    FROM quads q
    JOIN nodes s ON s.id = q.s
    JOIN nodes p ON p.id = q.p
    JOIN nodes o ON o.id = q.o
    JOIN nodes g ON g.id = q.g
";

/// Node id assignment scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuadLayout {
    /// Sequential ids
    #[default]
    Index,
    /// Digest-derived ids
    Hash,
}

impl QuadLayout {
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "layout2/index" | "index" => Ok(QuadLayout::Index),
            "layout2/hash" | "hash" => Ok(QuadLayout::Hash),
            _ => Err(ConfigError::InvalidValue {
                key: KEY_DB_LAYOUT.to_string(),
                value: name.to_string(),
                reason: "expected 'layout2/index' or 'layout2/hash'".to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QuadLayout::Index => "layout2/index",
            QuadLayout::Hash => "layout2/hash",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
enum NodeKind {
    Graph = 0,
    Iri = 1,
    Blank = 2,
    Literal = 3,
}

impl NodeKind {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(NodeKind::Graph),
            1 => Some(NodeKind::Iri),
            2 => Some(NodeKind::Blank),
            3 => Some(NodeKind::Literal),
            _ => None,
        }
    }
}

/// A term as stored in the `nodes` table
struct NodeKey<'a> {
    kind: NodeKind,
    lex: &'a str,
    lang: &'a str,
    datatype: &'a str,
}

impl<'a> NodeKey<'a> {
    fn iri(iri: &'a str) -> Self {
        Self { kind: NodeKind::Iri, lex: iri, lang: "", datatype: "" }
    }

    fn graph(name: &'a str) -> Self {
        Self { kind: NodeKind::Graph, lex: name, lang: "", datatype: "" }
    }

    fn subject(subject: &'a RdfSubject) -> Self {
        match subject {
            RdfSubject::NamedNode(n) => Self::iri(n.as_str()),
            RdfSubject::BlankNode(b) => Self { kind: NodeKind::Blank, lex: b.as_str(), lang: "", datatype: "" },
        }
    }

    fn predicate(predicate: &'a RdfPredicate) -> Self {
        Self::iri(predicate.as_str())
    }

    fn object(object: &'a RdfObject) -> Self {
        match object {
            RdfObject::NamedNode(n) => Self::iri(n.as_str()),
            RdfObject::BlankNode(b) => Self { kind: NodeKind::Blank, lex: b.as_str(), lang: "", datatype: "" },
            RdfObject::Literal(l) => Self {
                kind: NodeKind::Literal,
                lex: l.value(),
                lang: l.language().unwrap_or(""),
                datatype: if l.language().is_some() { "" } else { l.inner().datatype().as_str() },
            },
        }
    }

    /// First eight bytes of the SHA-256 of the node's fields
    fn hash_id(&self) -> i64 {
        let mut hasher = Sha256::new();
        hasher.update([self.kind as u8]);
        for field in [self.lex, self.lang, self.datatype] {
            hasher.update(field.as_bytes());
            hasher.update([0u8]);
        }
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        i64::from_be_bytes(bytes)
    }
}

pub(crate) struct QuadBackend {
    conn: Connection,
    layout: QuadLayout,
    model: String,
    graph_id: i64,
}

impl QuadBackend {
    pub(crate) fn open(params: &ConnectionParams) -> StoreResult<Self> {
        let requested = params.layout().map(QuadLayout::from_name).transpose()?;
        let conn = sql::connect(params)?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::connection_caused("cannot format quad store", e))?;
        let layout = resolve_layout(&conn, requested)?;

        let mut backend = Self {
            conn,
            layout,
            model: params.model_name().to_string(),
            graph_id: 0,
        };
        backend.graph_id = backend.intern(&NodeKey::graph(params.model_name()))?;
        debug!(
            "quad graph '{}' ready ({})",
            backend.model,
            backend.layout.name()
        );
        Ok(backend)
    }

    pub(crate) fn close(self) -> StoreResult<()> {
        sql::close(self.conn)
    }

    /// Id of an existing node, if any
    fn find(&self, node: &NodeKey<'_>) -> StoreResult<Option<i64>> {
        if self.layout == QuadLayout::Hash {
            return Ok(Some(node.hash_id()));
        }
        Ok(self
            .conn
            .prepare_cached(
                "SELECT id FROM nodes WHERE kind = ?1 AND lex = ?2 AND lang = ?3 AND datatype = ?4",
            )?
            .query_row(
                params![node.kind as i64, node.lex, node.lang, node.datatype],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Id of a node, creating it if needed
    fn intern(&self, node: &NodeKey<'_>) -> StoreResult<i64> {
        match self.layout {
            QuadLayout::Hash => {
                let id = node.hash_id();
                let inserted = self
                    .conn
                    .prepare_cached(
                        "INSERT OR IGNORE INTO nodes (id, kind, lex, lang, datatype)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                    )?
                    .execute(params![id, node.kind as i64, node.lex, node.lang, node.datatype])?;
                if inserted == 0 {
                    self.check_hash_slot(id, node)?;
                }
                Ok(id)
            }
            QuadLayout::Index => {
                if let Some(id) = self.find(node)? {
                    return Ok(id);
                }
                self.conn
                    .prepare_cached(
                        "INSERT INTO nodes (kind, lex, lang, datatype) VALUES (?1, ?2, ?3, ?4)",
                    )?
                    .execute(params![node.kind as i64, node.lex, node.lang, node.datatype])?;
                Ok(self.conn.last_insert_rowid())
            }
        }
    }

    /// The row already at a digest id must hold the same term
    fn check_hash_slot(&self, id: i64, node: &NodeKey<'_>) -> StoreResult<()> {
        let holds_node: bool = self
            .conn
            .prepare_cached(
                "SELECT kind = ?2 AND lex = ?3 AND lang = ?4 AND datatype = ?5 FROM nodes WHERE id = ?1",
            )?
            .query_row(
                params![id, node.kind as i64, node.lex, node.lang, node.datatype],
                |row| row.get(0),
            )?;
        if holds_node {
            return Ok(());
        }
        Err(StoreError::Storage(rusqlite::Error::SqliteFailure(
            ffi::Error::new(ffi::SQLITE_CONSTRAINT),
            Some(format!("node id {id} already holds a different term than '{}'", node.lex)),
        )))
    }

    /// Ids of an existing statement's nodes, `None` if any node is unknown
    fn find_triple(&self, triple: &Triple) -> StoreResult<Option<(i64, i64, i64)>> {
        let s = self.find(&NodeKey::subject(&triple.subject))?;
        let p = self.find(&NodeKey::predicate(&triple.predicate))?;
        let o = self.find(&NodeKey::object(&triple.object))?;
        Ok(match (s, p, o) {
            (Some(s), Some(p), Some(o)) => Some((s, p, o)),
            _ => None,
        })
    }
}

/// The layout a database was formatted with wins; a conflicting request is an error.
fn resolve_layout(conn: &Connection, requested: Option<QuadLayout>) -> StoreResult<QuadLayout> {
    let stored: Option<String> = conn
        .query_row("SELECT value FROM quad_meta WHERE key = 'layout'", [], |row| row.get(0))
        .optional()?;

    match (stored, requested) {
        (Some(stored), requested) => {
            let layout = QuadLayout::from_name(&stored)?;
            match requested {
                Some(requested) if requested != layout => Err(ConfigError::InvalidValue {
                    key: KEY_DB_LAYOUT.to_string(),
                    value: requested.name().to_string(),
                    reason: format!("database is formatted as {}", layout.name()),
                }
                .into()),
                _ => Ok(layout),
            }
        }
        (None, requested) => {
            let layout = requested.unwrap_or_default();
            conn.execute(
                "INSERT INTO quad_meta (key, value) VALUES ('layout', ?1)",
                params![layout.name()],
            )?;
            debug!("formatted quad store as {}", layout.name());
            Ok(layout)
        }
    }
}

fn decode_row(row: &Row<'_>) -> StoreResult<Triple> {
    let s_kind: i64 = row.get(0)?;
    let s_lex: String = row.get(1)?;
    let p_lex: String = row.get(2)?;
    let o_kind: i64 = row.get(3)?;
    let o_lex: String = row.get(4)?;
    let o_lang: String = row.get(5)?;
    let o_datatype: String = row.get(6)?;

    let subject = match NodeKind::from_code(s_kind) {
        Some(NodeKind::Blank) => crate::rdf::BlankNode::with_id(&s_lex)?.into(),
        _ => NamedNode::new(&s_lex)?.into(),
    };
    let object = decode_object(o_kind, &o_lex, &o_lang, &o_datatype)?;
    Ok(Triple::new(subject, RdfPredicate::new(&p_lex)?, object))
}

fn decode_object(kind: i64, lex: &str, lang: &str, datatype: &str) -> TermResult<RdfObject> {
    Ok(match NodeKind::from_code(kind) {
        Some(NodeKind::Blank) => crate::rdf::BlankNode::with_id(lex)?.into(),
        Some(NodeKind::Literal) => sql::literal(lex, lang, datatype)?.into(),
        _ => NamedNode::new(lex)?.into(),
    })
}

impl BackendAdapter for QuadBackend {
    fn insert(&mut self, triples: &[Triple]) -> StoreResult<usize> {
        let backend = &*self;
        sql::in_batch(&backend.conn, |conn| {
            let mut added = 0;
            for t in triples {
                let s = backend.intern(&NodeKey::subject(&t.subject))?;
                let p = backend.intern(&NodeKey::predicate(&t.predicate))?;
                let o = backend.intern(&NodeKey::object(&t.object))?;
                added += conn
                    .prepare_cached("INSERT OR IGNORE INTO quads (g, s, p, o) VALUES (?1, ?2, ?3, ?4)")?
                    .execute(params![backend.graph_id, s, p, o])?;
            }
            Ok(added)
        })
    }

    fn remove(&mut self, triples: &[Triple]) -> StoreResult<usize> {
        let backend = &*self;
        sql::in_batch(&backend.conn, |conn| {
            let mut removed = 0;
            for t in triples {
                if let Some((s, p, o)) = backend.find_triple(t)? {
                    removed += conn
                        .prepare_cached(
                            "DELETE FROM quads WHERE g = ?1 AND s = ?2 AND p = ?3 AND o = ?4",
                        )?
                        .execute(params![backend.graph_id, s, p, o])?;
                }
            }
            Ok(removed)
        })
    }

    fn contains(&self, triple: &Triple) -> StoreResult<bool> {
        let Some((s, p, o)) = self.find_triple(triple)? else {
            return Ok(false);
        };
        let found = self
            .conn
            .prepare_cached("SELECT 1 FROM quads WHERE g = ?1 AND s = ?2 AND p = ?3 AND o = ?4")?
            .query_row(params![self.graph_id, s, p, o], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn contains_subject(&self, subject: &NamedNode) -> StoreResult<bool> {
        let Some(s) = self.find(&NodeKey::iri(subject.as_str()))? else {
            return Ok(false);
        };
        let found = self
            .conn
            .prepare_cached("SELECT 1 FROM quads WHERE g = ?1 AND s = ?2 LIMIT 1")?
            .query_row(params![self.graph_id, s], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn statements(&self) -> StoreResult<Vec<Triple>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{SELECT_STATEMENTS} WHERE q.g = ?1"))?;
        let mut rows = stmt.query(params![self.graph_id])?;
        let mut triples = Vec::new();
        while let Some(row) = rows.next()? {
            triples.push(decode_row(row)?);
        }
        Ok(triples)
    }

    fn len(&self) -> StoreResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM quads WHERE g = ?1",
            params![self.graph_id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn truncate(&mut self) -> StoreResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM quads WHERE g = ?1", params![self.graph_id])?;
        debug!("truncated quad graph '{}' ({} statements)", self.model, removed);
        Ok(())
    }

    fn dataset(&self) -> StoreResult<Dataset> {
        let mut stmt = self.conn.prepare(SELECT_STATEMENTS)?;
        let mut rows = stmt.query([])?;
        let mut dataset = Dataset::new();
        while let Some(row) = rows.next()? {
            let graph: String = row.get(7)?;
            dataset.insert(&graph, decode_row(row)?);
        }
        Ok(dataset)
    }

    fn begin(&mut self) -> StoreResult<()> {
        sql::begin(&self.conn)
    }

    fn commit(&mut self) -> StoreResult<()> {
        sql::commit(&self.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::Literal;
    use crate::store::params::BackendKind;

    fn params(db: &std::path::Path, model: &str) -> ConnectionParams {
        ConnectionParams::new(BackendKind::QuadStore)
            .with_db_url(format!("jdbc:sqlite:{}", db.display()))
            .with_model_name(model)
    }

    fn triple(subject: &str, object: RdfObject) -> Triple {
        Triple::new(
            NamedNode::new(subject).unwrap().into(),
            RdfPredicate::new("http://example.org/p").unwrap(),
            object,
        )
    }

    #[test]
    fn test_layout_names() {
        assert_eq!(QuadLayout::from_name("layout2/index").unwrap(), QuadLayout::Index);
        assert_eq!(QuadLayout::from_name("LAYOUT2/HASH").unwrap(), QuadLayout::Hash);
        assert!(QuadLayout::from_name("layout1").is_err());
    }

    #[test]
    fn test_both_layouts_store_the_same_graph() {
        for layout in ["layout2/index", "layout2/hash"] {
            let dir = tempfile::tempdir().unwrap();
            let mut backend =
                QuadBackend::open(&params(&dir.path().join("sdb.db"), "g").with_layout(layout))
                    .unwrap();
            let typed = triple(
                "http://example.org/a",
                Literal::new_typed_literal("5", NamedNode::new("http://www.w3.org/2001/XMLSchema#int").unwrap())
                    .into(),
            );
            let plain = triple("http://example.org/a", Literal::new_simple_literal("5").into());

            assert_eq!(backend.insert(&[typed.clone(), plain.clone(), typed.clone()]).unwrap(), 2);
            assert_eq!(backend.len().unwrap(), 2, "{layout}");
            assert!(backend.contains(&typed).unwrap());
            assert!(backend.contains_subject(&NamedNode::new("http://example.org/a").unwrap()).unwrap());

            let mut stored = backend.statements().unwrap();
            stored.sort_by_key(|t| t.to_string());
            let mut expected = vec![typed.clone(), plain.clone()];
            expected.sort_by_key(|t| t.to_string());
            assert_eq!(stored, expected);

            assert_eq!(backend.remove(&[plain.clone()]).unwrap(), 1);
            assert!(!backend.contains(&plain).unwrap());
        }
    }

    #[test]
    fn test_layout_is_fixed_at_format_time() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("sdb.db");
        let backend = QuadBackend::open(&params(&db, "g").with_layout("layout2/hash")).unwrap();
        backend.close().unwrap();

        let reopened = QuadBackend::open(&params(&db, "g")).unwrap();
        assert_eq!(reopened.layout, QuadLayout::Hash);
        reopened.close().unwrap();

        assert!(matches!(
            QuadBackend::open(&params(&db, "g").with_layout("layout2/index")),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_unknown_layout() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            QuadBackend::open(&params(&dir.path().join("sdb.db"), "g").with_layout("layout9")),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_hash_collision_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend =
            QuadBackend::open(&params(&dir.path().join("sdb.db"), "g").with_layout("layout2/hash"))
                .unwrap();
        let t = triple("http://example.org/a", Literal::new_simple_literal("x").into());
        let taken = NodeKey::object(&t.object).hash_id();
        backend
            .conn
            .execute(
                "INSERT INTO nodes (id, kind, lex, lang, datatype) VALUES (?1, 3, 'other', '', '')",
                params![taken],
            )
            .unwrap();

        assert!(matches!(backend.insert(&[t.clone()]), Err(StoreError::Storage(_))));
        assert_eq!(backend.len().unwrap(), 0);

        let fine = triple("http://example.org/a", Literal::new_simple_literal("y").into());
        assert_eq!(backend.insert(&[fine.clone(), fine]).unwrap(), 1);
    }

    #[test]
    fn test_graphs_share_nodes_not_statements() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("sdb.db");
        let mut a = QuadBackend::open(&params(&db, "a")).unwrap();
        let mut b = QuadBackend::open(&params(&db, "b")).unwrap();
        let t = triple("http://example.org/a", Literal::new_simple_literal("x").into());

        a.insert(&[t.clone()]).unwrap();
        assert!(!b.contains(&t).unwrap());
        b.insert(&[t.clone()]).unwrap();
        a.truncate().unwrap();
        assert!(b.contains(&t).unwrap());

        let dataset = b.dataset().unwrap();
        assert_eq!(dataset.graph("b").map(<[Triple]>::len), Some(1));
        assert!(dataset.graph("a").is_none());
    }
}
