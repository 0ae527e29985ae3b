//! Shared plumbing for the SQLite-backed graphs
//!
//! Resolves connection parameters to a database handle and encodes terms
//! as text for the generic triple table.

use super::params::ConnectionParams;
use crate::config::{KEY_DB_CLASS, KEY_DB_TYPE, KEY_DB_URL};
use crate::error::{StoreError, StoreResult};
use crate::rdf::{
    BlankNode, Literal, NamedNode, RdfObject, RdfPredicate, RdfSubject, TermError, TermResult,
};
use oxrdf::vocab::xsd;
use rusqlite::Connection;
use tracing::debug;

const SUPPORTED_DRIVERS: &[&str] = &["sqlite", "org.sqlite.JDBC"];
const SUPPORTED_ENGINE: &str = "SQLite";
const URL_PREFIXES: &[&str] = &["jdbc:sqlite:", "sqlite:"];

/// Open the database named by `dbUrl` after checking the driver and engine
pub(crate) fn connect(params: &ConnectionParams) -> StoreResult<Connection> {
    check_driver(params)?;

    let url = params.db_url().ok_or_else(|| {
        StoreError::connection(format!(
            "'{}' backend requires the '{}' parameter",
            params.backend(),
            KEY_DB_URL
        ))
    })?;
    let path = database_path(url)?;
    if params.db_user().is_some() || params.db_pass().is_some() {
        debug!("SQLite does not authenticate; credentials ignored");
    }

    let conn = Connection::open(path)
        .map_err(|e| StoreError::connection_caused(format!("cannot open {url}"), e))?;
    configure_connection(&conn);
    conn.query_row("SELECT 1", [], |_| Ok(()))
        .map_err(|e| StoreError::connection_caused(format!("cannot reach {url}"), e))?;

    debug!("connected to {}", url);
    Ok(conn)
}

fn check_driver(params: &ConnectionParams) -> StoreResult<()> {
    if let Some(class) = params.db_class() {
        if !SUPPORTED_DRIVERS.iter().any(|d| d.eq_ignore_ascii_case(class)) {
            return Err(StoreError::connection(format!(
                "driver '{class}' ({KEY_DB_CLASS}) is not available"
            )));
        }
    }
    if let Some(engine) = params.db_type() {
        if !engine.eq_ignore_ascii_case(SUPPORTED_ENGINE) {
            return Err(StoreError::connection(format!(
                "database engine '{engine}' ({KEY_DB_TYPE}) is not supported"
            )));
        }
    }
    Ok(())
}

/// Strip a `jdbc:sqlite:` or `sqlite:` prefix; any other JDBC subprotocol is rejected
fn database_path(url: &str) -> StoreResult<&str> {
    let url = url.trim();
    let path = URL_PREFIXES
        .iter()
        .find_map(|prefix| {
            url.get(..prefix.len())
                .filter(|head| head.eq_ignore_ascii_case(prefix))
                .map(|_| &url[prefix.len()..])
        })
        .unwrap_or(url);

    if path.get(..5).is_some_and(|head| head.eq_ignore_ascii_case("jdbc:")) {
        return Err(StoreError::connection(format!(
            "unsupported database URL '{url}'"
        )));
    }
    if path.is_empty() {
        return Err(StoreError::connection(format!("empty database path in '{url}'")));
    }
    Ok(path)
}

/// WAL mode and a busy timeout; failures are not fatal (in-memory databases
/// refuse WAL)
fn configure_connection(conn: &Connection) {
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    let _ = conn.pragma_update(None, "busy_timeout", "5000");
}

/// Run `f` inside a transaction unless one is already open
pub(crate) fn in_batch<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> StoreResult<T>,
) -> StoreResult<T> {
    if !conn.is_autocommit() {
        return f(conn);
    }
    let tx = conn.unchecked_transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

pub(crate) fn begin(conn: &Connection) -> StoreResult<()> {
    if conn.is_autocommit() {
        conn.execute_batch("BEGIN IMMEDIATE")?;
    }
    Ok(())
}

pub(crate) fn commit(conn: &Connection) -> StoreResult<()> {
    if !conn.is_autocommit() {
        conn.execute_batch("COMMIT")?;
    }
    Ok(())
}

pub(crate) fn close(conn: Connection) -> StoreResult<()> {
    conn.close().map_err(|(_, e)| StoreError::Storage(e))
}

// Term codec: `U:<iri>`, `B:<id>`, `L:<lang>|<datatype>|<lexical>`.
// Neither language tags nor IRIs may contain '|'.

pub(crate) fn encode_subject(subject: &RdfSubject) -> String {
    match subject {
        RdfSubject::NamedNode(n) => format!("U:{}", n.as_str()),
        RdfSubject::BlankNode(b) => format!("B:{}", b.as_str()),
    }
}

pub(crate) fn encode_predicate(predicate: &RdfPredicate) -> String {
    format!("U:{}", predicate.as_str())
}

pub(crate) fn encode_object(object: &RdfObject) -> String {
    match object {
        RdfObject::NamedNode(n) => format!("U:{}", n.as_str()),
        RdfObject::BlankNode(b) => format!("B:{}", b.as_str()),
        RdfObject::Literal(l) => match l.language() {
            Some(lang) => format!("L:{}||{}", lang, l.value()),
            None => format!("L:|{}|{}", l.inner().datatype().as_str(), l.value()),
        },
    }
}

pub(crate) fn decode_subject(encoded: &str) -> TermResult<RdfSubject> {
    match decode_object(encoded)? {
        RdfObject::NamedNode(n) => Ok(RdfSubject::NamedNode(n)),
        RdfObject::BlankNode(b) => Ok(RdfSubject::BlankNode(b)),
        RdfObject::Literal(_) => Err(TermError::Unsupported(format!(
            "literal in subject position: {encoded}"
        ))),
    }
}

pub(crate) fn decode_predicate(encoded: &str) -> TermResult<RdfPredicate> {
    match encoded.strip_prefix("U:") {
        Some(iri) => RdfPredicate::new(iri),
        None => Err(TermError::InvalidIri(encoded.to_string())),
    }
}

pub(crate) fn decode_object(encoded: &str) -> TermResult<RdfObject> {
    let (tag, body) = encoded
        .split_once(':')
        .ok_or_else(|| TermError::Unsupported(encoded.to_string()))?;
    match tag {
        "U" => Ok(NamedNode::new(body)?.into()),
        "B" => Ok(BlankNode::with_id(body)?.into()),
        "L" => {
            let mut parts = body.splitn(3, '|');
            let (Some(lang), Some(datatype), Some(lexical)) =
                (parts.next(), parts.next(), parts.next())
            else {
                return Err(TermError::InvalidLiteral(encoded.to_string()));
            };
            Ok(literal(lexical, lang, datatype)?.into())
        }
        _ => Err(TermError::Unsupported(encoded.to_string())),
    }
}

/// Rebuild a literal from its stored parts; empty `lang` means not language-tagged
pub(crate) fn literal(lexical: &str, lang: &str, datatype: &str) -> TermResult<Literal> {
    if !lang.is_empty() {
        Literal::new_language_tagged_literal(lexical, lang)
    } else if datatype.is_empty() || datatype == xsd::STRING.as_str() {
        Ok(Literal::new_simple_literal(lexical))
    } else {
        Ok(Literal::new_typed_literal(lexical, NamedNode::new(datatype)?))
    }
}
