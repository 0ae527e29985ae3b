//! Relational backend: one generic statement table shared by every model
//!
//! Each row is a statement tagged with its model name; terms are stored in
//! their encoded text form.

use super::backend::BackendAdapter;
use super::params::ConnectionParams;
use super::{sql, Dataset};
use crate::error::{StoreError, StoreResult};
use crate::rdf::{NamedNode, RdfSubject, Triple};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS rdf_statements (
        model     TEXT NOT NULL,
        subject   TEXT NOT NULL,
        predicate TEXT NOT NULL,
        object    TEXT NOT NULL,
        PRIMARY KEY (model, subject, predicate, object)
    );
    CREATE INDEX IF NOT EXISTS idx_rdf_statements_object ON rdf_statements (model, object);
";

pub(crate) struct RelationalBackend {
    conn: Connection,
    model: String,
}

impl RelationalBackend {
    pub(crate) fn open(params: &ConnectionParams) -> StoreResult<Self> {
        let conn = sql::connect(params)?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::connection_caused("cannot initialize statement table", e))?;
        debug!("relational graph '{}' ready", params.model_name());
        Ok(Self {
            conn,
            model: params.model_name().to_string(),
        })
    }

    pub(crate) fn close(self) -> StoreResult<()> {
        sql::close(self.conn)
    }
}

fn decode_row(subject: &str, predicate: &str, object: &str) -> StoreResult<Triple> {
    Ok(Triple::new(
        sql::decode_subject(subject)?,
        sql::decode_predicate(predicate)?,
        sql::decode_object(object)?,
    ))
}

impl BackendAdapter for RelationalBackend {
    fn insert(&mut self, triples: &[Triple]) -> StoreResult<usize> {
        sql::in_batch(&self.conn, |conn| {
            let mut stmt = conn.prepare_cached(
                "INSERT OR IGNORE INTO rdf_statements (model, subject, predicate, object)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            let mut added = 0;
            for t in triples {
                added += stmt.execute(params![
                    self.model,
                    sql::encode_subject(&t.subject),
                    sql::encode_predicate(&t.predicate),
                    sql::encode_object(&t.object),
                ])?;
            }
            Ok(added)
        })
    }

    fn remove(&mut self, triples: &[Triple]) -> StoreResult<usize> {
        sql::in_batch(&self.conn, |conn| {
            let mut stmt = conn.prepare_cached(
                "DELETE FROM rdf_statements
                 WHERE model = ?1 AND subject = ?2 AND predicate = ?3 AND object = ?4",
            )?;
            let mut removed = 0;
            for t in triples {
                removed += stmt.execute(params![
                    self.model,
                    sql::encode_subject(&t.subject),
                    sql::encode_predicate(&t.predicate),
                    sql::encode_object(&t.object),
                ])?;
            }
            Ok(removed)
        })
    }

    fn contains(&self, triple: &Triple) -> StoreResult<bool> {
        let found = self
            .conn
            .prepare_cached(
                "SELECT 1 FROM rdf_statements
                 WHERE model = ?1 AND subject = ?2 AND predicate = ?3 AND object = ?4",
            )?
            .query_row(
                params![
                    self.model,
                    sql::encode_subject(&triple.subject),
                    sql::encode_predicate(&triple.predicate),
                    sql::encode_object(&triple.object),
                ],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn contains_subject(&self, subject: &NamedNode) -> StoreResult<bool> {
        let encoded = sql::encode_subject(&RdfSubject::NamedNode(subject.clone()));
        let found = self
            .conn
            .prepare_cached("SELECT 1 FROM rdf_statements WHERE model = ?1 AND subject = ?2 LIMIT 1")?
            .query_row(params![self.model, encoded], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn statements(&self) -> StoreResult<Vec<Triple>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT subject, predicate, object FROM rdf_statements WHERE model = ?1",
        )?;
        let mut rows = stmt.query(params![self.model])?;
        let mut triples = Vec::new();
        while let Some(row) = rows.next()? {
            let subject: String = row.get(0)?;
            let predicate: String = row.get(1)?;
            let object: String = row.get(2)?;
            triples.push(decode_row(&subject, &predicate, &object)?);
        }
        Ok(triples)
    }

    fn len(&self) -> StoreResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM rdf_statements WHERE model = ?1",
            params![self.model],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn truncate(&mut self) -> StoreResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM rdf_statements WHERE model = ?1", params![self.model])?;
        debug!("truncated relational graph '{}' ({} statements)", self.model, removed);
        Ok(())
    }

    fn dataset(&self) -> StoreResult<Dataset> {
        warn!("materializing every model of the relational store; this reads the whole database");
        let mut stmt = self
            .conn
            .prepare("SELECT model, subject, predicate, object FROM rdf_statements ORDER BY model")?;
        let mut rows = stmt.query([])?;
        let mut dataset = Dataset::new();
        while let Some(row) = rows.next()? {
            let model: String = row.get(0)?;
            let subject: String = row.get(1)?;
            let predicate: String = row.get(2)?;
            let object: String = row.get(3)?;
            dataset.insert(&model, decode_row(&subject, &predicate, &object)?);
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
