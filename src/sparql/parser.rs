//! Query kind detection using the spargebra grammar

use crate::error::{StoreError, StoreResult};
use spargebra::{Query, Update};

/// The form of a SPARQL request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Select,
    Ask,
    Construct,
    Describe,
    Update,
}

impl QueryKind {
    /// Parse `text` and report its form.
    ///
    /// Text that is neither a query nor an update is `InvalidQuery`, carrying
    /// the query grammar's error.
    pub fn detect(text: &str) -> StoreResult<Self> {
        match Query::parse(text, None) {
            Ok(Query::Select { .. }) => Ok(QueryKind::Select),
            Ok(Query::Ask { .. }) => Ok(QueryKind::Ask),
            Ok(Query::Construct { .. }) => Ok(QueryKind::Construct),
            Ok(Query::Describe { .. }) => Ok(QueryKind::Describe),
            Err(query_error) => match Update::parse(text, None) {
                Ok(_) => Ok(QueryKind::Update),
                Err(_) => Err(StoreError::InvalidQuery(query_error.to_string())),
            },
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, QueryKind::Update)
    }
}
