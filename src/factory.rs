//! Builds graph stores from configuration
//!
//! The `type` key selects the backend; every other key is handed to the
//! backend as a connection parameter.

use crate::config::{self, ConfigMap};
use crate::error::StoreResult;
use crate::store::{ConnectionParams, GraphStore};
use std::io::BufRead;
use std::path::Path;

/// Graph store factory
pub struct StoreFactory;

impl StoreFactory {
    /// Build a store from flat parameters
    pub fn build(params: &ConfigMap) -> StoreResult<GraphStore> {
        config::log_params(params);
        let params = ConnectionParams::from_config(params)?;
        GraphStore::open(params)
    }

    /// Build a store from a configuration document with overrides merged on top
    pub fn from_config<I, K, V>(document: impl BufRead, overrides: I) -> StoreResult<GraphStore>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let base = config::parse_config(document)?;
        Self::build(&config::merge_overrides(base, overrides))
    }

    /// Build a store from an optional configuration file with overrides
    /// merged on top; without a file the overrides are the whole configuration
    pub fn from_config_file<I, K, V>(path: Option<&Path>, overrides: I) -> StoreResult<GraphStore>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let base = match path {
            Some(path) => config::parse_config_file(path)?,
            None => ConfigMap::new(),
        };
        Self::build(&config::merge_overrides(base, overrides))
    }
}
