//! Connection parameters
//!
//! Set once when a store is built and never mutated afterwards. A neighbor
//! clone copies everything except the model name.

use crate::config::{
    ConfigError, ConfigMap, KEY_DB_CLASS, KEY_DB_LAYOUT, KEY_DB_PASS, KEY_DB_TYPE, KEY_DB_URL,
    KEY_DB_USER, KEY_MODEL_NAME, KEY_TYPE,
};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Backend variant selected by the `type` key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Process-local, volatile
    Memory,
    /// Generic triple table in a relational database
    Relational,
    /// Purpose-built quad schema in a relational database
    QuadStore,
}

impl BackendKind {
    /// Resolve a `type` value (case-insensitive)
    pub fn from_type(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Some(BackendKind::Memory),
            "rdb" => Some(BackendKind::Relational),
            "sdb" => Some(BackendKind::QuadStore),
            _ => None,
        }
    }

    /// The `type` value naming this backend
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Relational => "rdb",
            BackendKind::QuadStore => "sdb",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to (re)establish a backend connection
pub struct ConnectionParams {
    backend: BackendKind,
    model_name: String,
    db_url: Option<String>,
    db_user: Option<SecretString>,
    db_pass: Option<SecretString>,
    db_type: Option<String>,
    db_class: Option<String>,
    layout: Option<String>,
}

impl ConnectionParams {
    /// Parameters for the given backend, everything else unset
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            model_name: String::new(),
            db_url: None,
            db_user: None,
            db_pass: None,
            db_type: None,
            db_class: None,
            layout: None,
        }
    }

    /// In-memory graph with the given name
    pub fn memory(model_name: impl Into<String>) -> Self {
        Self::new(BackendKind::Memory).with_model_name(model_name)
    }

    /// Build from a flat configuration; only `type` is mandatory
    pub fn from_config(params: &ConfigMap) -> Result<Self, ConfigError> {
        let kind = params.get(KEY_TYPE).ok_or(ConfigError::MissingType)?;
        let backend =
            BackendKind::from_type(kind).ok_or_else(|| ConfigError::UnknownType(kind.clone()))?;
        let get = |key: &str| params.get(key).cloned();

        Ok(Self {
            backend,
            model_name: get(KEY_MODEL_NAME).unwrap_or_default(),
            db_url: get(KEY_DB_URL),
            db_user: get(KEY_DB_USER).map(SecretString::from),
            db_pass: get(KEY_DB_PASS).map(SecretString::from),
            db_type: get(KEY_DB_TYPE),
            db_class: get(KEY_DB_CLASS),
            layout: get(KEY_DB_LAYOUT),
        })
    }

    /// Set the model name
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    /// Set the database URL
    pub fn with_db_url(mut self, db_url: impl Into<String>) -> Self {
        self.db_url = Some(db_url.into());
        self
    }

    /// Set the database credentials
    pub fn with_credentials(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.db_user = Some(SecretString::from(user.into()));
        self.db_pass = Some(SecretString::from(pass.into()));
        self
    }

    /// Set the database engine dialect
    pub fn with_db_type(mut self, db_type: impl Into<String>) -> Self {
        self.db_type = Some(db_type.into());
        self
    }

    /// Set the database driver
    pub fn with_db_class(mut self, db_class: impl Into<String>) -> Self {
        self.db_class = Some(db_class.into());
        self
    }

    /// Set the quad-store layout
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    /// Same connection, different named graph
    pub fn neighbor(&self, model_name: impl Into<String>) -> Self {
        self.clone().with_model_name(model_name)
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn db_url(&self) -> Option<&str> {
        self.db_url.as_deref()
    }

    pub fn db_user(&self) -> Option<&str> {
        self.db_user.as_ref().map(|s| s.expose_secret())
    }

    pub fn db_pass(&self) -> Option<&str> {
        self.db_pass.as_ref().map(|s| s.expose_secret())
    }

    pub fn db_type(&self) -> Option<&str> {
        self.db_type.as_deref()
    }

    pub fn db_class(&self) -> Option<&str> {
        self.db_class.as_deref()
    }

    pub fn layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }
}

fn copy_secret(secret: &Option<SecretString>) -> Option<SecretString> {
    secret
        .as_ref()
        .map(|s| SecretString::from(s.expose_secret().to_owned()))
}

impl Clone for ConnectionParams {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend,
            model_name: self.model_name.clone(),
            db_url: self.db_url.clone(),
            db_user: copy_secret(&self.db_user),
            db_pass: copy_secret(&self.db_pass),
            db_type: self.db_type.clone(),
            db_class: self.db_class.clone(),
            layout: self.layout.clone(),
        }
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |s: &Option<SecretString>| s.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("ConnectionParams")
            .field("backend", &self.backend)
            .field("model_name", &self.model_name)
            .field("db_url", &self.db_url)
            .field("db_user", &redacted(&self.db_user))
            .field("db_pass", &redacted(&self.db_pass))
            .field("db_type", &self.db_type)
            .field("db_class", &self.db_class)
            .field("layout", &self.layout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> ConfigMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_backend_kind_from_type() {
        assert_eq!(BackendKind::from_type("MEMORY"), Some(BackendKind::Memory));
        assert_eq!(BackendKind::from_type("mem"), Some(BackendKind::Memory));
        assert_eq!(BackendKind::from_type("Rdb"), Some(BackendKind::Relational));
        assert_eq!(BackendKind::from_type("sdb"), Some(BackendKind::QuadStore));
        assert_eq!(BackendKind::from_type("tdb"), None);
    }

    #[test]
    fn test_from_config() {
        let params = ConnectionParams::from_config(&config(&[
            ("type", "sdb"),
            ("dbUrl", "jdbc:sqlite:/tmp/x.db"),
            ("dbLayout", "layout2/hash"),
            ("modelName", "http://example.org/graph"),
        ]))
        .unwrap();
        assert_eq!(params.backend(), BackendKind::QuadStore);
        assert_eq!(params.db_url(), Some("jdbc:sqlite:/tmp/x.db"));
        assert_eq!(params.layout(), Some("layout2/hash"));
        assert_eq!(params.model_name(), "http://example.org/graph");
        assert_eq!(params.db_user(), None);
    }

    #[test]
    fn test_missing_and_unknown_type() {
        assert!(matches!(
            ConnectionParams::from_config(&config(&[("modelName", "x")])),
            Err(ConfigError::MissingType)
        ));
        assert!(matches!(
            ConnectionParams::from_config(&config(&[("type", "tdb")])),
            Err(ConfigError::UnknownType(ref t)) if t == "tdb"
        ));
    }

    #[test]
    fn test_neighbor_keeps_everything_but_name() {
        let params = ConnectionParams::new(BackendKind::Relational)
            .with_db_url("sqlite:/tmp/x.db")
            .with_credentials("vivo", "hunter2")
            .with_model_name("a");
        let neighbor = params.neighbor("b");

        assert_eq!(neighbor.model_name(), "b");
        assert_eq!(params.model_name(), "a");
        assert_eq!(neighbor.db_url(), params.db_url());
        assert_eq!(neighbor.db_pass(), Some("hunter2"));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let params = ConnectionParams::new(BackendKind::Relational).with_credentials("vivo", "hunter2");
        let shown = format!("{params:?}");
        assert!(!shown.contains("hunter2"));
        assert!(!shown.contains("vivo"));
        assert!(shown.contains("[REDACTED]"));
    }
}
