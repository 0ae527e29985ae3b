//! Store configuration documents
//!
//! A configuration document is a single `Model` element holding `Param`
//! elements; each param's `name` attribute is the key and its text the
//! value:
//!
//! ```xml
//! <Model>
//!   <Param name="type">sdb</Param>
//!   <Param name="dbUrl">jdbc:sqlite:/var/lib/harvest/vivo.db</Param>
//!   <Param name="modelName">http://vivo.example.edu/harvested-data</Param>
//! </Model>
//! ```
//!
//! Parsing produces a flat [`ConfigMap`]; caller overrides are merged on
//! top of it before a store is built.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Flat key → value configuration
pub type ConfigMap = BTreeMap<String, String>;

/// Backend selector, required
pub const KEY_TYPE: &str = "type";
/// Named graph addressed by the store
pub const KEY_MODEL_NAME: &str = "modelName";
/// Database location
pub const KEY_DB_URL: &str = "dbUrl";
/// Database user (never logged)
pub const KEY_DB_USER: &str = "dbUser";
/// Database password (never logged)
pub const KEY_DB_PASS: &str = "dbPass";
/// Database engine dialect
pub const KEY_DB_TYPE: &str = "dbType";
/// Database driver
pub const KEY_DB_CLASS: &str = "dbClass";
/// Quad-store layout
pub const KEY_DB_LAYOUT: &str = "dbLayout";

const MODEL_ELEMENT: &str = "Model";
const PARAM_ELEMENT: &str = "Param";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No `type` key
    #[error("Must specify 'type' parameter {{'memory','rdb','sdb'}}")]
    MissingType,

    /// `type` names no known backend
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A key holds a value the backend cannot use
    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        /// Offending key
        key: String,
        /// Offending value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// An override that is not `key=value`
    #[error("override must be KEY=VALUE, got '{0}'")]
    InvalidOverride(String),

    /// An element other than `Model` or `Param`
    #[error("Unknown Tag: {0}")]
    UnknownElement(String),

    /// A `Param` element without a `name` attribute
    #[error("Param element without a 'name' attribute")]
    MissingParamName,

    /// Malformed XML
    #[error("XML error: {0}")]
    Xml(String),

    /// The document could not be read
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ConfigError {
    /// True when the document was unreadable, as opposed to a bad key
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            ConfigError::UnknownElement(_)
                | ConfigError::MissingParamName
                | ConfigError::Xml(_)
                | ConfigError::Io(_)
        )
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Parse a configuration document into its parameters
pub fn parse_config(reader: impl BufRead) -> ConfigResult<ConfigMap> {
    let mut reader = Reader::from_reader(reader);
    reader.config_mut().trim_text(true);

    let mut params = ConfigMap::new();
    let mut param_name: Option<String> = None;
    let mut value = String::new();
    let mut buf = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| ConfigError::Xml(e.to_string()))?
        {
            Event::Start(e) => {
                param_name = start_element(&e)?;
                value.clear();
            }
            Event::Empty(e) => {
                if let Some(name) = start_element(&e)? {
                    params.insert(name, String::new());
                }
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| ConfigError::Xml(e.to_string()))?;
                value.push_str(&text);
            }
            Event::CData(c) => {
                value.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name.eq_ignore_ascii_case(PARAM_ELEMENT) {
                    if let Some(key) = param_name.take() {
                        params.insert(key, std::mem::take(&mut value));
                    }
                } else if !name.eq_ignore_ascii_case(MODEL_ELEMENT) {
                    return Err(ConfigError::UnknownElement(name));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(params)
}

/// Parse a configuration file
pub fn parse_config_file(path: impl AsRef<Path>) -> ConfigResult<ConfigMap> {
    let file = std::fs::File::open(path.as_ref())?;
    parse_config(io::BufReader::new(file))
}

/// `Param` yields its name; `Model` yields nothing; anything else is an error.
fn start_element(e: &BytesStart<'_>) -> ConfigResult<Option<String>> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    if name.eq_ignore_ascii_case(PARAM_ELEMENT) {
        let attr = e
            .try_get_attribute("name")
            .map_err(|err| ConfigError::Xml(err.to_string()))?
            .ok_or(ConfigError::MissingParamName)?;
        let key = attr
            .unescape_value()
            .map_err(|err| ConfigError::Xml(err.to_string()))?;
        Ok(Some(key.into_owned()))
    } else if name.eq_ignore_ascii_case(MODEL_ELEMENT) {
        Ok(None)
    } else {
        Err(ConfigError::UnknownElement(name))
    }
}

/// Merge overrides on top of a base configuration; overrides win.
pub fn merge_overrides<I, K, V>(mut base: ConfigMap, overrides: I) -> ConfigMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    for (key, value) in overrides {
        base.insert(key.into(), value.into());
    }
    base
}

/// Split a `KEY=VALUE` override
pub fn parse_override(raw: &str) -> ConfigResult<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ConfigError::InvalidOverride(raw.to_string())),
    }
}

/// Credentials keys are matched case-insensitively and never logged
pub fn is_secret_key(key: &str) -> bool {
    key.eq_ignore_ascii_case(KEY_DB_USER) || key.eq_ignore_ascii_case(KEY_DB_PASS)
}

/// Log every parameter except credentials
pub fn log_params(params: &ConfigMap) {
    for (key, value) in params.iter().filter(|(key, _)| !is_secret_key(key)) {
        debug!("'{}' - '{}'", key, value);
    }
}
