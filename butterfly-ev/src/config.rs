//! Import configuration loaded from TOML
//!
//! ```toml
//! encoded_values = "car_access, moped_access, road_class"
//!
//! [properties]
//! block_fords = true
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use butterfly_common::{Error, Result};

/// String-keyed properties handed to encoded value and parser factories
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PMap(BTreeMap<String, String>);

/// Any scalar TOML value, kept as its string form
#[derive(Deserialize)]
#[serde(untagged)]
enum PValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for PValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PValue::Bool(v) => write!(f, "{v}"),
            PValue::Int(v) => write!(f, "{v}"),
            PValue::Float(v) => write!(f, "{v}"),
            PValue::Str(v) => f.write_str(v),
        }
    }
}

impl<'de> Deserialize<'de> for PMap {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = BTreeMap::<String, PValue>::deserialize(deserializer)?;
        Ok(PMap(
            map.into_iter().map(|(k, v)| (k, v.to_string())).collect(),
        ))
    }
}

impl PMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get_str(key) {
            None => Ok(default),
            Some(v) => v.trim().parse().map_err(|_| {
                Error::Config(format!("property '{key}' must be true or false, got '{v}'"))
            }),
        }
    }

    pub fn get_f64(&self, key: &str, default: f64) -> Result<f64> {
        match self.get_str(key) {
            None => Ok(default),
            Some(v) => v.trim().parse().map_err(|_| {
                Error::Config(format!("property '{key}' must be a number, got '{v}'"))
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Which attributes to import and with what properties
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    #[serde(deserialize_with = "key_list")]
    pub encoded_values: Vec<String>,
    #[serde(default)]
    pub properties: PMap,
}

/// Accepts `"a, b"` as well as `["a", "b"]`
fn key_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Keys {
        Joined(String),
        List(Vec<String>),
    }

    let raw = match Keys::deserialize(deserializer)? {
        Keys::Joined(s) => s.split(',').map(str::to_string).collect(),
        Keys::List(v) => v,
    };
    Ok(raw
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect())
}

impl ImportConfig {
    pub fn new<I, S>(encoded_values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            encoded_values: encoded_values.into_iter().map(Into::into).collect(),
            properties: PMap::new(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            encoded_values = ?config.encoded_values,
            "loaded import config"
        );
        Ok(config)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.encoded_values.iter().map(String::as_str)
    }
}
