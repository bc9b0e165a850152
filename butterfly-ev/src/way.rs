//! Read-only view of one OSM way's tags

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An OSM way as seen by tag parsers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderWay {
    pub id: i64,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

impl ReaderWay {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_tags<I, K, V>(id: i64, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id,
            tags: tags
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    /// True if `key` carries exactly `value`
    pub fn has_tag(&self, key: &str, value: &str) -> bool {
        self.tag(key) == Some(value)
    }

    /// True if `key` carries any of `values`
    pub fn has_tag_in(&self, key: &str, values: &[&str]) -> bool {
        self.tag(key).is_some_and(|v| values.contains(&v))
    }

    /// Value of the first key in `keys` that is present
    pub fn first_value<'a, S: AsRef<str>>(&'a self, keys: &[S]) -> Option<(&'a str, &'a str)> {
        keys.iter().find_map(|k| {
            self.tags
                .get_key_value(k.as_ref())
                .map(|(k, v)| (k.as_str(), v.as_str()))
        })
    }

    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }
}
