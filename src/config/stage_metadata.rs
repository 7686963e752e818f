// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::StageError;

/// Open key-value bag attached to a stage spec.
///
/// Keys are defined entirely by the adapter that resolves the spec. The typed
/// accessors tolerate absent keys; the `require_*` accessors turn an absent or
/// mistyped key into a [`StageError`] for constructors to return.
///
/// # Example
/// ```
/// use the_conveyor::config::StageMetadata;
/// use serde_json::json;
///
/// let metadata = StageMetadata::from_iter([
///     ("path".to_string(), json!("/tmp/out.jsonl")),
///     ("repeat".to_string(), json!(true)),
/// ]);
///
/// assert_eq!(metadata.str("path"), Some("/tmp/out.jsonl"));
/// assert!(metadata.bool("repeat"));
/// assert_eq!(metadata.u64("buffer"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageMetadata(pub HashMap<String, Value>);

impl StageMetadata {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.str(key).unwrap_or(default)
    }

    /// Absent or non-boolean values read as `false`.
    pub fn bool(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    pub fn u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    /// A list of strings, or a single comma-separated string.
    pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
        match self.0.get(key)? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            ),
            Value::String(joined) => Some(
                joined
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn require(&self, key: &str) -> Result<&Value, StageError> {
        self.0.get(key).ok_or_else(|| StageError::MissingMetadata {
            key: key.to_string(),
        })
    }

    pub fn require_str(&self, key: &str) -> Result<&str, StageError> {
        let value = self.require(key)?;
        value.as_str().ok_or_else(|| StageError::InvalidMetadata {
            key: key.to_string(),
            reason: format!("expected a string, found {}", value),
        })
    }

    /// Like [`u64`](Self::u64) but rejects a present value that is not an unsigned integer.
    pub fn u64_or(&self, key: &str, default: u64) -> Result<u64, StageError> {
        match self.0.get(key) {
            None => Ok(default),
            Some(value) => value.as_u64().ok_or_else(|| StageError::InvalidMetadata {
                key: key.to_string(),
                reason: format!("expected an unsigned integer, found {}", value),
            }),
        }
    }
}

impl FromIterator<(String, Value)> for StageMetadata {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
