//! Cache key builder: `trigger:<profileId>[:<segment>][:<filterHash>]`.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

const PREFIX: &str = "trigger";
const HASH_HEX_CHARS: usize = 16;

/// The key separator and the glob wildcards.
const RESERVED: [char; 3] = [':', '*', '?'];

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CacheKeyError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} cannot contain '{reserved}'")]
    ReservedChar { field: &'static str, reserved: char },
}

/// Checks that a profile id or segment can be embedded in a key as-is.
pub fn validate_component(field: &'static str, value: &str) -> Result<(), CacheKeyError> {
    if value.trim().is_empty() {
        return Err(CacheKeyError::Empty { field });
    }
    match value.chars().find(|c| RESERVED.contains(c)) {
        Some(reserved) => Err(CacheKeyError::ReservedChar { field, reserved }),
        None => Ok(()),
    }
}

/// A rendered trigger cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn builder(profile_id: impl Into<String>) -> CacheKeyBuilder {
        CacheKeyBuilder {
            profile_id: profile_id.into(),
            segment: None,
            filter: None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Literal prefix shared by every segmented or filtered key for one
    /// profile. The bare `trigger:<profileId>` key does not carry it.
    pub fn profile_prefix(profile_id: &str) -> Result<String, CacheKeyError> {
        validate_component("profile_id", profile_id)?;
        Ok(format!("{}:{}:", PREFIX, profile_id))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub struct CacheKeyBuilder {
    profile_id: String,
    segment: Option<String>,
    filter: Option<Value>,
}

impl CacheKeyBuilder {
    pub fn segment(mut self, segment: Option<&str>) -> Self {
        self.segment = segment.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    /// Adds a filter hash. Filters that serialize to `null`, `{}` or an
    /// object of only nulls and empties add nothing.
    pub fn filter<F: Serialize>(mut self, filter: &F) -> Self {
        self.filter = serde_json::to_value(filter).ok().map(prune).filter(|v| !v.is_null());
        self
    }

    pub fn build(self) -> Result<CacheKey, CacheKeyError> {
        validate_component("profile_id", &self.profile_id)?;
        let mut key = format!("{}:{}", PREFIX, self.profile_id);
        if let Some(segment) = &self.segment {
            validate_component("segment", segment)?;
            key.push(':');
            key.push_str(segment);
        }
        if let Some(filter) = &self.filter {
            key.push(':');
            key.push_str(&filter_hash(filter));
        }
        Ok(CacheKey(key))
    }
}

/// Drops nulls and empty containers so equivalent filters hash the same.
fn prune(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let pruned: serde_json::Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, prune(v)))
                .filter(|(_, v)| !is_empty(v))
                .collect();
            if pruned.is_empty() {
                Value::Null
            } else {
                Value::Object(pruned)
            }
        }
        Value::Array(items) if items.is_empty() => Value::Null,
        other => other,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// First 16 hex chars of SHA-256 over key-sorted JSON.
fn filter_hash(filter: &Value) -> String {
    let canonical = canonical_json(filter);
    let digest = Sha256::digest(canonical.as_bytes());
    digest
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
        .chars()
        .take(HASH_HEX_CHARS)
        .collect()
}

fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| format!("{}:{}", Value::String(k.clone()), canonical_json(&map[k])))
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        other => other.to_string(),
    }
}
