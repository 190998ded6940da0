//! Flat string-keyed configuration properties.
//!
//! Every positioner exposes its configuration as a [`PropertyMap`] so the
//! caller can persist a chosen layout (e.g. as part of a view's serialized
//! state) without coupling to a concrete strategy type. Keys are
//! strategy-specific and opaque to this crate.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap {
    entries: IndexMap<String, Value>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

pub fn expect_f64(key: &str, value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| Error::InvalidProperty {
        key: key.to_string(),
        message: format!("expected a number, got {value}"),
    })
}

pub fn expect_usize(key: &str, value: &Value) -> Result<usize> {
    value
        .as_u64()
        .map(|v| v as usize)
        .ok_or_else(|| Error::InvalidProperty {
            key: key.to_string(),
            message: format!("expected a non-negative integer, got {value}"),
        })
}

pub fn expect_u64(key: &str, value: &Value) -> Result<u64> {
    value.as_u64().ok_or_else(|| Error::InvalidProperty {
        key: key.to_string(),
        message: format!("expected a non-negative integer, got {value}"),
    })
}

pub fn expect_str<'a>(key: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| Error::InvalidProperty {
        key: key.to_string(),
        message: format!("expected a string, got {value}"),
    })
}
