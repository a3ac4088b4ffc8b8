use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const RESOURCE_NAME_KEY: &str = "resourceName";
const PAGE_COUNT_KEY: &str = "xmpTPg:NPages";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Document metadata keyed by namespaced names such as `pdf:PDFVersion`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetadataValue>);

impl Metadata {
    /// Decodes extractor JSON: either one object, or an array whose first
    /// object describes the container document.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let object = match value {
            serde_json::Value::Array(items) => items.into_iter().next().ok_or_else(|| {
                <serde_json::Error as serde::de::Error>::custom("empty metadata array")
            })?,
            other => other,
        };
        serde_json::from_value(object)
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(MetadataValue::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetadataValue) {
        self.0.insert(key.into(), value);
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.get_str(RESOURCE_NAME_KEY)
    }

    pub fn set_resource_name(&mut self, name: impl Into<String>) {
        self.insert(RESOURCE_NAME_KEY, MetadataValue::Text(name.into()));
    }

    pub fn page_count(&self) -> Option<u32> {
        self.get_str(PAGE_COUNT_KEY)?.trim().parse().ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.0.iter()
    }
}
