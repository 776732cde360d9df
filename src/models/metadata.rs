//! Free-form metadata records and their ordered data container.
//!
//! Metadata records are schema-less documents owned by an application addon;
//! each addon partitions its records under a namespace. The record's payload
//! is a [`MetadataMap`]: an explicit, insertion-ordered key-value container
//! with a defined merge operation, rather than a polymorphic map-like object.

use serde::{Deserialize, Serialize};
use serde_json::map::Entry;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Insertion-ordered key-value container backing a metadata record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataMap(Map<String, Value>);

impl MetadataMap {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON object; returns `None` for any other value kind.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The underlying object, for serialization into an index document.
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Merge an incoming update into this container.
    ///
    /// Per key: an absent or falsy existing value is replaced; two objects
    /// merge recursively; two arrays union, preserving order and skipping
    /// elements already present; anything else is overwritten by the
    /// incoming value.
    pub fn merge(&mut self, incoming: &MetadataMap) {
        merge_maps(&mut self.0, &incoming.0);
    }
}

impl FromIterator<(String, Value)> for MetadataMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn merge_maps(existing: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (key, val) in incoming {
        match existing.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(val.clone());
            }
            Entry::Occupied(mut slot) => merge_value(slot.get_mut(), val),
        }
    }
}

fn merge_value(current: &mut Value, incoming: &Value) {
    if is_falsy(current) {
        *current = incoming.clone();
        return;
    }
    match (current, incoming) {
        (Value::Object(current), Value::Object(update)) => merge_maps(current, update),
        (Value::Array(current), Value::Array(update)) => {
            for item in update {
                if !current.contains(item) {
                    current.push(item.clone());
                }
            }
        }
        (current, _) => *current = incoming.clone(),
    }
}

/// Empty-ish values never win over an incoming update.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// A namespaced metadata record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Unique identifier
    pub id: String,

    /// Partition key of the owning addon
    pub namespace: String,

    /// The record payload
    pub data: MetadataMap,
}

impl MetadataRecord {
    /// Create an empty record under the given namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            namespace: namespace.into(),
            data: MetadataMap::new(),
        }
    }

    /// Merge an incoming update into the record payload.
    pub fn update(&mut self, incoming: &MetadataMap) {
        self.data.merge(incoming);
    }

    /// The document shape written to the search index: payload plus id.
    pub fn to_document(&self) -> Value {
        let mut doc = self.data.as_object().clone();
        doc.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> MetadataMap {
        MetadataMap::from_value(value).expect("object")
    }

    #[test]
    fn test_merge_unions_lists_and_recurses() {
        let mut base = map(json!({"a": [1, 2], "b": {"x": 1}}));
        let update = map(json!({"a": [2, 3], "b": {"y": 2}, "c": 5}));

        base.merge(&update);

        assert_eq!(base.get("a"), Some(&json!([1, 2, 3])));
        assert_eq!(base.get("b"), Some(&json!({"x": 1, "y": 2})));
        assert_eq!(base.get("c"), Some(&json!(5)));
    }

    #[test]
    fn test_merge_scalar_overwrites() {
        let mut base = map(json!({"title": "old", "count": 3}));
        base.merge(&map(json!({"title": "new", "count": 4})));

        assert_eq!(base.get("title"), Some(&json!("new")));
        assert_eq!(base.get("count"), Some(&json!(4)));
    }

    #[test]
    fn test_merge_replaces_falsy_values() {
        let mut base = map(json!({"empty": "", "zero": 0, "none": null, "list": []}));
        base.merge(&map(json!({
            "empty": "filled",
            "zero": 7,
            "none": {"k": 1},
            "list": [1]
        })));

        assert_eq!(base.get("empty"), Some(&json!("filled")));
        assert_eq!(base.get("zero"), Some(&json!(7)));
        assert_eq!(base.get("none"), Some(&json!({"k": 1})));
        assert_eq!(base.get("list"), Some(&json!([1])));
    }

    #[test]
    fn test_merge_object_over_non_object_overwrites() {
        let mut base = map(json!({"k": "scalar"}));
        base.merge(&map(json!({"k": {"nested": true}})));
        assert_eq!(base.get("k"), Some(&json!({"nested": true})));
    }

    #[test]
    fn test_merge_preserves_insertion_order() {
        let mut base = map(json!({"first": 1}));
        base.merge(&map(json!({"second": 2, "third": 3})));

        let keys: Vec<&String> = base.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_record_document_carries_id() {
        let mut record = MetadataRecord::new("app-ns");
        record.data.insert("field", json!("value"));

        let doc = record.to_document();
        assert_eq!(doc["field"], json!("value"));
        assert_eq!(doc["id"], json!(record.id));
    }
}
