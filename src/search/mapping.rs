//! Backend mapping lookup and field-type translation

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::search::backend::ElasticClient;
use crate::search::error::SearchResult;

/// Native semantic type of a backend mapping field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Object,
    Integer,
    Float,
    Null,
    Text,
}

impl FieldType {
    /// Translate a backend type string; unknown strings yield `None`.
    pub fn from_backend(type_name: &str) -> Option<Self> {
        match type_name {
            "boolean" => Some(FieldType::Bool),
            "object" => Some(FieldType::Object),
            "long" | "int" => Some(FieldType::Integer),
            "float" | "double" => Some(FieldType::Float),
            "null" => Some(FieldType::Null),
            "string" => Some(FieldType::Text),
            _ => None,
        }
    }
}

/// One field in a translated mapping: a leaf type or nested fields.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingField {
    Leaf(Option<FieldType>),
    Nested(IndexMapping),
}

/// Field name -> translated type.
pub type IndexMapping = HashMap<String, MappingField>;

/// Fetch and translate the mapping of an index partition.
///
/// Walks the backend payload down to the property map; a missing mapping or
/// an unknown payload structure yields `None` rather than an error.
pub async fn get_mapping(
    client: &ElasticClient,
    index: &str,
    doc_type: &str,
) -> SearchResult<Option<IndexMapping>> {
    let Some(payload) = client.get_mapping(index, doc_type).await? else {
        return Ok(None);
    };

    let properties = payload
        .get(index)
        .and_then(|value| value.get("mappings"))
        .and_then(|value| value.get(doc_type))
        .and_then(|value| value.get("properties"))
        .and_then(Value::as_object);

    Ok(properties.map(translate_properties))
}

fn translate_properties(properties: &Map<String, Value>) -> IndexMapping {
    properties
        .iter()
        .map(|(name, value)| (name.clone(), translate_field(value)))
        .collect()
}

fn translate_field(value: &Value) -> MappingField {
    match value.get("type").and_then(Value::as_str) {
        Some(type_name) => MappingField::Leaf(FieldType::from_backend(type_name)),
        None => MappingField::Nested(
            value
                .as_object()
                .map(translate_properties)
                .unwrap_or_default(),
        ),
    }
}
