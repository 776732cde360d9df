//! Per-type document counts and the derived total

use serde::Serialize;
use std::collections::HashMap;
use strum::IntoEnumIterator;

use crate::search::backend::ElasticClient;
use crate::search::error::SearchResult;
use crate::search::query::{DocType, ParsedQuery};

/// Document counts keyed by pluralized type name, plus the derived total.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeCounts {
    /// `projects`, `components`, `users`, `registrations`
    #[serde(flatten)]
    pub counts: HashMap<String, u64>,

    /// The headline count shown next to the results
    pub total: u64,
}

/// Count matching documents per known type and reconcile the total.
///
/// Each type gets its own count-only query (same filter tree, type filter
/// substituted, no pagination). Runs before formatting so every response
/// carries both the per-type and the aggregate counts.
pub async fn count_by_type(
    client: &ElasticClient,
    parsed: &ParsedQuery,
    index: &str,
) -> SearchResult<TypeCounts> {
    let mut counts = HashMap::new();
    for doc_type in DocType::iter() {
        let request = parsed.count_request(doc_type);
        let type_name = doc_type.to_string();
        let count = client.count(&request, index, Some(&type_name)).await?;
        counts.insert(doc_type.plural(), count);
    }

    let total = resolve_total(parsed.doc_type, &counts);
    Ok(TypeCounts { counts, total })
}

/// The total is the explicitly named type's count when the query named one,
/// else the sum of all per-type counts.
pub fn resolve_total(explicit: Option<DocType>, counts: &HashMap<String, u64>) -> u64 {
    match explicit {
        Some(doc_type) => counts.get(&doc_type.plural()).copied().unwrap_or(0),
        None => counts.values().sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_counts() -> HashMap<String, u64> {
        HashMap::from([
            ("projects".to_string(), 3),
            ("users".to_string(), 2),
            ("components".to_string(), 5),
            ("registrations".to_string(), 0),
        ])
    }

    #[test]
    fn test_total_sums_without_explicit_type() {
        assert_eq!(resolve_total(None, &sample_counts()), 10);
    }

    #[test]
    fn test_total_uses_named_type() {
        assert_eq!(resolve_total(Some(DocType::Project), &sample_counts()), 3);
        assert_eq!(resolve_total(Some(DocType::Component), &sample_counts()), 5);
    }

    #[test]
    fn test_counts_serialize_flattened() {
        let counts = TypeCounts {
            counts: HashMap::from([("projects".to_string(), 3)]),
            total: 3,
        };
        let value = serde_json::to_value(&counts).unwrap();
        assert_eq!(value["projects"], 3);
        assert_eq!(value["total"], 3);
    }

    #[tokio::test]
    async fn test_disabled_client_counts_to_zero() {
        let client = ElasticClient::disabled();
        let parsed = ParsedQuery::parse("project:climate");
        let counts = count_by_type(&client, &parsed, "hub").await.unwrap();
        assert_eq!(counts.total, 0);
        assert_eq!(counts.counts.len(), 4);
    }
}
