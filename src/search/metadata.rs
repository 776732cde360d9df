//! Search over namespaced metadata records
//!
//! Metadata queries use a small clause grammar: `*` matches everything,
//! otherwise `;`-separated clauses of `field:value` AND together. A value
//! containing commas becomes a multi-value terms match; anything else is a
//! phrase match. Callers that already hold a structured query body can issue
//! it verbatim.

use serde_json::Value;
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::models::MetadataRecord;
use crate::search::backend::{ElasticClient, RawSearchResponse};
use crate::search::error::SearchResult;
use crate::search::query::{FilterExpr, MatchOperator, QueryExpr, SearchRequest, ALL_FIELD};

/// A metadata query: informal text or a pre-built body.
#[derive(Debug, Clone)]
pub enum MetadataQuery {
    /// Clause grammar, parsed by [`metadata_inner_query`]
    Raw(String),
    /// Structured request body, issued verbatim
    Structured(Value),
}

/// Parse the clause grammar into a query expression.
pub fn metadata_inner_query(raw: &str) -> QueryExpr {
    if raw == "*" {
        return QueryExpr::QueryString {
            query: "*".to_string(),
        };
    }

    let filters: Vec<FilterExpr> = raw.split(';').map(clause_filter).collect();
    QueryExpr::Filtered {
        filter: FilterExpr::And(filters),
        query: None,
    }
}

/// One `field:value` clause. No colon means the catch-all field; a value
/// with commas becomes a terms match, otherwise an AND phrase match.
pub(crate) fn clause_filter(clause: &str) -> FilterExpr {
    let (field, value) = match clause.split_once(':') {
        Some((field, value)) => (field, value),
        None => (ALL_FIELD, clause),
    };

    if value.contains(',') {
        FilterExpr::Terms {
            field: field.to_string(),
            values: value.split(',').map(String::from).collect(),
        }
    } else {
        FilterExpr::Query(Box::new(QueryExpr::Match {
            field: field.to_string(),
            query: value.to_string(),
            operator: Some(MatchOperator::And),
            phrase: true,
        }))
    }
}

/// Queries and writes for metadata records.
pub struct MetadataSearchService {
    client: Arc<ElasticClient>,
    index: String,
}

impl MetadataSearchService {
    pub fn new(client: Arc<ElasticClient>, config: &SearchConfig) -> Self {
        Self {
            client,
            index: config.metadata_index.clone(),
        }
    }

    /// Upsert a record into its namespace partition.
    pub async fn update_metadata(&self, record: &MetadataRecord) -> SearchResult<()> {
        let doc = record.to_document();
        self.client
            .update(&self.index, &record.namespace, &record.id, &doc)
            .await
    }

    /// Remove a record. Missing records are already-satisfied.
    pub async fn delete_metadata(&self, record: &MetadataRecord) -> SearchResult<()> {
        self.client
            .delete(&self.index, &record.namespace, &record.id)
            .await
    }

    /// Search a namespace with either grammar text or a verbatim body.
    pub async fn search(
        &self,
        query: MetadataQuery,
        namespace: &str,
        start: u64,
        size: u64,
    ) -> SearchResult<RawSearchResponse> {
        match query {
            MetadataQuery::Structured(body) => {
                self.client
                    .search_body(&body, &self.index, Some(namespace))
                    .await
            }
            MetadataQuery::Raw(text) => {
                let request = SearchRequest {
                    query: metadata_inner_query(&text),
                    from: Some(start),
                    size: Some(size),
                    sort: None,
                };
                self.client
                    .search(&request, &self.index, Some(namespace))
                    .await
            }
        }
    }
}
