//! Recency-sorted project listing

use serde::Serialize;
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::search::backend::ElasticClient;
use crate::search::document::NodeDocument;
use crate::search::error::SearchResult;
use crate::search::metadata::clause_filter;
use crate::search::query::{FilterExpr, QueryExpr, SearchRequest, SortOrder, ALL_FIELD};

/// Build the recency-sorted request for a light filter query.
///
/// Empty text matches everything; text without a colon is a single catch-all
/// match; otherwise the metadata clause grammar applies, AND-combined.
pub fn recent_documents_request(raw_query: &str, start: u64, size: u64) -> SearchRequest {
    let query = if raw_query.is_empty() {
        QueryExpr::MatchAll
    } else if !raw_query.contains(':') {
        QueryExpr::Match {
            field: ALL_FIELD.to_string(),
            query: raw_query.to_string(),
            operator: None,
            phrase: false,
        }
    } else {
        let filters: Vec<FilterExpr> = raw_query.split(';').map(clause_filter).collect();
        QueryExpr::Filtered {
            filter: FilterExpr::And(filters),
            query: None,
        }
    };

    SearchRequest {
        query,
        from: Some(start),
        size: Some(size),
        sort: Some(("date_created".to_string(), SortOrder::Desc)),
    }
}

/// The recent-documents response: raw node documents plus the total count.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecentDocuments {
    pub results: Vec<NodeDocument>,
    pub count: u64,
}

/// Lists the most recently created projects.
pub struct RecentDocumentsService {
    client: Arc<ElasticClient>,
    index: String,
}

impl RecentDocumentsService {
    pub fn new(client: Arc<ElasticClient>, config: &SearchConfig) -> Self {
        Self {
            client,
            index: config.index.clone(),
        }
    }

    pub async fn recent(
        &self,
        raw_query: &str,
        start: u64,
        size: u64,
    ) -> SearchResult<RecentDocuments> {
        let request = recent_documents_request(raw_query, start, size);
        let response = self
            .client
            .search(&request, &self.index, Some("project"))
            .await?;

        let count = response.hits.total;
        let results = response
            .sources()
            .into_iter()
            .filter_map(|source| serde_json::from_value(source).ok())
            .collect();

        Ok(RecentDocuments { results, count })
    }
}
