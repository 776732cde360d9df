//! Main search entry point
//!
//! Ties the read path together: parse the raw query, reconcile per-type
//! counts, execute the search, and shape the hits.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::config::SearchConfig;
use crate::models::NodeStore;
use crate::search::backend::ElasticClient;
use crate::search::counts::{count_by_type, TypeCounts};
use crate::search::document::SearchDocument;
use crate::search::error::SearchResult;
use crate::search::query::ParsedQuery;
use crate::search::results::{format_results, FormattedResult};

/// The full search response.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    /// Formatted rows, in backend ranking order
    pub results: Vec<FormattedResult>,

    /// Cumulative tag frequency map over the returned hits
    pub tags: HashMap<String, u64>,

    /// Per-type counts plus the reconciled total
    pub counts: TypeCounts,
}

/// Read-path orchestrator.
pub struct SearchService {
    client: Arc<ElasticClient>,
    nodes: Arc<dyn NodeStore>,
    index: String,
}

impl SearchService {
    pub fn new(
        client: Arc<ElasticClient>,
        nodes: Arc<dyn NodeStore>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            client,
            nodes,
            index: config.index.clone(),
        }
    }

    /// Run a raw query and return formatted results, tags and counts.
    ///
    /// A disabled backend yields an empty response; backend errors for
    /// well-formed requests propagate to the caller.
    pub async fn search(
        &self,
        raw_query: &str,
        start: u64,
        size: u64,
    ) -> SearchResult<SearchResults> {
        let parsed = ParsedQuery::parse(raw_query);

        let counts = count_by_type(&self.client, &parsed, &self.index).await?;

        let request = parsed.search_request(start, size);
        let response = self.client.search(&request, &self.index, None).await?;

        let documents: Vec<SearchDocument> = response
            .sources()
            .into_iter()
            .filter_map(|source| match serde_json::from_value(source) {
                Ok(document) => Some(document),
                Err(err) => {
                    warn!(error = %err, "skipping hit with unrecognized document shape");
                    None
                }
            })
            .collect();

        let (results, tags) = format_results(self.nodes.as_ref(), documents).await;

        Ok(SearchResults {
            results,
            tags,
            counts,
        })
    }
}
