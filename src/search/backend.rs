//! Thin command interface to the search backend
//!
//! [`ElasticClient`] speaks the backend's HTTP API: search, count,
//! update-with-upsert, create-with-overwrite, delete, delete-index and
//! get-mapping. It is constructed once at process start with a health check;
//! when that check fails the handle is left **disabled** and every operation
//! becomes a logged no-op returning its empty default, so "search disabled"
//! is a steady state the application tolerates rather than an error storm.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::SearchConfig;
use crate::search::error::{SearchError, SearchResult};
use crate::search::query::SearchRequest;

/// One hit as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RawHit {
    /// The indexed document
    #[serde(rename = "_source")]
    pub source: Value,
}

/// Hit list plus the total match count.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHits {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// Wire shape of a search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub hits: RawHits,
}

impl RawSearchResponse {
    /// The hit documents, in result order.
    pub fn sources(self) -> Vec<Value> {
        self.hits.hits.into_iter().map(|hit| hit.source).collect()
    }
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Handle to the external search backend.
///
/// Constructed once via [`ElasticClient::connect`] and shared (behind `Arc`)
/// by every search service; there is no hidden global. The handle is
/// immutable after construction.
pub struct ElasticClient {
    inner: Option<ClientInner>,
}

struct ClientInner {
    http: Client,
    base_url: String,
}

impl ElasticClient {
    /// Build a client and run the startup health check.
    ///
    /// A failed check (backend down, bad URL) logs and returns a disabled
    /// handle instead of erroring; see the module docs for the degraded
    /// behavior.
    pub async fn connect(config: &SearchConfig) -> Self {
        let http = match Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
        {
            Ok(http) => http,
            Err(err) => {
                error!(error = %err, "failed to build search HTTP client; search is disabled");
                return Self { inner: None };
            }
        };

        let inner = ClientInner {
            http,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
        };

        match inner.health().await {
            Ok(()) => Self { inner: Some(inner) },
            Err(err) => {
                error!(
                    error = %err,
                    backend_url = %config.backend_url,
                    "search backend health check failed; search is disabled. Is the backend running?"
                );
                Self { inner: None }
            }
        }
    }

    /// A handle that is disabled from the start.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// The disabled guard run at the top of every operation.
    fn guard(&self, operation: &str) -> Option<&ClientInner> {
        if self.inner.is_none() {
            warn!(operation = operation, "search action skipped: backend is disabled");
        }
        self.inner.as_ref()
    }

    /// Execute a search. Disabled handles return an empty response.
    pub async fn search(
        &self,
        request: &SearchRequest,
        index: &str,
        doc_type: Option<&str>,
    ) -> SearchResult<RawSearchResponse> {
        self.search_body(&request.to_value(), index, doc_type).await
    }

    /// Execute a search with a pre-built request body, issued verbatim.
    pub async fn search_body(
        &self,
        body: &Value,
        index: &str,
        doc_type: Option<&str>,
    ) -> SearchResult<RawSearchResponse> {
        let Some(inner) = self.guard("search") else {
            return Ok(RawSearchResponse::default());
        };
        let url = inner.url(index, doc_type, Some("_search"));
        debug!(url = %url, "search request");
        let response = inner.http.post(&url).json(body).send().await?;
        read_json(response).await
    }

    /// Count matching documents. Disabled handles return 0.
    pub async fn count(
        &self,
        request: &SearchRequest,
        index: &str,
        doc_type: Option<&str>,
    ) -> SearchResult<u64> {
        let Some(inner) = self.guard("count") else {
            return Ok(0);
        };
        let url = inner.url(index, doc_type, Some("_count"));
        let response = inner.http.post(&url).json(request).send().await?;
        let counted: CountResponse = read_json(response).await?;
        Ok(counted.count)
    }

    /// Update a document, creating it from the same body when absent.
    ///
    /// A backend 404 still surfaces as [`SearchError::NotFound`] so callers
    /// can fall back to [`ElasticClient::index_doc`].
    pub async fn update(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        doc: &Value,
    ) -> SearchResult<()> {
        let Some(inner) = self.guard("update") else {
            return Ok(());
        };
        let url = inner.doc_url(index, doc_type, &format!("{}/_update", id));
        let body = serde_json::json!({"doc": doc, "upsert": doc});
        let response = inner
            .http
            .post(&url)
            .query(&[("refresh", "true")])
            .json(&body)
            .send()
            .await?;
        read_unit(response).await
    }

    /// Write a document, overwriting any existing version.
    pub async fn index_doc(
        &self,
        index: &str,
        doc_type: &str,
        id: &str,
        doc: &Value,
    ) -> SearchResult<()> {
        let Some(inner) = self.guard("index") else {
            return Ok(());
        };
        let url = inner.doc_url(index, doc_type, id);
        let response = inner
            .http
            .put(&url)
            .query(&[("refresh", "true")])
            .json(doc)
            .send()
            .await?;
        read_unit(response).await
    }

    /// Delete a document. A missing document is already-satisfied, not an error.
    pub async fn delete(&self, index: &str, doc_type: &str, id: &str) -> SearchResult<()> {
        let Some(inner) = self.guard("delete") else {
            return Ok(());
        };
        let url = inner.doc_url(index, doc_type, id);
        let response = inner
            .http
            .delete(&url)
            .query(&[("refresh", "true")])
            .send()
            .await?;
        match read_unit(response).await {
            Err(SearchError::NotFound(_)) => {
                warn!(index = index, doc_type = doc_type, id = id, "document to delete was not found");
                Ok(())
            }
            other => other,
        }
    }

    /// Delete an entire index. A missing index is logged, not an error.
    pub async fn delete_index(&self, index: &str) -> SearchResult<()> {
        let Some(inner) = self.guard("delete_index") else {
            return Ok(());
        };
        let url = format!("{}/{}", inner.base_url, index);
        let response = inner.http.delete(&url).send().await?;
        match read_unit(response).await {
            Err(SearchError::NotFound(_)) => {
                warn!(index = index, "index was not deleted: it does not exist");
                Ok(())
            }
            other => other,
        }
    }

    /// Fetch the raw mapping payload for an index partition.
    ///
    /// `None` when the mapping (or the index) does not exist; translation to
    /// semantic field types happens in [`crate::search::mapping`].
    pub async fn get_mapping(&self, index: &str, doc_type: &str) -> SearchResult<Option<Value>> {
        let Some(inner) = self.guard("get_mapping") else {
            return Ok(None);
        };
        let url = inner.url(index, Some(doc_type), Some("_mapping"));
        let response = inner.http.get(&url).send().await?;
        match read_json(response).await {
            Ok(value) => Ok(Some(value)),
            Err(SearchError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl ClientInner {
    async fn health(&self) -> SearchResult<()> {
        let url = format!("{}/_cluster/health", self.base_url);
        let response = self.http.get(&url).send().await?;
        read_unit(response).await
    }

    fn url(&self, index: &str, doc_type: Option<&str>, suffix: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.base_url, index);
        if let Some(doc_type) = doc_type {
            url = format!("{}/{}", url, doc_type);
        }
        if let Some(suffix) = suffix {
            url = format!("{}/{}", url, suffix);
        }
        url
    }

    fn doc_url(&self, index: &str, doc_type: &str, tail: &str) -> String {
        format!("{}/{}/{}/{}", self.base_url, index, doc_type, tail)
    }
}

/// Translate a backend response into `T` or a domain error.
async fn read_json<T: DeserializeOwned>(response: Response) -> SearchResult<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|err| SearchError::Backend(format!("unreadable backend response: {}", err)));
    }
    Err(translate_error(status, response).await)
}

/// Like [`read_json`] but the body content is irrelevant on success.
async fn read_unit(response: Response) -> SearchResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(translate_error(status, response).await)
}

async fn translate_error(status: StatusCode, response: Response) -> SearchError {
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<BackendErrorBody>(&text)
        .ok()
        .and_then(|body| body.error)
        .unwrap_or(text);

    if status == StatusCode::NOT_FOUND {
        SearchError::NotFound(message)
    } else {
        SearchError::Backend(message)
    }
}
