//! Query translation, indexing, and result shaping over the search backend.
//!
//! This module is the engine between the web application and the external
//! search backend:
//!
//! - **Query translation**: the informal textual grammar (type tokens, tag
//!   filters, wildcards) becomes a structured query expression tree
//! - **Counting**: per-type document counts reconciled into a single total
//! - **Result shaping**: raw hits become redacted, de-duplicated response
//!   rows plus a tag frequency map
//! - **Indexing**: node and user lifecycle events turn into upserts and
//!   deletes against the backend
//! - **Contributor search**: prefix matching over user records with
//!   profile enrichment
//! - **Metadata search**: clause-grammar queries over namespaced records
//!
//! # Architecture
//!
//! ```text
//! raw query ──▶ ParsedQuery ──▶ ElasticClient.search ──▶ raw hits
//!                    │                                      │
//!                    ▼                                      ▼
//!              count_by_type ──────────────────▶ format_results
//!                                                           │
//!                                                           ▼
//!                                   SearchResults {results, tags, counts}
//! ```
//!
//! The [`ElasticClient`] handle is constructed once at process start and
//! injected into each service. A failed startup health check leaves it
//! disabled: operations then log and return empty defaults, so the
//! application runs without search rather than failing.

mod backend;
mod contributors;
mod counts;
mod document;
mod error;
mod indexing;
mod mapping;
mod metadata;
mod query;
mod recent;
mod results;
mod service;

pub use backend::{ElasticClient, RawHit, RawHits, RawSearchResponse};
pub use contributors::{ContributorResult, ContributorResults, ContributorSearchService};
pub use counts::{count_by_type, resolve_total, TypeCounts};
pub use document::{NodeDocument, SearchDocument, UserDocument, USER_BOOST};
pub use error::{SearchError, SearchResult};
pub use indexing::{canonical_category, IndexingService};
pub use mapping::{get_mapping, FieldType, IndexMapping, MappingField};
pub use metadata::{metadata_inner_query, MetadataQuery, MetadataSearchService};
pub use query::{
    parse_start, DocType, FilterExpr, MatchOperator, ParsedQuery, QueryExpr, SearchRequest,
    SortOrder, ALL_FIELD,
};
pub use recent::{recent_documents_request, RecentDocuments, RecentDocumentsService};
pub use results::{
    format_results, FormattedNode, FormattedResult, FormattedUser, ParentInfo,
    PRIVATE_PARENT_TITLE,
};
pub use service::{SearchResults, SearchService};
