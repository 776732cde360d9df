//! Search query building and parsing
//!
//! The raw query grammar is informal: an optional `type:` token narrows the
//! search to one document type, a `tags:` marker introduces a tag filter, and
//! a `*` anywhere switches the text match to wildcard mode. Everything else
//! is free text. Parsing never fails: unrecognizable input degrades to the
//! broadest query rather than erroring.
//!
//! Parsed queries are immutable expression trees. Derived forms (the per-type
//! count queries) are built by reconstruction, never by mutating a tree after
//! the fact.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::warn;

/// Catch-all field maintained by the backend across every document field.
pub const ALL_FIELD: &str = "_all";

/// Document types that live in the searchable index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum DocType {
    Project,
    Component,
    User,
    Registration,
}

impl DocType {
    /// Pluralized name used as the counts-map key.
    pub fn plural(&self) -> String {
        format!("{}s", self)
    }

    /// The `type:` token form recognized in raw queries.
    fn token(&self) -> String {
        format!("{}:", self)
    }
}

/// Sort order for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Operator applied when a match query has several terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MatchOperator {
    And,
    Or,
}

/// A filter node in the query expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Exact document-type equality
    Type(DocType),
    /// Any of the given filters
    Or(Vec<FilterExpr>),
    /// All of the given filters
    And(Vec<FilterExpr>),
    /// Prefix match on a single field
    Prefix { field: String, value: String },
    /// Multi-value exact terms match
    Terms { field: String, values: Vec<String> },
    /// A query used in filter position
    Query(Box<QueryExpr>),
}

impl FilterExpr {
    /// Backend wire representation of this filter.
    pub fn to_value(&self) -> Value {
        match self {
            FilterExpr::Type(doc_type) => {
                json!({"type": {"value": doc_type.to_string()}})
            }
            FilterExpr::Or(filters) => {
                json!({"or": filters.iter().map(FilterExpr::to_value).collect::<Vec<_>>()})
            }
            FilterExpr::And(filters) => {
                json!({"and": filters.iter().map(FilterExpr::to_value).collect::<Vec<_>>()})
            }
            FilterExpr::Prefix { field, value } => {
                json!({"prefix": single(field, json!(value))})
            }
            FilterExpr::Terms { field, values } => {
                json!({"terms": single(field, json!(values))})
            }
            FilterExpr::Query(query) => {
                json!({"query": query.to_value()})
            }
        }
    }
}

/// A query node in the expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpr {
    /// Phrase-prefix match against the catch-all field
    MultiMatchPhrasePrefix { query: String },
    /// Wildcard-aware query-string search against the catch-all field
    QueryString { query: String },
    /// Single-field match; `operator`/`phrase` shape the match options
    Match {
        field: String,
        query: String,
        operator: Option<MatchOperator>,
        phrase: bool,
    },
    /// Match every document
    MatchAll,
    /// Filter applied around an optional inner query
    Filtered {
        filter: FilterExpr,
        query: Option<Box<QueryExpr>>,
    },
    /// Score by multiplying in a per-document boost field
    FunctionScore {
        query: Box<QueryExpr>,
        boost_field: String,
    },
}

impl QueryExpr {
    /// Backend wire representation of this query.
    pub fn to_value(&self) -> Value {
        match self {
            QueryExpr::MultiMatchPhrasePrefix { query } => json!({
                "multi_match": {
                    "query": query,
                    "type": "phrase_prefix",
                    "fields": ALL_FIELD,
                }
            }),
            QueryExpr::QueryString { query } => json!({
                "query_string": {
                    "default_field": ALL_FIELD,
                    "query": query,
                    "analyze_wildcard": true,
                }
            }),
            QueryExpr::Match {
                field,
                query,
                operator,
                phrase,
            } => {
                let options = if operator.is_none() && !phrase {
                    json!(query)
                } else {
                    let mut options = Map::new();
                    options.insert("query".to_string(), json!(query));
                    if let Some(op) = operator {
                        options.insert("operator".to_string(), json!(op.to_string()));
                    }
                    if *phrase {
                        options.insert("type".to_string(), json!("phrase"));
                    }
                    Value::Object(options)
                };
                json!({"match": single(field, options)})
            }
            QueryExpr::MatchAll => json!({"match_all": {}}),
            QueryExpr::Filtered { filter, query } => {
                let mut body = Map::new();
                body.insert("filter".to_string(), filter.to_value());
                if let Some(query) = query {
                    body.insert("query".to_string(), query.to_value());
                }
                json!({"filtered": body})
            }
            QueryExpr::FunctionScore { query, boost_field } => json!({
                "function_score": {
                    "query": query.to_value(),
                    "functions": [{"field_value_factor": {"field": boost_field}}],
                    "score_mode": "multiply",
                }
            }),
        }
    }
}

/// A complete request body: a query plus pagination and an optional sort.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: QueryExpr,
    pub from: Option<u64>,
    pub size: Option<u64>,
    pub sort: Option<(String, SortOrder)>,
}

impl SearchRequest {
    /// Backend wire representation of this request.
    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        if let Some((field, order)) = &self.sort {
            let clause = single(field, json!({"order": order.to_string()}));
            body.insert("sort".to_string(), json!([clause]));
        }
        body.insert("query".to_string(), self.query.to_value());
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        Value::Object(body)
    }
}

impl Serialize for SearchRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// One-entry JSON object with a runtime key.
fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

/// Outcome of parsing a raw query string.
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    /// The document type the query explicitly named, if any.
    pub doc_type: Option<DocType>,
    /// Query text with type tokens and punctuation stripped.
    pub sanitized: String,
    inner: QueryExpr,
}

impl ParsedQuery {
    /// Parse a raw query string into an immutable query tree.
    ///
    /// Recognized grammar, in order of application:
    /// 1. a `<type>:` token anywhere selects that type (last one wins);
    ///    without one, all known types are searched
    /// 2. parentheses, backslashes and quotes are stripped; commas, dashes
    ///    and underscores become spaces
    /// 3. a `*` anywhere switches to wildcard matching, otherwise the text
    ///    is a phrase-prefix match
    /// 4. `tags:a b` wraps the text query in an OR tag filter; with no text
    ///    before the marker the query degrades to match-everything
    pub fn parse(raw_query: &str) -> Self {
        let mut doc_type = None;
        for candidate in DocType::iter() {
            if raw_query.contains(&candidate.token()) {
                doc_type = Some(candidate);
            }
        }

        let mut text = raw_query.to_string();
        for candidate in DocType::iter() {
            text = text.replace(&candidate.token(), "");
        }
        for stripped in ['(', ')', '\\', '"'] {
            text = text.replace(stripped, "");
        }
        for spaced in [',', '-', '_'] {
            text = text.replace(spaced, " ");
        }
        let sanitized = text.trim().to_string();

        let wildcard = sanitized.contains('*');

        let inner = if sanitized.contains("tags:") {
            let replaced = sanitized.replace("AND", " ");
            let mut parts = replaced.split("tags:");
            let primary = parts.next().unwrap_or("").trim().to_string();
            let tags: Vec<&str> = parts.flat_map(str::split_whitespace).collect();

            let primary_query = if primary.is_empty() {
                // No text left in front of the marker: match everything and
                // let the tag filter do the narrowing.
                QueryExpr::QueryString {
                    query: "*".to_string(),
                }
            } else if wildcard {
                QueryExpr::QueryString { query: primary }
            } else {
                QueryExpr::MultiMatchPhrasePrefix { query: primary }
            };

            let tag_filter = FilterExpr::Query(Box::new(QueryExpr::Match {
                field: "tags".to_string(),
                query: tags.join(" "),
                operator: Some(MatchOperator::Or),
                phrase: false,
            }));

            QueryExpr::Filtered {
                filter: tag_filter,
                query: Some(Box::new(primary_query)),
            }
        } else if wildcard {
            QueryExpr::QueryString {
                query: format!("{}*", sanitized),
            }
        } else {
            QueryExpr::MultiMatchPhrasePrefix {
                query: sanitized.clone(),
            }
        };

        Self {
            doc_type,
            sanitized,
            inner,
        }
    }

    /// The inner text/tag query, before type filtering and scoring.
    pub fn inner(&self) -> &QueryExpr {
        &self.inner
    }

    /// The type filter: exact equality when a type was named, else any known type.
    pub fn type_filter(&self) -> FilterExpr {
        match self.doc_type {
            Some(doc_type) => FilterExpr::Type(doc_type),
            None => FilterExpr::Or(DocType::iter().map(FilterExpr::Type).collect()),
        }
    }

    /// Full scored query with the given type filter in place.
    fn scored(&self, type_filter: FilterExpr) -> QueryExpr {
        QueryExpr::FunctionScore {
            query: Box::new(QueryExpr::Filtered {
                filter: type_filter,
                query: Some(Box::new(self.inner.clone())),
            }),
            boost_field: "boost".to_string(),
        }
    }

    /// The paginated search request for this query.
    pub fn search_request(&self, start: u64, size: u64) -> SearchRequest {
        SearchRequest {
            query: self.scored(self.type_filter()),
            from: Some(start),
            size: Some(size),
            sort: None,
        }
    }

    /// A count-only request with the type filter substituted for `doc_type`.
    pub fn count_request(&self, doc_type: DocType) -> SearchRequest {
        SearchRequest {
            query: self.scored(FilterExpr::Type(doc_type)),
            from: None,
            size: None,
            sort: None,
        }
    }
}

/// Parse a caller-supplied pagination value.
///
/// Anything that is not a non-negative integer is logged and defaults to 0;
/// the request proceeds.
pub fn parse_start(raw: Option<&str>) -> u64 {
    match raw {
        None => 0,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(value = %value, "malformed pagination value, defaulting to 0");
            0
        }),
    }
}
