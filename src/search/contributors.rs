//! Contributor search for the add-contributor picker
//!
//! Matches user records by name prefix and enriches each hit with profile
//! details the picker renders: current employment, education, shared project
//! count and avatar.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use crate::config::Config;
use crate::models::{User, UserStore};
use crate::search::backend::ElasticClient;
use crate::search::document::UserDocument;
use crate::search::error::SearchResult;
use crate::search::query::{FilterExpr, QueryExpr, SearchRequest};

static SIGNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\-\+]").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// One enriched row in the contributor picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorResult {
    pub fullname: String,
    pub id: String,
    pub employment: Option<String>,
    pub education: Option<String>,
    pub n_projects_in_common: u64,
    pub gravatar_url: String,
    pub profile_url: String,
    pub registered: bool,
    pub active: bool,
}

/// The picker response shape.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContributorResults {
    pub users: Vec<ContributorResult>,
}

/// Build the prefix-filter request for a contributor query.
///
/// `+`/`-` are stripped, the rest splits on whitespace; each token becomes a
/// lower-cased prefix filter on the `user` field, AND-combined when there is
/// more than one.
pub fn contributor_query(raw_query: &str) -> SearchRequest {
    let cleaned = SIGNS.replace_all(raw_query, "");
    let mut prefixes: Vec<FilterExpr> = WHITESPACE
        .split(cleaned.trim())
        .filter(|token| !token.is_empty())
        .map(|token| FilterExpr::Prefix {
            field: "user".to_string(),
            value: token.to_lowercase(),
        })
        .collect();

    let filter = match prefixes.len() {
        0 => FilterExpr::Prefix {
            field: "user".to_string(),
            value: String::new(),
        },
        1 => prefixes.remove(0),
        _ => FilterExpr::And(prefixes),
    };

    SearchRequest {
        query: QueryExpr::Filtered {
            filter,
            query: None,
        },
        from: None,
        size: None,
        sort: None,
    }
}

/// Prefix search over user records with profile enrichment.
pub struct ContributorSearchService {
    client: Arc<ElasticClient>,
    users: Arc<dyn UserStore>,
    index: String,
    gravatar_size: u32,
}

impl ContributorSearchService {
    pub fn new(client: Arc<ElasticClient>, users: Arc<dyn UserStore>, config: &Config) -> Self {
        Self {
            client,
            users,
            index: config.search.index.clone(),
            gravatar_size: config.profiles.gravatar_size_add_contributor,
        }
    }

    /// Search for users matching the query.
    ///
    /// Hits whose id is in `exclude` are dropped, as are inactive users
    /// (merged, unregistered, disabled): silently, not as an error. When a
    /// requesting user is supplied, each row carries the number of projects
    /// they share.
    pub async fn search(
        &self,
        raw_query: &str,
        exclude: &[String],
        current_user: Option<&User>,
    ) -> SearchResult<ContributorResults> {
        let request = contributor_query(raw_query);
        let response = self.client.search(&request, &self.index, None).await?;

        let mut users = Vec::new();
        for source in response.sources() {
            let doc: UserDocument = match serde_json::from_value(source) {
                Ok(doc) => doc,
                Err(_) => continue,
            };
            if exclude.contains(&doc.id) {
                continue;
            }

            let Some(user) = self.users.load(&doc.id).await else {
                error!(user_id = %doc.id, "could not load user behind contributor hit");
                continue;
            };
            if !user.is_active {
                continue;
            }

            let n_projects_in_common = match current_user {
                Some(me) => self.users.projects_in_common(me, &user).await,
                None => 0,
            };

            users.push(ContributorResult {
                fullname: doc.user,
                id: doc.id,
                employment: user.jobs.first().map(|job| job.institution.clone()),
                education: user.schools.first().map(|school| school.institution.clone()),
                n_projects_in_common,
                gravatar_url: user.gravatar_url(self.gravatar_size),
                profile_url: user.profile_url.clone(),
                registered: user.is_registered,
                active: user.is_active,
            });
        }

        Ok(ContributorResults { users })
    }
}
