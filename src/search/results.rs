//! Shaping raw hits into the response format
//!
//! Formatting is where privacy is enforced: a hit's parent may be a private
//! project, and nothing about a private parent's identity may leave this
//! module. Visibility is decided solely by the parent's public flag; the
//! requester's identity (even the parent's owner) plays no part.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::models::{Node, NodeStore};
use crate::search::document::{NodeDocument, SearchDocument};

/// Placeholder title shown in place of a private parent's identity.
pub const PRIVATE_PARENT_TITLE: &str = "-- private project --";

/// A single row in the search response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormattedResult {
    User(FormattedUser),
    Node(FormattedNode),
}

/// Minimal row for a user hit; no redaction logic applies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedUser {
    pub id: String,
    pub user: String,
    pub user_url: String,
}

/// Row for a project/component/registration hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedNode {
    pub title: String,
    pub url: String,
    pub wiki_link: String,
    pub is_component: bool,
    pub parent_title: Option<String>,
    pub parent_url: Option<String>,
    /// From the hit itself for top-level documents, else from the (possibly
    /// redacted) parent info. `None` when the parent is private.
    pub is_registration: Option<bool>,
    pub tags: Vec<String>,
    pub contributors: Vec<String>,
    pub contributors_url: Vec<String>,
    /// Present only for top-level documents.
    pub description: Option<String>,
}

/// Display info for a hit's parent.
///
/// Built through [`ParentInfo::from_parent`] so the redaction rule cannot be
/// bypassed: only a public parent exposes its real identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentInfo {
    pub title: String,
    pub url: String,
    pub is_registration: Option<bool>,
    pub id: Option<String>,
}

impl ParentInfo {
    pub fn from_parent(parent: Option<&Node>) -> Self {
        match parent {
            Some(parent) if parent.is_public => Self {
                title: parent.title.clone(),
                url: parent.url.clone(),
                is_registration: Some(parent.is_registration),
                id: Some(parent.id.clone()),
            },
            _ => Self {
                title: PRIVATE_PARENT_TITLE.to_string(),
                url: String::new(),
                is_registration: None,
                id: None,
            },
        }
    }
}

/// Shape raw hit documents into response rows plus a tag frequency map.
///
/// Hits are processed in order. User hits pass straight through. Node hits
/// feed the cumulative tag cloud (duplicates included), resolve their parent
/// for redaction, and are de-duplicated by id: the first occurrence wins and
/// later ones are silently dropped.
pub async fn format_results(
    nodes: &dyn NodeStore,
    documents: Vec<SearchDocument>,
) -> (Vec<FormattedResult>, HashMap<String, u64>) {
    let mut formatted = Vec::new();
    let mut word_cloud: HashMap<String, u64> = HashMap::new();
    let mut visited: HashSet<String> = HashSet::new();

    for document in documents {
        match document {
            SearchDocument::User(user) => {
                formatted.push(FormattedResult::User(FormattedUser {
                    user_url: format!("/profile/{}", user.id),
                    id: user.id,
                    user: user.user,
                }));
            }
            SearchDocument::Node(node_doc) => {
                for tag in &node_doc.tags {
                    *word_cloud.entry(tag.clone()).or_insert(0) += 1;
                }

                let parent = match &node_doc.parent_id {
                    Some(parent_id) => nodes.load(parent_id).await,
                    None => None,
                };
                let parent_info = ParentInfo::from_parent(parent.as_ref());

                if !visited.insert(node_doc.id.clone()) {
                    debug!(id = %node_doc.id, "dropping duplicate hit");
                    continue;
                }

                formatted.push(FormattedResult::Node(format_node(
                    node_doc,
                    parent.is_some(),
                    parent_info,
                )));
            }
        }
    }

    (formatted, word_cloud)
}

fn format_node(doc: NodeDocument, has_parent: bool, parent_info: ParentInfo) -> FormattedNode {
    FormattedNode {
        wiki_link: format!("{}wiki/", doc.url),
        is_component: has_parent,
        parent_title: has_parent.then(|| parent_info.title),
        parent_url: has_parent.then(|| parent_info.url),
        is_registration: if has_parent {
            parent_info.is_registration
        } else {
            Some(doc.is_registration)
        },
        description: if has_parent {
            None
        } else {
            Some(doc.description)
        },
        title: doc.title,
        url: doc.url,
        tags: doc.tags,
        contributors: doc.contributors,
        contributors_url: doc.contributors_url,
    }
}
