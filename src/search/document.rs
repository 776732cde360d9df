//! Search document structures
//!
//! These are the shapes written to (and read back from) the backend index.
//! Node documents carry only fields that are safe to surface in search;
//! user documents are deliberately minimal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::Node;

/// Ranking boost applied to user documents.
pub const USER_BOOST: u32 = 2;

/// A document as stored in the search index: either a user or a node shape.
///
/// The two are told apart structurally: user documents carry a `user` field
/// and no `title`, node documents the reverse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchDocument {
    User(UserDocument),
    Node(NodeDocument),
}

/// Minimal user record kept in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    /// User id
    pub id: String,

    /// Full display name, prefix-indexed for contributor search
    pub user: String,

    /// Ranking boost
    pub boost: u32,
}

/// Indexable representation of a project, component or registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDocument {
    /// Node id
    pub id: String,

    /// Title
    pub title: String,

    /// Description text
    pub description: String,

    /// The node's original category (not the canonical index partition)
    pub category: String,

    /// Public visibility flag
    pub public: bool,

    /// Tags
    pub tags: Vec<String>,

    /// Canonical URL
    pub url: String,

    /// Registration flag
    pub is_registration: bool,

    /// Display names of indexable contributors
    pub contributors: Vec<String>,

    /// Profile links of indexable contributors
    pub contributors_url: Vec<String>,

    /// Wiki page name -> rendered text
    pub wikis: HashMap<String, String>,

    /// Parent node id, components only
    pub parent_id: Option<String>,

    /// Creation timestamp
    pub date_created: DateTime<Utc>,

    /// Ranking boost; registrations rank below everything else
    pub boost: u32,
}

impl NodeDocument {
    /// Build the indexable document for a node.
    ///
    /// `category` is the canonical index partition computed by the indexing
    /// service; it drives the report carve-out for inactive contributors.
    /// Contributor names and links are restricted to contributors that are
    /// publicly listed and active (or any listed contributor on a report).
    pub fn from_node(node: &Node, category: &str) -> Self {
        let contributors: Vec<_> = node
            .contributors
            .iter()
            .filter(|contributor| {
                contributor.visible && (contributor.is_active || category == "report")
            })
            .collect();

        // Top-level projects never record a parent, whatever the caller set.
        let parent_id = if node.project_or_component() == "project" {
            None
        } else {
            node.parent_id.clone()
        };

        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            description: node.description.clone(),
            category: node.category.clone(),
            public: node.is_public,
            tags: node.tags.clone(),
            url: node.url.clone(),
            is_registration: node.is_registration,
            contributors: contributors
                .iter()
                .map(|contributor| contributor.fullname.clone())
                .collect(),
            contributors_url: contributors
                .iter()
                .map(|contributor| contributor.profile_url.clone())
                .collect(),
            wikis: node.wiki_pages.clone(),
            parent_id,
            date_created: node.date_created,
            boost: if node.is_registration { 1 } else { 2 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Contributor;

    fn contributor(name: &str, visible: bool, active: bool) -> Contributor {
        Contributor {
            fullname: name.to_string(),
            profile_url: format!("/profile/{}", name),
            visible,
            is_active: active,
        }
    }

    #[test]
    fn test_boost_favors_non_registrations() {
        let mut node = Node::new("abc12", "Climate", "project");
        let doc = NodeDocument::from_node(&node, "project");
        assert_eq!(doc.boost, 2);

        node.is_registration = true;
        let doc = NodeDocument::from_node(&node, "registration");
        assert_eq!(doc.boost, 1);
    }

    #[test]
    fn test_contributor_filtering() {
        let mut node = Node::new("abc12", "Climate", "project");
        node.contributors = vec![
            contributor("Visible Active", true, true),
            contributor("Hidden Active", false, true),
            contributor("Visible Inactive", true, false),
        ];

        let doc = NodeDocument::from_node(&node, "project");
        assert_eq!(doc.contributors, vec!["Visible Active"]);
        assert_eq!(doc.contributors_url, vec!["/profile/Visible Active"]);
    }

    #[test]
    fn test_report_carve_out_keeps_inactive_contributors() {
        let mut node = Node::new("rep01", "Annual report", "report");
        node.contributors = vec![
            contributor("Visible Inactive", true, false),
            contributor("Hidden Inactive", false, false),
        ];

        let doc = NodeDocument::from_node(&node, "report");
        assert_eq!(doc.contributors, vec!["Visible Inactive"]);
        assert_eq!(doc.contributors_url, vec!["/profile/Visible Inactive"]);
    }

    #[test]
    fn test_projects_never_record_a_parent() {
        let mut node = Node::new("abc12", "Climate", "project");
        node.parent_id = Some("zzz99".to_string());
        let doc = NodeDocument::from_node(&node, "project");
        assert_eq!(doc.parent_id, None);

        let mut component = Node::new("def34", "Sensors", "data");
        component.parent_id = Some("abc12".to_string());
        let doc = NodeDocument::from_node(&component, "component");
        assert_eq!(doc.parent_id, Some("abc12".to_string()));
    }

    #[test]
    fn test_user_document_round_trips_as_search_document() {
        let doc = UserDocument {
            id: "jdoe1".to_string(),
            user: "Jane Doe".to_string(),
            boost: USER_BOOST,
        };
        let value = serde_json::to_value(&doc).unwrap();
        match serde_json::from_value::<SearchDocument>(value).unwrap() {
            SearchDocument::User(user) => assert_eq!(user.user, "Jane Doe"),
            SearchDocument::Node(_) => panic!("user document decoded as node"),
        }
    }
}
