use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A content document in the hub: a project, one of its components, or a
/// registration. This is the shape returned by the node-by-id collaborator;
/// persistence and lifecycle live elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// Free-text description
    pub description: String,

    /// Legacy category string ("project", "hypothesis", "data", "report", ...)
    pub category: String,

    /// Whether the node is visible to everyone
    pub is_public: bool,

    /// Whether the node has been deleted
    pub is_deleted: bool,

    /// Whether the node is a registration (frozen snapshot)
    pub is_registration: bool,

    /// Id of the parent node, if this is a component
    pub parent_id: Option<String>,

    /// Tags attached to the node
    pub tags: Vec<String>,

    /// Canonical URL of the node
    pub url: String,

    /// Creation timestamp
    pub date_created: DateTime<Utc>,

    /// Contributors, in display order
    pub contributors: Vec<Contributor>,

    /// Wiki page name -> rendered text
    pub wiki_pages: HashMap<String, String>,
}

impl Node {
    /// Create a minimal public node; tests and callers fill in the rest.
    pub fn new(id: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: category.into(),
            is_public: true,
            is_deleted: false,
            is_registration: false,
            parent_id: None,
            tags: Vec::new(),
            url: String::new(),
            date_created: Utc::now(),
            contributors: Vec::new(),
            wiki_pages: HashMap::new(),
        }
    }

    /// The node's coarse kind: a top-level project or a component of one.
    pub fn project_or_component(&self) -> &'static str {
        if self.category == "project" {
            "project"
        } else {
            "component"
        }
    }
}

/// A contributor entry as carried on a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
    /// Display name
    pub fullname: String,

    /// Link to the contributor's profile page
    pub profile_url: String,

    /// Whether the contributor is listed publicly on the node
    pub visible: bool,

    /// Whether the underlying user account is active
    pub is_active: bool,
}

/// Node-by-id lookup, provided by the storage layer.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Load a node by id; `None` when it does not exist.
    async fn load(&self, id: &str) -> Option<Node>;
}
