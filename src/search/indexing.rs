//! Keeping the index in step with document lifecycle events
//!
//! Write-side collaborators call [`IndexingService`] whenever a node or user
//! changes. The service decides between upsert and delete, builds the
//! indexable document, and routes it to the right index partition. All writes
//! request a synchronous refresh so a follow-up read sees them.

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use crate::config::SearchConfig;
use crate::models::{Node, User};
use crate::search::backend::ElasticClient;
use crate::search::document::{NodeDocument, UserDocument, USER_BOOST};
use crate::search::error::{SearchError, SearchResult};

/// Legacy category strings that all index as plain components.
static COMPONENT_CATEGORIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "",
        "hypothesis",
        "methods and measures",
        "procedure",
        "instrumentation",
        "data",
        "analysis",
        "communication",
        "other",
    ])
});

fn mapped_category(node: &Node) -> &str {
    if COMPONENT_CATEGORIES.contains(node.category.as_str()) {
        "component"
    } else {
        &node.category
    }
}

/// The canonical index partition for a node.
///
/// Legacy component categories collapse to `component`; a registration flag
/// overrides everything else.
pub fn canonical_category(node: &Node) -> String {
    if node.is_registration {
        "registration".to_string()
    } else {
        mapped_category(node).to_string()
    }
}

/// Builds and writes the canonical document for nodes and users.
pub struct IndexingService {
    client: Arc<ElasticClient>,
    index: String,
    metadata_index: String,
}

impl IndexingService {
    pub fn new(client: Arc<ElasticClient>, config: &SearchConfig) -> Self {
        Self {
            client,
            index: config.index.clone(),
            metadata_index: config.metadata_index.clone(),
        }
    }

    /// Bring the index entry for a node in line with its current state.
    ///
    /// Deleted or non-public nodes are removed from the index; everything
    /// else is upserted. The upsert tries update-with-upsert first and falls
    /// back to create-with-overwrite when the backend reports the document
    /// missing.
    pub async fn index_node(&self, node: &Node) -> SearchResult<()> {
        if node.is_deleted || !node.is_public {
            return self.delete_node(node).await;
        }

        let category = canonical_category(node);
        let document = NodeDocument::from_node(node, &category);
        let doc = serde_json::to_value(&document).map_err(|err| {
            SearchError::MalformedInput(format!("unserializable node document: {}", err))
        })?;

        self.upsert(&category, &node.id, &doc).await
    }

    /// Remove a node from its type partition. Missing documents are fine.
    pub async fn delete_node(&self, node: &Node) -> SearchResult<()> {
        let category = if node.is_registration {
            "registration".to_string()
        } else {
            node.project_or_component().to_string()
        };
        info!(id = %node.id, category = %category, "removing node from search index");
        self.client.delete(&self.index, &category, &node.id).await
    }

    /// Bring the index entry for a user in line with their account state.
    ///
    /// Inactive and system-generated users are removed; everyone else gets
    /// the minimal user document.
    pub async fn index_user(&self, user: &User) -> SearchResult<()> {
        if !user.is_active || user.is_system_user {
            return self.client.delete(&self.index, "user", &user.id).await;
        }

        let document = UserDocument {
            id: user.id.clone(),
            user: user.fullname.clone(),
            boost: USER_BOOST,
        };
        let doc = serde_json::to_value(&document).map_err(|err| {
            SearchError::MalformedInput(format!("unserializable user document: {}", err))
        })?;

        self.upsert("user", &user.id, &doc).await
    }

    /// Drop every index this crate writes to. Missing indices are logged.
    pub async fn delete_all(&self) -> SearchResult<()> {
        for index in [&self.index, &self.metadata_index] {
            self.client.delete_index(index).await?;
        }
        Ok(())
    }

    async fn upsert(&self, doc_type: &str, id: &str, doc: &Value) -> SearchResult<()> {
        match self.client.update(&self.index, doc_type, id, doc).await {
            Err(SearchError::NotFound(_)) => {
                self.client.index_doc(&self.index, doc_type, id, doc).await
            }
            other => other,
        }
    }
}
