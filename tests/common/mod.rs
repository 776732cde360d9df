//! Common test utilities: in-memory collaborator stores and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use hubsearch::models::{Node, NodeStore, User, UserStore};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Install a test tracing subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("hubsearch=debug")
        .with_test_writer()
        .try_init();
}

/// Node lookup backed by a map.
pub struct InMemoryNodeStore {
    nodes: HashMap<String, Node>,
}

impl InMemoryNodeStore {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|node| (node.id.clone(), node)).collect(),
        }
    }
}

#[async_trait]
impl NodeStore for InMemoryNodeStore {
    async fn load(&self, id: &str) -> Option<Node> {
        self.nodes.get(id).cloned()
    }
}

/// User lookup backed by a map, with a fixed shared-project count.
pub struct InMemoryUserStore {
    users: HashMap<String, User>,
    pub projects_in_common: u64,
}

impl InMemoryUserStore {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: users.into_iter().map(|user| (user.id.clone(), user)).collect(),
            projects_in_common: 0,
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn load(&self, id: &str) -> Option<User> {
        self.users.get(id).cloned()
    }

    async fn projects_in_common(&self, _user: &User, _other: &User) -> u64 {
        self.projects_in_common
    }
}

/// A node document as the backend would return it in a hit `_source`.
pub fn node_source(id: &str, title: &str, tags: &[&str]) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("about {}", title),
        "category": "project",
        "public": true,
        "tags": tags,
        "url": format!("/{}/", id),
        "is_registration": false,
        "contributors": ["Jane Doe"],
        "contributors_url": ["/profile/jdoe1"],
        "wikis": {},
        "parent_id": null,
        "date_created": Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap().to_rfc3339(),
        "boost": 2,
    })
}

/// A user document as the backend would return it in a hit `_source`.
pub fn user_source(id: &str, fullname: &str) -> Value {
    json!({"id": id, "user": fullname, "boost": 2})
}

/// Wrap hit sources into the backend's search response shape.
pub fn search_response(sources: Vec<Value>) -> Value {
    let total = sources.len();
    json!({
        "hits": {
            "total": total,
            "hits": sources.into_iter().map(|source| json!({"_source": source})).collect::<Vec<_>>(),
        }
    })
}
