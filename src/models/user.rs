use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A user profile as returned by the user-by-id collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,

    /// Full display name
    pub fullname: String,

    /// Primary email address, if known
    pub email: Option<String>,

    /// Active means registered, confirmed, not merged and not disabled
    pub is_active: bool,

    /// Whether the user has completed registration
    pub is_registered: bool,

    /// System-generated accounts are never surfaced in search
    pub is_system_user: bool,

    /// Employment history, most recent first
    pub jobs: Vec<Affiliation>,

    /// Education history, most recent first
    pub schools: Vec<Affiliation>,

    /// Link to the user's profile page
    pub profile_url: String,
}

/// One employment or education entry on a user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affiliation {
    /// Institution name
    pub institution: String,
}

impl User {
    /// Create an active, registered user; tests and callers fill in the rest.
    pub fn new(id: impl Into<String>, fullname: impl Into<String>) -> Self {
        let id = id.into();
        let profile_url = format!("/profile/{}", id);
        Self {
            id,
            fullname: fullname.into(),
            email: None,
            is_active: true,
            is_registered: true,
            is_system_user: false,
            jobs: Vec::new(),
            schools: Vec::new(),
            profile_url,
        }
    }

    /// Gravatar image URL for this user at the given pixel size.
    ///
    /// The hash is computed over the trimmed, lower-cased email address; a
    /// missing email hashes the empty string, which gravatar renders as the
    /// default identicon.
    pub fn gravatar_url(&self, size: u32) -> String {
        let email = self
            .email
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        let digest = Sha256::digest(email.as_bytes());
        let hash: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        format!(
            "https://secure.gravatar.com/avatar/{}?d=identicon&s={}",
            hash, size
        )
    }
}

/// User lookups and cross-user computations, provided by the storage layer.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load a user by id; `None` when it does not exist.
    async fn load(&self, id: &str) -> Option<User>;

    /// Number of projects two users both contribute to.
    async fn projects_in_common(&self, user: &User, other: &User) -> u64;
}
