use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Search backend configuration
    pub search: SearchConfig,

    /// Profile/avatar configuration
    #[serde(default)]
    pub profiles: ProfileConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: HUBSEARCH_)
            .add_source(
                config::Environment::with_prefix("HUBSEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

/// Search backend connection and index layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Base URL of the search backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Connection-level request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Index holding projects, components, registrations and users
    #[serde(default = "default_index")]
    pub index: String,

    /// Index holding namespaced metadata records
    #[serde(default = "default_metadata_index")]
    pub metadata_index: String,

    /// Default page size for search responses
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            timeout_secs: default_timeout(),
            index: default_index(),
            metadata_index: default_metadata_index(),
            page_size: default_page_size(),
        }
    }
}

/// Avatar rendering options used when serializing contributor results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Pixel size of gravatar images on the add-contributor screen
    #[serde(default = "default_gravatar_size")]
    pub gravatar_size_add_contributor: u32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            gravatar_size_add_contributor: default_gravatar_size(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_index() -> String {
    "hub".to_string()
}

fn default_metadata_index() -> String {
    "metadata".to_string()
}

fn default_page_size() -> u64 {
    10
}

fn default_gravatar_size() -> u32 {
    40
}
