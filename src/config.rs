use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main client configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct PlannerConfig {
    /// Recipe API connection settings
    pub api: ApiConfig,
    /// Session tokens issued by the identity platform
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Configuration for the recipe API
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the API stage (e.g., "https://abc123.execute-api.eu-central-1.amazonaws.com/dev")
    pub base_url: String,
    /// Path of the recipe generator resource
    #[serde(default = "default_recipes_path")]
    pub recipes_path: String,
    /// Path of the favorites resource
    #[serde(default = "default_favorites_path")]
    pub favorites_path: String,
    /// Deadline for a recipe generation request in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Tokens for the signed-in user
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// Access token sent as a bearer token
    pub access_token: Option<String>,
    /// Id token, used for account details and sign-in introspection
    pub id_token: Option<String>,
}

// Default value functions
fn default_recipes_path() -> String {
    "recipes".to_string()
}

fn default_favorites_path() -> String {
    "favorites".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    format!("nowastefood/{}", env!("CARGO_PKG_VERSION"))
}

impl PlannerConfig {
    /// Load configuration from `nowastefood.toml` and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with NOWASTEFOOD__ prefix
    /// 2. nowastefood.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: NOWASTEFOOD__API__BASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        load_config(None)
    }
}

/// Load configuration from file and environment variables
///
/// `path` overrides the default `nowastefood` file name; a file passed
/// explicitly is required to exist.
pub fn load_config(path: Option<&str>) -> Result<PlannerConfig, ConfigError> {
    let file = match path {
        Some(path) => File::with_name(path).required(true),
        None => File::with_name("nowastefood").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        // Use double underscore for nested: NOWASTEFOOD__AUTH__ACCESS_TOKEN
        .add_source(
            Environment::with_prefix("NOWASTEFOOD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
