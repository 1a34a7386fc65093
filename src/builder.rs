use std::sync::Arc;
use std::time::Duration;

use crate::config::PlannerConfig;
use crate::favorites::FavoritesGateway;
use crate::recipes::{RecipeClient, DEFAULT_DEADLINE};
use crate::session::{Session, SessionProvider, StaticSessionProvider};
use crate::transport::{HttpTransport, Transport};
use crate::PlannerError;

/// Handles to the remote recipe API, wired once at startup.
///
/// Cloning is cheap; every clone shares the same transport and session.
#[derive(Clone)]
pub struct RecipeApi {
    pub recipes: RecipeClient,
    pub favorites: FavoritesGateway,
    session: Arc<dyn SessionProvider>,
}

impl RecipeApi {
    /// Creates a new builder for the recipe API
    ///
    /// # Example
    /// ```
    /// use nowastefood::RecipeApi;
    ///
    /// let builder = RecipeApi::builder();
    /// ```
    pub fn builder() -> RecipeApiBuilder {
        RecipeApiBuilder::default()
    }

    /// Build the API from loaded configuration.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, PlannerError> {
        Self::builder().config(config).build()
    }

    pub async fn current_session(&self) -> Result<Session, PlannerError> {
        self.session.current_session().await
    }
}

/// Builder for [`RecipeApi`]
#[derive(Default)]
pub struct RecipeApiBuilder {
    base_url: Option<String>,
    recipes_path: Option<String>,
    favorites_path: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    session: Option<Arc<dyn SessionProvider>>,
    transport: Option<Arc<dyn Transport>>,
}

impl RecipeApiBuilder {
    /// Set the API base URL
    ///
    /// # Example
    /// ```
    /// use nowastefood::RecipeApi;
    ///
    /// let builder = RecipeApi::builder()
    ///     .base_url("https://abc123.execute-api.eu-central-1.amazonaws.com/dev");
    /// ```
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn recipes_path(mut self, path: impl Into<String>) -> Self {
        self.recipes_path = Some(path.into());
        self
    }

    pub fn favorites_path(mut self, path: impl Into<String>) -> Self {
        self.favorites_path = Some(path.into());
        self
    }

    /// Set the deadline for recipe generation requests
    ///
    /// # Example
    /// ```
    /// use nowastefood::RecipeApi;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeApi::builder()
    ///     .base_url("https://example.com/dev")
    ///     .timeout(Duration::from_secs(10));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use a fixed session built from tokens
    pub fn tokens(self, access_token: Option<String>, id_token: Option<String>) -> Self {
        self.session(Arc::new(StaticSessionProvider::new(Session::new(
            access_token,
            id_token,
        ))))
    }

    /// Use a custom session provider
    pub fn session(mut self, provider: Arc<dyn SessionProvider>) -> Self {
        self.session = Some(provider);
        self
    }

    /// Use a custom transport instead of HTTP; `base_url` is then ignored
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Apply every setting from loaded configuration
    pub fn config(self, config: &PlannerConfig) -> Self {
        self.base_url(config.api.base_url.clone())
            .recipes_path(config.api.recipes_path.clone())
            .favorites_path(config.api.favorites_path.clone())
            .timeout(Duration::from_millis(config.api.timeout_ms))
            .user_agent(config.api.user_agent.clone())
            .tokens(
                config.auth.access_token.clone(),
                config.auth.id_token.clone(),
            )
    }

    /// Build the API handles
    ///
    /// # Errors
    /// Returns `PlannerError` if:
    /// - Neither a base URL nor a custom transport was specified
    /// - The base URL is invalid
    /// - The HTTP client cannot be created
    pub fn build(self) -> Result<RecipeApi, PlannerError> {
        let session: Arc<dyn SessionProvider> = match self.session {
            Some(session) => session,
            None => Arc::new(StaticSessionProvider::anonymous()),
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let base_url = self.base_url.ok_or_else(|| {
                    PlannerError::InvalidUrl(
                        "No API base URL specified. Use .base_url() or .transport()".to_string(),
                    )
                })?;
                let user_agent = self
                    .user_agent
                    .unwrap_or_else(|| format!("nowastefood/{}", env!("CARGO_PKG_VERSION")));
                Arc::new(HttpTransport::new(
                    &base_url,
                    &user_agent,
                    Arc::clone(&session),
                )?)
            }
        };

        let mut recipes = RecipeClient::new(Arc::clone(&transport))
            .with_deadline(self.timeout.unwrap_or(DEFAULT_DEADLINE));
        if let Some(path) = &self.recipes_path {
            recipes = recipes.with_path(path);
        }

        let mut favorites =
            FavoritesGateway::new(transport).with_session(Arc::clone(&session));
        if let Some(path) = &self.favorites_path {
            favorites = favorites.with_path(path);
        }

        Ok(RecipeApi {
            recipes,
            favorites,
            session,
        })
    }
}
