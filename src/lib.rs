//! Client for the NoWasteFood recipe planner.
//!
//! Generates recipes from a selection of ingredients through a remote
//! generator, with a bounded wait and tolerant decoding of its answers, and
//! manages the signed-in user's favorite recipes.
//!
//! # Example
//! ```no_run
//! # use nowastefood::RecipeApi;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let api = RecipeApi::builder()
//!     .base_url("https://abc123.execute-api.eu-central-1.amazonaws.com/dev")
//!     .build()?;
//!
//! let recipe = api.recipes.custom(["eggs", "potatoes", "onion"]).await?.into_result()?;
//! println!("{}", recipe["title"]);
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod builder;
pub mod config;
pub mod decoder;
pub mod error;
pub mod favorites;
pub mod ingredients;
pub mod model;
pub mod planner;
pub mod recipes;
pub mod session;
pub mod transport;

pub use builder::{RecipeApi, RecipeApiBuilder};
pub use config::PlannerConfig;
pub use decoder::RequestOutcome;
pub use error::PlannerError;
pub use favorites::FavoritesGateway;
pub use ingredients::IngredientSelection;
pub use model::{Favorite, GeneratedRecipe, Recipe, Step};
pub use planner::Planner;
pub use recipes::{RecipeClient, RecipeRequest};
pub use session::{Session, SessionProvider, SignInKind};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

/// Fetch the recipe of the day using configuration from the environment.
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let recipe = nowastefood::daily_recipe().await?;
/// println!("{}", recipe);
/// # Ok(())
/// # }
/// ```
pub async fn daily_recipe() -> Result<GeneratedRecipe, PlannerError> {
    let config = PlannerConfig::load()?;
    let api = RecipeApi::from_config(&config)?;
    let value = api.recipes.daily().await.into_result()?;
    Ok(GeneratedRecipe::from_value(&value))
}

/// Generate a recipe from `ingredients` using configuration from the
/// environment.
pub async fn recipe_from_ingredients<I, S>(ingredients: I) -> Result<GeneratedRecipe, PlannerError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let request = RecipeRequest::custom(ingredients)?;
    let config = PlannerConfig::load()?;
    let api = RecipeApi::from_config(&config)?;
    let value = api.recipes.generate(&request).await.into_result()?;
    Ok(GeneratedRecipe::from_value(&value))
}
