//! Per-action controller tying the ingredient selection, the recipe
//! generator and the favorites store together.
//!
//! Every operation clears or sets the current error string and always leaves
//! the planner usable again, whichever way the remote call ended.

use log::warn;

use crate::builder::RecipeApi;
use crate::error::PlannerError;
use crate::ingredients::IngredientSelection;
use crate::model::{Favorite, GeneratedRecipe, Recipe};
use crate::recipes::RecipeRequest;

pub struct Planner {
    api: RecipeApi,
    pub selection: IngredientSelection,
    daily: Option<GeneratedRecipe>,
    custom: Option<GeneratedRecipe>,
    favorites: Vec<Favorite>,
    error: Option<String>,
}

impl Planner {
    pub fn new(api: RecipeApi) -> Self {
        Self {
            api,
            selection: IngredientSelection::new(),
            daily: None,
            custom: None,
            favorites: Vec::new(),
            error: None,
        }
    }

    pub fn daily(&self) -> Option<&GeneratedRecipe> {
        self.daily.as_ref()
    }

    pub fn custom(&self) -> Option<&GeneratedRecipe> {
        self.custom.as_ref()
    }

    pub fn favorites(&self) -> &[Favorite] {
        &self.favorites
    }

    /// Message for the last failed action, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn fail<T>(&mut self, err: PlannerError) -> Result<T, PlannerError> {
        self.error = Some(err.to_string());
        Err(err)
    }

    /// Fetch the recipe of the day.
    pub async fn load_daily(&mut self) -> Result<&GeneratedRecipe, PlannerError> {
        self.error = None;
        self.daily = None;

        match self.api.recipes.daily().await.into_result() {
            Ok(value) => Ok(self.daily.insert(GeneratedRecipe::from_value(&value))),
            Err(e) => self.fail(e),
        }
    }

    /// Generate a recipe from the selected ingredients.
    ///
    /// An empty selection fails with a validation message and no request.
    pub async fn generate_from_selected(&mut self) -> Result<&GeneratedRecipe, PlannerError> {
        let request = match RecipeRequest::custom(self.selection.selected()) {
            Ok(request) => request,
            Err(e) => return self.fail(e),
        };

        self.error = None;
        self.custom = None;

        match self.api.recipes.generate(&request).await.into_result() {
            Ok(value) => Ok(self.custom.insert(GeneratedRecipe::from_value(&value))),
            Err(e) => self.fail(e),
        }
    }

    /// Reload the favorites list. On failure the previous list is kept.
    pub async fn refresh_favorites(&mut self) -> Result<&[Favorite], PlannerError> {
        match self.api.favorites.list().await {
            Ok(favorites) => {
                self.favorites = favorites;
                Ok(&self.favorites)
            }
            Err(e) => {
                warn!("List favorites failed: {}", e);
                Err(e)
            }
        }
    }

    /// Save `recipe` and refresh the list.
    pub async fn add_favorite(&mut self, recipe: &Recipe) -> Result<Favorite, PlannerError> {
        let favorite = match self.api.favorites.add(recipe).await {
            Ok(favorite) => favorite,
            Err(e) => return self.fail(e),
        };
        // The add itself succeeded; a failed refresh only leaves the list stale
        let _ = self.refresh_favorites().await;
        Ok(favorite)
    }

    /// Delete the favorite with `id` and refresh the list.
    ///
    /// Confirming the intent is the caller's job.
    pub async fn remove_favorite(&mut self, id: &str) -> Result<(), PlannerError> {
        if let Err(e) = self.api.favorites.remove(id).await {
            return self.fail(e);
        }
        let _ = self.refresh_favorites().await;
        Ok(())
    }
}
