use uuid::Uuid;

use crate::domain::repository::{FavoriteRepository, RecipeRepository};
use crate::domain::types::Recipe;
use crate::error::ApiError;

// ── AddFavorite ──────────────────────────────────────────────────────────────

pub struct AddFavoriteUseCase<F: FavoriteRepository, R: RecipeRepository> {
    pub favorites: F,
    pub recipes: R,
}

impl<F: FavoriteRepository, R: RecipeRepository> AddFavoriteUseCase<F, R> {
    /// Favoriting a recipe twice is a conflict, not a no-op. The insert's
    /// return value arbitrates so concurrent duplicates land on the same
    /// answer.
    pub async fn execute(&self, user_id: Uuid, recipe_id: i64) -> Result<Recipe, ApiError> {
        let recipe = self
            .recipes
            .find_recipe(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;

        let inserted = self.favorites.insert(user_id, recipe_id).await?;
        if !inserted {
            return Err(ApiError::conflict("recipe already in favorites"));
        }

        Ok(recipe)
    }
}

// ── RemoveFavorite ───────────────────────────────────────────────────────────

pub struct RemoveFavoriteUseCase<F: FavoriteRepository, R: RecipeRepository> {
    pub favorites: F,
    pub recipes: R,
}

impl<F: FavoriteRepository, R: RecipeRepository> RemoveFavoriteUseCase<F, R> {
    pub async fn execute(&self, user_id: Uuid, recipe_id: i64) -> Result<(), ApiError> {
        self.recipes
            .find_recipe(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;

        let deleted = self.favorites.delete(user_id, recipe_id).await?;
        if !deleted {
            return Err(ApiError::conflict("recipe not in favorites"));
        }

        Ok(())
    }
}
