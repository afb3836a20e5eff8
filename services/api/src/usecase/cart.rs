use uuid::Uuid;

use crate::domain::repository::{CartRepository, RecipeRepository};
use crate::domain::shopping_list::{ShoppingListItem, aggregate};
use crate::domain::types::Recipe;
use crate::error::ApiError;

// ── AddToCart ────────────────────────────────────────────────────────────────

pub struct AddToCartUseCase<C: CartRepository, R: RecipeRepository> {
    pub carts: C,
    pub recipes: R,
}

impl<C: CartRepository, R: RecipeRepository> AddToCartUseCase<C, R> {
    pub async fn execute(&self, user_id: Uuid, recipe_id: i64) -> Result<Recipe, ApiError> {
        let recipe = self
            .recipes
            .find_recipe(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;

        let inserted = self.carts.insert(user_id, recipe_id).await?;
        if !inserted {
            return Err(ApiError::conflict("recipe already in shopping cart"));
        }

        Ok(recipe)
    }
}

// ── RemoveFromCart ───────────────────────────────────────────────────────────

pub struct RemoveFromCartUseCase<C: CartRepository, R: RecipeRepository> {
    pub carts: C,
    pub recipes: R,
}

impl<C: CartRepository, R: RecipeRepository> RemoveFromCartUseCase<C, R> {
    pub async fn execute(&self, user_id: Uuid, recipe_id: i64) -> Result<(), ApiError> {
        self.recipes
            .find_recipe(recipe_id)
            .await?
            .ok_or(ApiError::RecipeNotFound)?;

        let deleted = self.carts.delete(user_id, recipe_id).await?;
        if !deleted {
            return Err(ApiError::conflict("recipe not in shopping cart"));
        }

        Ok(())
    }
}

// ── BuildShoppingList ────────────────────────────────────────────────────────

pub struct BuildShoppingListUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> BuildShoppingListUseCase<C> {
    /// Pull every ingredient line of the user's cart and merge by
    /// (name, unit). An empty cart yields an empty list.
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<ShoppingListItem>, ApiError> {
        let lines = self.carts.ingredient_lines(user_id).await?;
        Ok(aggregate(&lines))
    }
}
