#![allow(async_fn_in_trait)]

use uuid::Uuid;

use cookbook_domain::pagination::PageRequest;

use crate::domain::types::{
    Ingredient, IngredientLine, Recipe, RecipeDetail, RecipeDraft, RecipeFilter, RecipePatch, Tag,
    UserProfile,
};
use crate::error::ApiError;

/// Repository for user profiles.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, ApiError>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserProfile>, ApiError>;
    async fn list(&self, page: PageRequest) -> Result<Vec<UserProfile>, ApiError>;
}

/// Repository for the ingredient/tag reference catalog. Read-only.
pub trait CatalogRepository: Send + Sync {
    async fn list_tags(&self) -> Result<Vec<Tag>, ApiError>;
    async fn find_tag(&self, id: i64) -> Result<Option<Tag>, ApiError>;
    async fn find_tags_by_ids(&self, ids: &[i64]) -> Result<Vec<Tag>, ApiError>;

    /// List ingredients, optionally restricted to a case-insensitive name prefix.
    async fn list_ingredients(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, ApiError>;
    async fn find_ingredient(&self, id: i64) -> Result<Option<Ingredient>, ApiError>;
    async fn find_ingredients_by_ids(&self, ids: &[i64]) -> Result<Vec<Ingredient>, ApiError>;
}

/// Repository for recipes and their ingredient/tag associations.
pub trait RecipeRepository: Send + Sync {
    /// Insert the recipe row plus all association rows in one transaction.
    async fn create(&self, author_id: Uuid, draft: &RecipeDraft) -> Result<RecipeDetail, ApiError>;

    /// Apply a partial update in one transaction. Present sets are replaced
    /// wholesale (delete-all-then-reinsert); absent sets keep prior rows.
    async fn update(&self, recipe_id: i64, patch: &RecipePatch) -> Result<RecipeDetail, ApiError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<RecipeDetail>, ApiError>;

    /// Scalar recipe row only, without loading associations.
    async fn find_recipe(&self, id: i64) -> Result<Option<Recipe>, ApiError>;

    /// Newest-first page of recipes matching the filter.
    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Vec<RecipeDetail>, ApiError>;

    /// Delete a recipe. Returns `true` if a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, ApiError>;

    async fn count_by_author(&self, author_id: Uuid) -> Result<u64, ApiError>;

    /// Newest-first recipes of one author, optionally capped.
    async fn list_by_author(
        &self,
        author_id: Uuid,
        limit: Option<u64>,
    ) -> Result<Vec<Recipe>, ApiError>;
}

/// Repository for the favorites association.
pub trait FavoriteRepository: Send + Sync {
    /// Insert the (user, recipe) pair. Returns `false` when the pair already
    /// exists, including when a concurrent writer won the race — the storage
    /// uniqueness constraint arbitrates, not a prior read.
    async fn insert(&self, user_id: Uuid, recipe_id: i64) -> Result<bool, ApiError>;

    /// Delete the pair. Returns `true` if a row was deleted.
    async fn delete(&self, user_id: Uuid, recipe_id: i64) -> Result<bool, ApiError>;

    /// Subset of `recipe_ids` the user has favorited.
    async fn recipe_ids_for_user(
        &self,
        user_id: Uuid,
        recipe_ids: &[i64],
    ) -> Result<Vec<i64>, ApiError>;
}

/// Repository for the shopping-cart association. Same lifecycle as
/// favorites over an independent set, plus the aggregation read.
pub trait CartRepository: Send + Sync {
    async fn insert(&self, user_id: Uuid, recipe_id: i64) -> Result<bool, ApiError>;
    async fn delete(&self, user_id: Uuid, recipe_id: i64) -> Result<bool, ApiError>;
    async fn recipe_ids_for_user(
        &self,
        user_id: Uuid,
        recipe_ids: &[i64],
    ) -> Result<Vec<i64>, ApiError>;

    /// Every ingredient line of every recipe in the user's cart, in a
    /// deterministic order (cart insertion, then recipe, then line id) so
    /// the aggregator's first-occurrence ordering is stable.
    async fn ingredient_lines(&self, user_id: Uuid) -> Result<Vec<IngredientLine>, ApiError>;
}

/// Repository for follow edges between users.
pub trait SubscriptionRepository: Send + Sync {
    /// Insert the (follower, author) pair. Returns `false` when already present.
    async fn insert(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError>;

    /// Delete the pair. Returns `true` if a row was deleted.
    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, ApiError>;

    /// Subset of `author_ids` the user follows.
    async fn author_ids_for_user(
        &self,
        user_id: Uuid,
        author_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, ApiError>;

    /// Followed authors, most recently followed first.
    async fn list_authors(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<UserProfile>, ApiError>;
}
