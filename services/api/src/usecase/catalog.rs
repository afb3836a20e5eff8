use crate::domain::repository::CatalogRepository;
use crate::domain::types::{Ingredient, Tag};
use crate::error::ApiError;

// ── ListTags ─────────────────────────────────────────────────────────────────

pub struct ListTagsUseCase<C: CatalogRepository> {
    pub catalog: C,
}

impl<C: CatalogRepository> ListTagsUseCase<C> {
    pub async fn execute(&self) -> Result<Vec<Tag>, ApiError> {
        self.catalog.list_tags().await
    }
}

// ── GetTag ───────────────────────────────────────────────────────────────────

pub struct GetTagUseCase<C: CatalogRepository> {
    pub catalog: C,
}

impl<C: CatalogRepository> GetTagUseCase<C> {
    pub async fn execute(&self, id: i64) -> Result<Tag, ApiError> {
        self.catalog
            .find_tag(id)
            .await?
            .ok_or(ApiError::TagNotFound)
    }
}

// ── ListIngredients ──────────────────────────────────────────────────────────

pub struct ListIngredientsUseCase<C: CatalogRepository> {
    pub catalog: C,
}

impl<C: CatalogRepository> ListIngredientsUseCase<C> {
    pub async fn execute(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, ApiError> {
        self.catalog.list_ingredients(name_prefix).await
    }
}

// ── GetIngredient ────────────────────────────────────────────────────────────

pub struct GetIngredientUseCase<C: CatalogRepository> {
    pub catalog: C,
}

impl<C: CatalogRepository> GetIngredientUseCase<C> {
    pub async fn execute(&self, id: i64) -> Result<Ingredient, ApiError> {
        self.catalog
            .find_ingredient(id)
            .await?
            .ok_or(ApiError::IngredientNotFound)
    }
}
