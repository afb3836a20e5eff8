use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::domain::types::{Ingredient, Tag};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::catalog::{
    GetIngredientUseCase, GetTagUseCase, ListIngredientsUseCase, ListTagsUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        }
    }
}

#[derive(Serialize)]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

// ── GET /tags ────────────────────────────────────────────────────────────────

pub async fn get_tags(State(state): State<AppState>) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let uc = ListTagsUseCase {
        catalog: state.catalog_repo(),
    };
    let tags = uc.execute().await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

// ── GET /tags/{id} ───────────────────────────────────────────────────────────

pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TagResponse>, ApiError> {
    let uc = GetTagUseCase {
        catalog: state.catalog_repo(),
    };
    let tag = uc.execute(id).await?;
    Ok(Json(tag.into()))
}

// ── GET /ingredients ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct IngredientListQuery {
    pub name: Option<String>,
}

pub async fn get_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientListQuery>,
) -> Result<Json<Vec<IngredientResponse>>, ApiError> {
    let uc = ListIngredientsUseCase {
        catalog: state.catalog_repo(),
    };
    let ingredients = uc.execute(query.name.as_deref()).await?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

// ── GET /ingredients/{id} ────────────────────────────────────────────────────

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IngredientResponse>, ApiError> {
    let uc = GetIngredientUseCase {
        catalog: state.catalog_repo(),
    };
    let ingredient = uc.execute(id).await?;
    Ok(Json(ingredient.into()))
}
