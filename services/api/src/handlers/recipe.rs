use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cookbook_domain::pagination::PageRequest;
use cookbook_identity::identity::{Identity, MaybeIdentity};

use crate::domain::repository::{
    CartRepository, FavoriteRepository, SubscriptionRepository, UserRepository,
};
use crate::domain::types::{RawAmount, RecipeDetail, RecipeFilter};
use crate::error::ApiError;
use crate::handlers::catalog::TagResponse;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::recipe::{
    CreateRecipeInput, CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeUseCase,
    ListRecipesUseCase, UpdateRecipeInput, UpdateRecipeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct IngredientLineResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Serialize)]
pub struct RecipeResponse {
    pub id: i64,
    pub author: UserResponse,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<IngredientLineResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    #[serde(serialize_with = "cookbook_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Abbreviated recipe body used by the favorite/cart toggles and the
/// subscription previews.
#[derive(Serialize)]
pub struct RecipeShortResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<crate::domain::types::Recipe> for RecipeShortResponse {
    fn from(recipe: crate::domain::types::Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: recipe.image,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Batch-assemble full recipe bodies: authors, viewer follow flags and the
/// viewer's favorite/cart membership are loaded once per page, not per row.
pub async fn to_responses(
    state: &AppState,
    viewer: Option<Uuid>,
    details: Vec<RecipeDetail>,
) -> Result<Vec<RecipeResponse>, ApiError> {
    let recipe_ids: Vec<i64> = details.iter().map(|d| d.recipe.id).collect();
    let mut author_ids: Vec<Uuid> = details.iter().map(|d| d.recipe.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let authors = state.user_repo().find_by_ids(&author_ids).await?;
    let (favorited, in_cart, followed) = match viewer {
        Some(viewer) => (
            state
                .favorite_repo()
                .recipe_ids_for_user(viewer, &recipe_ids)
                .await?,
            state
                .cart_repo()
                .recipe_ids_for_user(viewer, &recipe_ids)
                .await?,
            state
                .subscription_repo()
                .author_ids_for_user(viewer, &author_ids)
                .await?,
        ),
        None => (vec![], vec![], vec![]),
    };

    let mut responses = Vec::with_capacity(details.len());
    for detail in details {
        let author = authors
            .iter()
            .find(|a| a.id == detail.recipe.author_id)
            .cloned()
            .ok_or(ApiError::UserNotFound)?;
        let is_subscribed = followed.contains(&author.id);
        responses.push(RecipeResponse {
            id: detail.recipe.id,
            author: UserResponse::from_profile(author, is_subscribed),
            tags: detail.tags.into_iter().map(TagResponse::from).collect(),
            ingredients: detail
                .ingredients
                .into_iter()
                .map(|line| IngredientLineResponse {
                    id: line.ingredient_id,
                    name: line.name,
                    measurement_unit: line.measurement_unit,
                    amount: line.amount,
                })
                .collect(),
            is_favorited: favorited.contains(&detail.recipe.id),
            is_in_shopping_cart: in_cart.contains(&detail.recipe.id),
            name: detail.recipe.name,
            image: detail.recipe.image,
            text: detail.recipe.text,
            cooking_time: detail.recipe.cooking_time,
            created_at: detail.recipe.created_at,
        });
    }

    Ok(responses)
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct RecipeListQuery {
    #[serde(rename = "per-page")]
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub author: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

/// Accepts `1` and `true`; anything else (or absence) leaves the flag unset.
fn flag_set(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

/// Turn query params into a repository filter. The favorite/cart flags only
/// bind to a viewer id; for anonymous callers they are dropped rather than
/// rejected.
pub fn build_filter(query: &RecipeListQuery, viewer: Option<Uuid>) -> RecipeFilter {
    RecipeFilter {
        author: query.author,
        tag_slugs: query.tags.clone(),
        favorited_by: viewer.filter(|_| flag_set(query.is_favorited.as_deref())),
        in_cart_of: viewer.filter(|_| flag_set(query.is_in_shopping_cart.as_deref())),
    }
}

// ── GET /recipes ─────────────────────────────────────────────────────────────

pub async fn get_recipes(
    identity: MaybeIdentity,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    // serde_qs over RawQuery: `tags` is multi-valued, which axum's Query
    // extractor cannot parse.
    let query: RecipeListQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| ApiError::validation("malformed query string"))?
        .unwrap_or_default();

    let viewer = identity.user_id();
    let filter = build_filter(&query, viewer);
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    }
    .clamped();

    let uc = ListRecipesUseCase {
        recipes: state.recipe_repo(),
    };
    let details = uc.execute(&filter, page).await?;
    let responses = to_responses(&state, viewer, details).await?;
    Ok(Json(responses))
}

// ── GET /recipes/{id} ────────────────────────────────────────────────────────

pub async fn get_recipe(
    identity: MaybeIdentity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let uc = GetRecipeUseCase {
        recipes: state.recipe_repo(),
    };
    let detail = uc.execute(id).await?;
    let mut responses = to_responses(&state, identity.user_id(), vec![detail]).await?;
    Ok(Json(responses.remove(0)))
}

// ── POST /recipes ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IngredientEntry {
    pub id: i64,
    pub amount: RawAmount,
}

#[derive(Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub ingredients: Vec<IngredientEntry>,
    pub tags: Vec<i64>,
}

pub async fn create_recipe(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let uc = CreateRecipeUseCase {
        recipes: state.recipe_repo(),
        catalog: state.catalog_repo(),
    };
    let detail = uc
        .execute(
            identity.user_id,
            CreateRecipeInput {
                name: body.name,
                image: body.image,
                text: body.text,
                cooking_time: body.cooking_time,
                ingredients: body.ingredients.into_iter().map(|e| (e.id, e.amount)).collect(),
                tag_ids: body.tags,
            },
        )
        .await?;
    let mut responses = to_responses(&state, Some(identity.user_id), vec![detail]).await?;
    Ok((StatusCode::CREATED, Json(responses.remove(0))))
}

// ── PATCH /recipes/{id} ──────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<Vec<IngredientEntry>>,
    pub tags: Option<Vec<i64>>,
}

pub async fn update_recipe(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateRecipeRequest>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let uc = UpdateRecipeUseCase {
        recipes: state.recipe_repo(),
        catalog: state.catalog_repo(),
    };
    let detail = uc
        .execute(
            identity.user_id,
            id,
            UpdateRecipeInput {
                name: body.name,
                image: body.image,
                text: body.text,
                cooking_time: body.cooking_time,
                ingredients: body
                    .ingredients
                    .map(|entries| entries.into_iter().map(|e| (e.id, e.amount)).collect()),
                tag_ids: body.tags,
            },
        )
        .await?;
    let mut responses = to_responses(&state, Some(identity.user_id), vec![detail]).await?;
    Ok(Json(responses.remove(0)))
}

// ── DELETE /recipes/{id} ─────────────────────────────────────────────────────

pub async fn delete_recipe(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let uc = DeleteRecipeUseCase {
        recipes: state.recipe_repo(),
    };
    uc.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
