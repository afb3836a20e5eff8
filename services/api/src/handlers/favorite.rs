use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use cookbook_identity::identity::Identity;

use crate::error::ApiError;
use crate::handlers::recipe::RecipeShortResponse;
use crate::state::AppState;
use crate::usecase::favorite::{AddFavoriteUseCase, RemoveFavoriteUseCase};

// ── POST /recipes/{id}/favorite ──────────────────────────────────────────────

pub async fn add_favorite(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeShortResponse>), ApiError> {
    let uc = AddFavoriteUseCase {
        favorites: state.favorite_repo(),
        recipes: state.recipe_repo(),
    };
    let recipe = uc.execute(identity.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

// ── DELETE /recipes/{id}/favorite ────────────────────────────────────────────

pub async fn remove_favorite(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let uc = RemoveFavoriteUseCase {
        favorites: state.favorite_repo(),
        recipes: state.recipe_repo(),
    };
    uc.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
