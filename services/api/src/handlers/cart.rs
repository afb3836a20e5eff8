use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use cookbook_identity::identity::Identity;

use crate::error::ApiError;
use crate::handlers::recipe::RecipeShortResponse;
use crate::infra::pdf::render_shopping_list;
use crate::state::AppState;
use crate::usecase::cart::{AddToCartUseCase, BuildShoppingListUseCase, RemoveFromCartUseCase};

// ── POST /recipes/{id}/shopping_cart ─────────────────────────────────────────

pub async fn add_to_shopping_cart(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeShortResponse>), ApiError> {
    let uc = AddToCartUseCase {
        carts: state.cart_repo(),
        recipes: state.recipe_repo(),
    };
    let recipe = uc.execute(identity.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

// ── DELETE /recipes/{id}/shopping_cart ───────────────────────────────────────

pub async fn remove_from_shopping_cart(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let uc = RemoveFromCartUseCase {
        carts: state.cart_repo(),
        recipes: state.recipe_repo(),
    };
    uc.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /recipes/download_shopping_cart ──────────────────────────────────────

pub async fn download_shopping_cart(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let uc = BuildShoppingListUseCase {
        carts: state.cart_repo(),
    };
    let items = uc.execute(identity.user_id).await?;
    // An empty cart still yields a valid document with only the title.
    let bytes = render_shopping_list(&items)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_cart.pdf\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
