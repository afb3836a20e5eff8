use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cookbook_domain::pagination::PageRequest;
use cookbook_identity::identity::Identity;

use crate::domain::types::SubscribedAuthor;
use crate::error::ApiError;
use crate::handlers::recipe::RecipeShortResponse;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::subscription::{
    ListSubscriptionsUseCase, SubscribeUseCase, UnsubscribeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SubscribedAuthorResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes_count: u64,
    pub recipes: Vec<RecipeShortResponse>,
}

impl From<SubscribedAuthor> for SubscribedAuthorResponse {
    fn from(author: SubscribedAuthor) -> Self {
        Self {
            // The listing only ever contains followed authors.
            user: UserResponse::from_profile(author.profile, true),
            recipes_count: author.recipes_count,
            recipes: author
                .recipes
                .into_iter()
                .map(RecipeShortResponse::from)
                .collect(),
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct SubscriptionQuery {
    #[serde(rename = "per-page")]
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub recipes_limit: Option<u64>,
}

// ── GET /users/subscriptions ─────────────────────────────────────────────────

pub async fn get_subscriptions(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<Json<Vec<SubscribedAuthorResponse>>, ApiError> {
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    }
    .clamped();

    let uc = ListSubscriptionsUseCase {
        subscriptions: state.subscription_repo(),
        recipes: state.recipe_repo(),
    };
    let authors = uc
        .execute(identity.user_id, page, query.recipes_limit)
        .await?;
    Ok(Json(
        authors
            .into_iter()
            .map(SubscribedAuthorResponse::from)
            .collect(),
    ))
}

// ── POST /users/{id}/subscribe ───────────────────────────────────────────────

pub async fn subscribe(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<(StatusCode, Json<SubscribedAuthorResponse>), ApiError> {
    let uc = SubscribeUseCase {
        subscriptions: state.subscription_repo(),
        users: state.user_repo(),
        recipes: state.recipe_repo(),
    };
    let author = uc
        .execute(identity.user_id, id, query.recipes_limit)
        .await?;
    Ok((StatusCode::CREATED, Json(author.into())))
}

// ── DELETE /users/{id}/subscribe ─────────────────────────────────────────────

pub async fn unsubscribe(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let uc = UnsubscribeUseCase {
        subscriptions: state.subscription_repo(),
        users: state.user_repo(),
    };
    uc.execute(identity.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
