use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;
use uuid::Uuid;

use cookbook_domain::pagination::PageRequest;
use cookbook_identity::identity::MaybeIdentity;

use crate::domain::types::{UserProfile, UserView};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::user::{GetUserUseCase, ListUsersUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl From<UserView> for UserResponse {
    fn from(view: UserView) -> Self {
        Self::from_profile(view.profile, view.is_subscribed)
    }
}

impl UserResponse {
    pub fn from_profile(profile: UserProfile, is_subscribed: bool) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            is_subscribed,
        }
    }
}

// ── GET /users ───────────────────────────────────────────────────────────────

pub async fn get_users(
    identity: MaybeIdentity,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let uc = ListUsersUseCase {
        users: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    let views = uc.execute(identity.user_id(), page.clamped()).await?;
    Ok(Json(views.into_iter().map(UserResponse::from).collect()))
}

// ── GET /users/{id} ──────────────────────────────────────────────────────────

pub async fn get_user(
    identity: MaybeIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let uc = GetUserUseCase {
        users: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    let view = uc.execute(identity.user_id(), id).await?;
    Ok(Json(view.into()))
}
