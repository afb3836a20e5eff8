use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use cookbook_core::health::{healthz, readyz};
use cookbook_core::middleware::request_id_layer;

use crate::handlers::{
    cart::{add_to_shopping_cart, download_shopping_cart, remove_from_shopping_cart},
    catalog::{get_ingredient, get_ingredients, get_tag, get_tags},
    favorite::{add_favorite, remove_favorite},
    recipe::{create_recipe, delete_recipe, get_recipe, get_recipes, update_recipe},
    subscription::{get_subscriptions, subscribe, unsubscribe},
    user::{get_user, get_users},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Catalog
        .route("/tags", get(get_tags))
        .route("/tags/{id}", get(get_tag))
        .route("/ingredients", get(get_ingredients))
        .route("/ingredients/{id}", get(get_ingredient))
        // Recipes
        .route("/recipes", get(get_recipes))
        .route("/recipes", post(create_recipe))
        .route("/recipes/download_shopping_cart", get(download_shopping_cart))
        .route("/recipes/{id}", get(get_recipe))
        .route("/recipes/{id}", patch(update_recipe))
        .route("/recipes/{id}", delete(delete_recipe))
        // Favorites / shopping cart toggles
        .route("/recipes/{id}/favorite", post(add_favorite))
        .route("/recipes/{id}/favorite", delete(remove_favorite))
        .route("/recipes/{id}/shopping_cart", post(add_to_shopping_cart))
        .route("/recipes/{id}/shopping_cart", delete(remove_from_shopping_cart))
        // Users / subscriptions
        .route("/users", get(get_users))
        .route("/users/subscriptions", get(get_subscriptions))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/subscribe", post(subscribe))
        .route("/users/{id}/subscribe", delete(unsubscribe))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
