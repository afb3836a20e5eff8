use sea_orm::Database;
use tracing::info;

use cookbook_api::config::ApiConfig;
use cookbook_api::router::build_router;
use cookbook_api::state::AppState;

#[tokio::main]
async fn main() {
    cookbook_core::tracing::init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState { db };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
