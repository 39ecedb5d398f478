use axum::{
    Router,
    http::{Method, header::{AUTHORIZATION, CONTENT_TYPE}},
    middleware,
    routing::{delete, get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{assistant, auth, history, queries, shares};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/share/{token}", get(shares::get_share))
        .route("/share/{token}", get(shares::share_page));

    let protected_routes = Router::new()
        .route("/api/queries", get(queries::list_queries).post(queries::create_query))
        .route("/api/queries/{id}", get(queries::get_query).delete(queries::delete_query))
        .route("/api/queries/update/{id}", post(queries::update_query))
        .route("/api/queries/share/{id}", post(shares::create_share))
        .route("/api/history", get(history::list_history))
        .route("/api/history/all", delete(history::clear_history))
        .route("/api/history/{id}", delete(history::delete_history_entry))
        .route("/api/ai/{action}", post(assistant::assist))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
