//! Route table. Cart routes are public; manager routes are admin-only
//! via the extractor on each handler.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{carts, managers, session};
use super::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(session::login))
        .route("/carts", get(carts::list_carts).post(carts::create_cart))
        .route(
            "/carts/{cart_id}",
            get(carts::get_cart)
                .put(carts::update_cart)
                .delete(carts::delete_cart),
        )
        .route("/carts/{cart_id}/status", put(carts::update_cart_status))
        .route("/carts/{cart_id}/complaints", post(carts::add_complaint))
        .route(
            "/carts/{cart_id}/complaints/{index}/resolve",
            put(carts::resolve_complaint),
        )
        .route("/carts/{cart_id}/reviews", post(carts::add_review))
        .route(
            "/managers",
            get(managers::list_managers).post(managers::create_manager),
        )
        .route(
            "/managers/by-email/{email}",
            get(managers::get_manager_by_email),
        )
        .route(
            "/managers/{id}",
            get(managers::get_manager)
                .put(managers::update_manager)
                .delete(managers::delete_manager),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
