pub mod health;
pub mod home;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::{handlers as auth_handlers, require_auth};
use crate::curriculo::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Everything in here passes through token verification first.
    let protected = Router::new()
        .route("/rotaProtegida", get(auth_handlers::handle_protected_route))
        .route(
            "/curriculos",
            get(handlers::handle_list).post(handlers::handle_create),
        )
        .route(
            "/curriculos/pessoa/:nome",
            get(handlers::handle_find_by_nome),
        )
        .route(
            "/curriculos/:id",
            get(handlers::handle_get)
                .put(handlers::handle_update)
                .delete(handlers::handle_delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(home::welcome_handler))
        .route("/health", get(health::health_handler))
        .route("/signup", post(auth_handlers::handle_signup))
        .route("/login", post(auth_handlers::handle_login))
        .merge(protected)
        .with_state(state)
}
