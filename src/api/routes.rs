use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::require_session;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Book routes -- require a live session token
    let book_routes = Router::new()
        .route(
            "/api/books",
            get(handlers::list_books)
                .post(handlers::create_book)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/books/:id",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book)
                .fallback(handlers::method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            require_session,
        ));

    // Public routes
    let public_routes = Router::new()
        .route(
            "/api/login",
            post(handlers::login).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/logout",
            post(handlers::logout).fallback(handlers::method_not_allowed),
        )
        .route(
            "/health",
            get(handlers::health).fallback(handlers::method_not_allowed),
        );

    Router::new()
        .merge(public_routes)
        .merge(book_routes)
        .fallback(handlers::route_not_found)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
