mod middleware;
mod posts;

use std::sync::Arc;

use axum::{Router, http::StatusCode, middleware as axum_middleware, routing::get};

use crate::application::error::HttpError;
use crate::application::posts::PostService;
use crate::application::repos::{StoreError, StoreErrorKind};

use middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub posts: Arc<PostService>,
}

impl HttpState {
    pub fn new(posts: PostService) -> Self {
        Self {
            posts: Arc::new(posts),
        }
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(posts::list_posts))
        .route("/post", get(posts::show_post))
        .route("/edit", get(posts::edit_post).post(posts::update_post))
        .route("/new", get(posts::new_post).post(posts::create_post))
        .route("/_health", get(posts::health))
        .fallback(posts::unknown_route)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

/// Map a store error to a response status and a public message that never
/// carries backend detail.
pub fn store_error_to_http(source: &'static str, err: StoreError) -> HttpError {
    let (status, public_message) = match (&err, err.kind()) {
        (_, StoreErrorKind::Validation) => (StatusCode::BAD_REQUEST, "Invalid post request"),
        (_, StoreErrorKind::NotFound) => (StatusCode::NOT_FOUND, "Post not found"),
        (StoreError::Timeout { .. }, _) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily unavailable",
        ),
        (_, StoreErrorKind::Store) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    };
    HttpError::from_error(source, status, public_message, &err)
}
