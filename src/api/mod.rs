use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::{blobs::MAX_IMAGE_BYTES, error::ApiError, state::ServiceState};

mod comments;
mod recipes;
mod users;

/// Multipart recipe forms carry text fields next to the image, so the body
/// limit sits a little above the blob cap itself.
pub(crate) const MAX_BODY_BYTES: usize = MAX_IMAGE_BYTES + 64 * 1024;

pub fn router(state: Arc<ServiceState>) -> Router {
    Router::new()
        .route(
            "/api/recipes",
            get(recipes::list::list).post(recipes::post::post),
        )
        .route("/api/recipes/search", get(recipes::search::search))
        .route(
            "/api/recipes/{recipe_id}",
            get(recipes::get::get)
                .patch(recipes::patch::patch)
                .delete(recipes::delete::delete),
        )
        .route("/api/recipes/{recipe_id}/image", get(recipes::image::get))
        .route("/api/public-recipes", get(recipes::public::list))
        .route("/api/comments", post(comments::post::post))
        .route(
            "/api/comments/{id}",
            get(comments::list::list).delete(comments::delete::delete),
        )
        .route("/api/users", get(users::me::get))
        .route("/api/users/signup", post(users::signup::post))
        .route("/api/users/login", post(users::login::post))
        .route("/api/users/logout", post(users::logout::post))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Identifiers arrive as path or body strings; anything that is not a UUID
/// is a malformed request, not a miss.
pub(crate) fn parse_id(value: &str, what: &str) -> Result<String, ApiError> {
    match Uuid::try_parse(value) {
        Ok(id) => Ok(id.as_hyphenated().to_string()),
        Err(_) => Err(ApiError::BadRequest(format!("Invalid {what} id"))),
    }
}
