use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
};
use tokio_util::io::ReaderStream;
use tracing::error;

use crate::{
    blobs::content_type_for,
    error::ApiError,
    state::ServiceState,
};

/// Serve a recipe's image. No session gate: image URLs are embedded in the
/// public recipe feed, so the bytes have to be reachable without a login.
pub(crate) async fn get(
    Path(recipe_id): Path<String>,
    State(state): State<Arc<ServiceState>>,
) -> Result<Response, ApiError> {
    let id = crate::api::parse_id(&recipe_id, "recipe")?;

    let Some(recipe) = state.get_recipe(&id).await? else {
        return Err(ApiError::NotFound(
            "The recipe you are looking for doesn't exist".to_string(),
        ));
    };

    let Some(name) = &recipe.image_name else {
        return Err(ApiError::NotFound(
            "This recipe has no image".to_string(),
        ));
    };

    let Some((file, size)) = state.blobs.open(name).await? else {
        // the record points at a blob that is gone, which means a cleanup
        // path failed at some point
        error!("Recipe {id} references missing blob {name}");
        return Err(ApiError::NotFound(
            "This recipe has no image".to_string(),
        ));
    };

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type_for(name))
        .header(header::CONTENT_LENGTH, size)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(anyhow::Error::from)?;

    Ok(response)
}
