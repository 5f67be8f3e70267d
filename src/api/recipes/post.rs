use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{
    api::recipes::form::{RecipeForm, reject_oversized},
    context::RequestContext,
    error::ApiError,
    state::ServiceState,
};

pub(crate) async fn post(
    State(state): State<Arc<ServiceState>>,
    context: RequestContext,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let user = context.principal()?.clone();

    reject_oversized(&headers)?;

    let form = RecipeForm::from_multipart(multipart).await?;
    let title = form.require_title()?.to_string();

    // the blob goes in first so the record never references a missing image
    let image_name = match &form.image {
        Some(upload) => Some(state.blobs.put(&upload.bytes, &upload.filename).await?),
        None => None,
    };

    let recipe = match state
        .insert_recipe(
            &user,
            &title,
            form.text.clone(),
            form.is_public.unwrap_or(true),
            image_name.clone(),
            form.image_desc.clone(),
        )
        .await
    {
        Ok(recipe) => recipe,
        Err(err) => {
            // the stored blob must not outlive the failed record insert
            if let Some(name) = &image_name {
                if let Err(cleanup) = state.blobs.delete(name).await {
                    warn!("Failed to clean up blob after insert failure: {cleanup:#}");
                }
            }
            return Err(err.into());
        }
    };

    Ok((StatusCode::CREATED, Json(recipe)).into_response())
}
