use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::HeaderMap,
};
use tracing::warn;

use crate::{
    api::recipes::form::{RecipeForm, reject_oversized},
    context::RequestContext,
    error::ApiError,
    state::{Recipe, ServiceState},
};

pub(crate) async fn patch(
    Path(recipe_id): Path<String>,
    State(state): State<Arc<ServiceState>>,
    context: RequestContext,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Recipe>, ApiError> {
    let user = context.principal()?.clone();

    reject_oversized(&headers)?;

    let recipe = super::fetch_owned(&state, &user, &recipe_id).await?;

    let form = RecipeForm::from_multipart(multipart).await?;
    let title = form.require_title()?.to_string();

    // new image first, so the record never points at a missing blob
    let new_image_name = match &form.image {
        Some(upload) => Some(state.blobs.put(&upload.bytes, &upload.filename).await?),
        None => None,
    };

    let previous_image = recipe.image_name.clone();
    let image_name = new_image_name.clone().or_else(|| previous_image.clone());

    let next = Recipe {
        title,
        body: form.text.clone(),
        // omitted means "keep what was there", not "reset to the default"
        is_public: form.is_public.unwrap_or(recipe.is_public),
        has_image: image_name.is_some(),
        image_name,
        image_caption: form.image_desc.clone(),
        ..recipe
    };

    let updated = match state.update_recipe(&next).await {
        Ok(updated) => updated,
        Err(err) => {
            if let Some(name) = &new_image_name {
                if let Err(cleanup) = state.blobs.delete(name).await {
                    warn!("Failed to clean up blob after update failure: {cleanup:#}");
                }
            }
            return Err(err.into());
        }
    };

    // the record no longer references the old blob, so drop it last
    if new_image_name.is_some() {
        if let Some(old) = previous_image {
            if let Err(err) = state.blobs.delete(&old).await {
                return Err(ApiError::PartialFailure(format!(
                    "Recipe updated, but the previous image could not be removed: {err:#}"
                )));
            }
        }
    }

    Ok(Json(updated))
}
