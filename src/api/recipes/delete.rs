use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::{context::RequestContext, error::ApiError, state::ServiceState};

pub(crate) async fn delete(
    Path(recipe_id): Path<String>,
    State(state): State<Arc<ServiceState>>,
    context: RequestContext,
) -> Result<StatusCode, ApiError> {
    let user = context.principal()?;

    let recipe = super::fetch_owned(&state, user, &recipe_id).await?;

    state.delete_recipe(&recipe.id).await?;

    // record is gone, so an orphaned blob is the only thing left to fail on
    if let Some(name) = &recipe.image_name {
        if let Err(err) = state.blobs.delete(name).await {
            return Err(ApiError::PartialFailure(format!(
                "Recipe deleted, but its image could not be removed: {err:#}"
            )));
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
