use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{context::RequestContext, error::ApiError, state::ServiceState};

/// Absent fields deserialize to `None` so they fail validation with a 400
/// rather than a rejection from the JSON extractor.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateCommentBody {
    text: Option<String>,
    recipe: Option<String>,
}

/// Any signed-in user can comment, on their own recipes or anyone else's.
pub(crate) async fn post(
    State(state): State<Arc<ServiceState>>,
    context: RequestContext,
    Json(body): Json<CreateCommentBody>,
) -> Result<Response, ApiError> {
    let user = context.principal()?.clone();

    let text = body.text.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "The comment can not be empty!".to_string(),
        ));
    }

    let recipe_id = crate::api::parse_id(body.recipe.as_deref().unwrap_or_default(), "recipe")?;

    if state.get_recipe(&recipe_id).await?.is_none() {
        return Err(ApiError::NotFound(
            "Recipe not found, cannot push the comment".to_string(),
        ));
    }

    let comment = state.insert_comment(&user, &recipe_id, &text).await?;

    Ok((StatusCode::CREATED, Json(comment)).into_response())
}
