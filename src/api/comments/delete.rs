use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::{context::RequestContext, error::ApiError, state::ServiceState};

/// Only the comment's author may delete it. The recipe owner has no say here.
pub(crate) async fn delete(
    Path(id): Path<String>,
    State(state): State<Arc<ServiceState>>,
    context: RequestContext,
) -> Result<StatusCode, ApiError> {
    let user = context.principal()?;

    let comment_id = crate::api::parse_id(&id, "comment")?;

    let Some(comment) = state.get_comment(&comment_id).await? else {
        return Err(ApiError::NotFound(
            "The comment you are looking for doesn't exist thus can't delete".to_string(),
        ));
    };

    if comment.user_id != user.id {
        return Err(ApiError::Forbidden(
            "You are not authorized to access this comment".to_string(),
        ));
    }

    state.delete_comment(&comment).await?;

    Ok(StatusCode::NO_CONTENT)
}
