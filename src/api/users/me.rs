use axum::Json;

use crate::{context::RequestContext, error::ApiError, state::User};

/// Who the session cookie belongs to.
pub(crate) async fn get(context: RequestContext) -> Result<Json<User>, ApiError> {
    Ok(Json(context.principal()?.clone()))
}
