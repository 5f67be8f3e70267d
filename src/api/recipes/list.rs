use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    context::RequestContext,
    error::ApiError,
    state::{Recipe, ServiceState},
};

pub(crate) async fn list(
    State(state): State<Arc<ServiceState>>,
    context: RequestContext,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let user = context.principal()?;

    Ok(Json(state.list_recipes_for_user(&user.id).await?))
}
