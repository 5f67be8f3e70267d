use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{context::RequestContext, error::ApiError, state::ServiceState};

pub(crate) async fn post(
    State(state): State<Arc<ServiceState>>,
    context: RequestContext,
) -> Result<Response, ApiError> {
    context.principal()?;

    if let Some(session_id) = context.session_id() {
        state.delete_session(session_id).await?;
    }

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, super::clear_session_cookie())],
    )
        .into_response())
}
