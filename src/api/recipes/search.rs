use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    error::ApiError,
    state::{Recipe, ServiceState},
};

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    term: Option<String>,
}

/// Search the public feed. Like the feed itself, this needs no session.
pub(crate) async fn search(
    Query(query): Query<SearchQuery>,
    State(state): State<Arc<ServiceState>>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let term = query.term.as_deref().unwrap_or_default();
    if term.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Search term can not be empty!".to_string(),
        ));
    }

    let candidates = state.list_public_recipes().await?;

    Ok(Json(crate::search::rank(term, candidates)))
}
