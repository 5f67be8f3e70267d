use crate::{
    error::ApiError,
    state::{Recipe, ServiceState, User},
};

pub(crate) mod delete;
pub(crate) mod form;
pub(crate) mod get;
pub(crate) mod image;
pub(crate) mod list;
pub(crate) mod patch;
pub(crate) mod post;
pub(crate) mod public;
pub(crate) mod search;

/// Every recipe mutation goes through the same gate: structurally valid id,
/// record present, caller is the owner.
pub(crate) async fn fetch_owned(
    state: &ServiceState,
    user: &User,
    recipe_id: &str,
) -> Result<Recipe, ApiError> {
    let id = super::parse_id(recipe_id, "recipe")?;

    let Some(recipe) = state.get_recipe(&id).await? else {
        return Err(ApiError::NotFound(
            "The recipe you are looking for doesn't exist".to_string(),
        ));
    };

    if recipe.user_id != user.id {
        return Err(ApiError::Forbidden(
            "You are not authorized to access this recipe".to_string(),
        ));
    }

    Ok(recipe)
}
