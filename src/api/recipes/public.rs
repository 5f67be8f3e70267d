use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    error::ApiError,
    state::{Recipe, ServiceState},
};

/// The public feed. Anyone can read it, signed in or not.
pub(crate) async fn list(
    State(state): State<Arc<ServiceState>>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    Ok(Json(state.list_public_recipes().await?))
}

#[cfg(test)]
mod test {
    use anyhow::Result;
    use axum::{body::Body, http::{Request, StatusCode}};
    use test_log::test;

    use crate::tests::ApiFixture;

    #[test(tokio::test)]
    pub async fn public_feed_skips_private_recipes() -> Result<()> {
        let fixture = ApiFixture::new().await?;

        let alice = fixture.signup("alice").await?;
        let bob = fixture.signup("bob").await?;

        fixture
            .create_recipe(&alice, "Soup", None, Some(true), None)
            .await?;
        fixture
            .create_recipe(&alice, "Secret cake", None, Some(false), None)
            .await?;
        fixture
            .create_recipe(&bob, "Toast", None, Some(true), None)
            .await?;

        // no cookie on purpose
        let res = fixture
            .request(
                Request::builder()
                    .uri("/api/public-recipes")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(res.status(), StatusCode::OK);

        let recipes = ApiFixture::json(res).await?;
        let titles: Vec<&str> = recipes
            .as_array()
            .unwrap()
            .iter()
            .map(|recipe| recipe["title"].as_str().unwrap())
            .collect();

        assert_eq!(titles.len(), 2);
        assert!(titles.contains(&"Soup"));
        assert!(titles.contains(&"Toast"));

        fixture.teardown().await
    }
}
