use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    context::RequestContext,
    error::ApiError,
    state::{Recipe, ServiceState},
};

pub(crate) async fn get(
    Path(recipe_id): Path<String>,
    State(state): State<Arc<ServiceState>>,
    context: RequestContext,
) -> Result<Json<Recipe>, ApiError> {
    let user = context.principal()?;

    Ok(Json(super::fetch_owned(&state, user, &recipe_id).await?))
}

#[cfg(test)]
mod test {
    use anyhow::Result;
    use assert_json_diff::assert_json_include;
    use axum::{body::Body, http::{Request, StatusCode}};
    use serde_json::json;
    use test_log::test;

    use crate::tests::ApiFixture;

    #[test(tokio::test)]
    pub async fn get_rejects_malformed_id() -> Result<()> {
        let fixture = ApiFixture::new().await?;
        let alice = fixture.signup("alice").await?;

        let res = fixture
            .request(
                Request::builder()
                    .uri("/api/recipes/not-a-uuid")
                    .header("Cookie", &alice)
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        fixture.teardown().await
    }

    #[test(tokio::test)]
    pub async fn get_missing_recipe_is_not_found() -> Result<()> {
        let fixture = ApiFixture::new().await?;
        let alice = fixture.signup("alice").await?;

        let res = fixture
            .request(
                Request::builder()
                    .uri("/api/recipes/5f2c3b1a-0000-4000-8000-000000000000")
                    .header("Cookie", &alice)
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        fixture.teardown().await
    }

    #[test(tokio::test)]
    pub async fn get_is_gated_on_ownership() -> Result<()> {
        let fixture = ApiFixture::new().await?;

        let alice = fixture.signup("alice").await?;
        let bob = fixture.signup("bob").await?;

        let recipe = fixture
            .create_recipe(&alice, "Soup", None, None, None)
            .await?;
        let id = recipe["_id"].as_str().unwrap();

        let res = fixture
            .request(
                Request::builder()
                    .uri(format!("/api/recipes/{id}"))
                    .header("Cookie", &alice)
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(res.status(), StatusCode::OK);

        let body = ApiFixture::json(res).await?;
        assert_json_include!(
            actual: body,
            expected: json!({
                "title": "Soup",
                "author": "alice",
                "isPublic": true,
            })
        );

        // a public recipe is still private to its owner on this endpoint
        let res = fixture
            .request(
                Request::builder()
                    .uri(format!("/api/recipes/{id}"))
                    .header("Cookie", &bob)
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        fixture.teardown().await
    }
}
