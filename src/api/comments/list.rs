use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    error::ApiError,
    state::{Comment, ServiceState},
};

/// Comments of a recipe, oldest first. Readable without a session, since the
/// public feed shows them.
pub(crate) async fn list(
    Path(id): Path<String>,
    State(state): State<Arc<ServiceState>>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let recipe_id = crate::api::parse_id(&id, "recipe")?;

    Ok(Json(state.list_comments(&recipe_id).await?))
}

#[cfg(test)]
mod test {
    use anyhow::Result;
    use axum::{body::Body, http::{Request, StatusCode, header}};
    use serde_json::json;
    use test_log::test;

    use crate::tests::ApiFixture;

    #[test(tokio::test)]
    pub async fn comments_list_resolves_authors() -> Result<()> {
        let fixture = ApiFixture::new().await?;

        let alice = fixture.signup("alice").await?;
        let bob = fixture.signup("bob").await?;

        let recipe = fixture.create_recipe(&alice, "Soup", None, None, None).await?;
        let id = recipe["_id"].as_str().unwrap();

        for (cookie, text) in [(&alice, "first!"), (&bob, "needs salt")] {
            let res = fixture
                .request(
                    Request::builder()
                        .method("POST")
                        .uri("/api/comments")
                        .header("Cookie", cookie.as_str())
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(
                            json!({ "text": text, "recipe": id }).to_string(),
                        ))?,
                )
                .await?;
            assert_eq!(res.status(), StatusCode::CREATED);
        }

        // no session needed to read them
        let res = fixture
            .request(
                Request::builder()
                    .uri(format!("/api/comments/{id}"))
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(res.status(), StatusCode::OK);

        let comments = ApiFixture::json(res).await?;
        let comments = comments.as_array().unwrap();

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0]["text"], "first!");
        assert_eq!(comments[0]["author"], "alice");
        assert_eq!(comments[1]["text"], "needs salt");
        assert_eq!(comments[1]["author"], "bob");

        fixture.teardown().await
    }

    #[test(tokio::test)]
    pub async fn comments_list_rejects_malformed_ids() -> Result<()> {
        let fixture = ApiFixture::new().await?;

        let res = fixture
            .request(
                Request::builder()
                    .uri("/api/comments/not-a-uuid")
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = ApiFixture::json(res).await?;
        assert_eq!(body["error"], "Invalid recipe id");

        fixture.teardown().await
    }
}
