use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{error::ApiError, state::ServiceState};

/// Absent fields deserialize to `None` so they fail the parameter check
/// with a 400 rather than a rejection from the JSON extractor.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginBody {
    username: Option<String>,
    password: Option<String>,
}

pub(crate) async fn post(
    State(state): State<Arc<ServiceState>>,
    Json(body): Json<LoginBody>,
) -> Result<Response, ApiError> {
    let username = body.username.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    if username.trim().is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("Parameters missing".to_string()));
    }

    // the same answer for "no such user" and "wrong password"
    let Some(user) = state.get_user_by_username(&username).await? else {
        return Err(ApiError::Unauthenticated("Invalid credentials".to_string()));
    };

    if !pwhash::bcrypt::verify(&password, &user.password_hash) {
        return Err(ApiError::Unauthenticated("Invalid credentials".to_string()));
    }

    let session = state.create_session(&user.id).await?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, super::session_cookie(&state, &session))],
        Json(user),
    )
        .into_response())
}

#[cfg(test)]
mod test {
    use anyhow::Result;
    use axum::{body::Body, http::{Request, StatusCode, header}};
    use serde_json::json;
    use test_log::test;

    use crate::tests::ApiFixture;

    async fn send_login(
        fixture: &ApiFixture,
        username: &str,
        password: &str,
    ) -> Result<axum::response::Response> {
        fixture
            .request(
                Request::builder()
                    .method("POST")
                    .uri("/api/users/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "username": username, "password": password }).to_string(),
                    ))?,
            )
            .await
    }

    #[test(tokio::test)]
    pub async fn login_issues_a_working_session() -> Result<()> {
        let fixture = ApiFixture::new().await?;
        fixture.signup("alice").await?;

        let res = send_login(&fixture, "alice", "alice-password").await?;
        assert_eq!(res.status(), StatusCode::CREATED);

        let cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie should be set")
            .to_str()?
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let res = fixture
            .request(
                Request::builder()
                    .uri("/api/recipes")
                    .header("Cookie", &cookie)
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(res.status(), StatusCode::OK);

        fixture.teardown().await
    }

    #[test(tokio::test)]
    pub async fn login_with_missing_fields_is_bad_request() -> Result<()> {
        let fixture = ApiFixture::new().await?;

        let res = fixture
            .request(
                Request::builder()
                    .method("POST")
                    .uri("/api/users/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "username": "alice" }).to_string()))?,
            )
            .await?;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = ApiFixture::json(res).await?;
        assert_eq!(body["error"], "Parameters missing");

        fixture.teardown().await
    }

    #[test(tokio::test)]
    pub async fn login_rejects_bad_credentials() -> Result<()> {
        let fixture = ApiFixture::new().await?;
        fixture.signup("alice").await?;

        // wrong password and unknown user look the same
        for (username, password) in [("alice", "wrong"), ("mallory", "alice-password")] {
            let res = send_login(&fixture, username, password).await?;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

            let body = ApiFixture::json(res).await?;
            assert_eq!(body["error"], "Invalid credentials");
        }

        fixture.teardown().await
    }
}
