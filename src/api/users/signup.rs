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
pub(crate) struct SignupBody {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

const USERNAME_TAKEN: &str =
    "Username already taken. Please choose a different one or log in instead.";
const EMAIL_TAKEN: &str = "A user with this email address already exist. Please log in instead.";

/// The duplicate pre-checks can lose a race with a concurrent signup; the
/// unique indexes have the final word, so their violations still map to 409.
fn classify_create_error(err: anyhow::Error) -> ApiError {
    let detail = format!("{err:#}");
    if detail.contains("UNIQUE constraint failed: users.username") {
        ApiError::Conflict(USERNAME_TAKEN.to_string())
    } else if detail.contains("UNIQUE constraint failed: users.email") {
        ApiError::Conflict(EMAIL_TAKEN.to_string())
    } else {
        ApiError::Unexpected(err)
    }
}

pub(crate) async fn post(
    State(state): State<Arc<ServiceState>>,
    Json(body): Json<SignupBody>,
) -> Result<Response, ApiError> {
    let username = body.username.unwrap_or_default();
    let email = body.email.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("Parameters missing".to_string()));
    }

    if state.get_user_by_username(&username).await?.is_some() {
        return Err(ApiError::Conflict(USERNAME_TAKEN.to_string()));
    }

    if state.email_taken(&email).await? {
        return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password_hash = pwhash::bcrypt::hash(&password).map_err(anyhow::Error::from)?;

    let user = state
        .create_user(&username, &email, &password_hash)
        .await
        .map_err(classify_create_error)?;
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

    async fn send_signup(
        fixture: &ApiFixture,
        body: serde_json::Value,
    ) -> Result<axum::response::Response> {
        fixture
            .request(
                Request::builder()
                    .method("POST")
                    .uri("/api/users/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))?,
            )
            .await
    }

    #[test(tokio::test)]
    pub async fn signup_creates_user_and_session() -> Result<()> {
        let fixture = ApiFixture::new().await?;

        let res = send_signup(
            &fixture,
            json!({ "username": "alice", "email": "alice@example.com", "password": "hunter2" }),
        )
        .await?;

        assert_eq!(res.status(), StatusCode::CREATED);

        let cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie should be set")
            .to_str()?
            .to_string();
        assert!(cookie.starts_with("session="));
        assert!(cookie.contains("HttpOnly"));

        let user = ApiFixture::json(res).await?;
        assert_eq!(user["username"], "alice");
        assert_eq!(user["email"], "alice@example.com");
        // the hash stays server-side
        assert!(user.get("password_hash").is_none());

        fixture.teardown().await
    }

    #[test(tokio::test)]
    pub async fn signup_rejects_missing_parameters() -> Result<()> {
        let fixture = ApiFixture::new().await?;

        // blank fields and absent fields get the same answer
        for body in [
            json!({ "username": "alice", "email": " ", "password": "hunter2" }),
            json!({ "username": "alice" }),
            json!({}),
        ] {
            let res = send_signup(&fixture, body).await?;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);

            let body = ApiFixture::json(res).await?;
            assert_eq!(body["error"], "Parameters missing");
        }

        fixture.teardown().await
    }

    #[test]
    fn constraint_violations_map_to_conflict() {
        use crate::error::ApiError;

        let err = anyhow::anyhow!("UNIQUE constraint failed: users.username");
        let ApiError::Conflict(message) = super::classify_create_error(err) else {
            panic!("expected a conflict");
        };
        assert!(message.starts_with("Username already taken"));

        let err = anyhow::anyhow!("UNIQUE constraint failed: users.email");
        let ApiError::Conflict(message) = super::classify_create_error(err) else {
            panic!("expected a conflict");
        };
        assert!(message.contains("email address"));

        let err = anyhow::anyhow!("disk I/O error");
        assert!(matches!(
            super::classify_create_error(err),
            ApiError::Unexpected(_)
        ));
    }

    #[test(tokio::test)]
    pub async fn signup_rejects_duplicate_username_and_email() -> Result<()> {
        let fixture = ApiFixture::new().await?;

        let res = send_signup(
            &fixture,
            json!({ "username": "alice", "email": "alice@example.com", "password": "hunter2" }),
        )
        .await?;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = send_signup(
            &fixture,
            json!({ "username": "alice", "email": "other@example.com", "password": "hunter2" }),
        )
        .await?;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body = ApiFixture::json(res).await?;
        assert_eq!(
            body["error"],
            "Username already taken. Please choose a different one or log in instead."
        );

        let res = send_signup(
            &fixture,
            json!({ "username": "alice2", "email": "alice@example.com", "password": "hunter2" }),
        )
        .await?;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body = ApiFixture::json(res).await?;
        assert_eq!(
            body["error"],
            "A user with this email address already exist. Please log in instead."
        );

        fixture.teardown().await
    }
}
