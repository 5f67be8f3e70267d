use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::{
    error::ApiError,
    state::{ServiceState, User},
};

pub(crate) const SESSION_COOKIE: &str = "session";

/// Per-request identity, resolved from the session cookie. Extraction never
/// fails for missing or stale sessions; handlers that need a principal call
/// [`RequestContext::principal`] and get the 401 from there.
#[derive(Debug, Clone)]
pub(crate) struct RequestContext {
    user: Option<User>,
    session_id: Option<String>,
}

impl RequestContext {
    pub fn principal(&self) -> Result<&User, ApiError> {
        self.user
            .as_ref()
            .ok_or_else(|| ApiError::Unauthenticated("User not authenticated".to_string()))
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

impl FromRequestParts<Arc<ServiceState>> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServiceState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(RequestContext {
                user: None,
                session_id: None,
            });
        };

        let session_id = cookie.value().to_string();

        match state.get_session_user(&session_id).await {
            Ok(Some(user)) => Ok(RequestContext {
                user: Some(user),
                session_id: Some(session_id),
            }),
            Ok(None) => {
                debug!("Session cookie does not match a live session");
                Ok(RequestContext {
                    user: None,
                    session_id: None,
                })
            }
            Err(err) => Err(ApiError::Unexpected(err)),
        }
    }
}
