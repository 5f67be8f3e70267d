use crate::{context::SESSION_COOKIE, state::ServiceState};

pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod me;
pub(crate) mod signup;

/// Session cookie with the configured TTL. `HttpOnly` keeps it away from
/// page scripts; `Lax` still lets top-level navigation carry it.
pub(crate) fn session_cookie(state: &ServiceState, session_id: &str) -> String {
    let max_age = state.config.session_ttl_minutes * 60;
    format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}")
}

pub(crate) fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
