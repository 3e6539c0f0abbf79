//! Handler for logging out.

use axum::{http::StatusCode, response::IntoResponse};
use axum_extra::extract::PrivateCookieJar;

use crate::auth::invalidate_auth_cookie;

/// Invalidate the auth cookie, logging the user out.
pub async fn post_log_out(jar: PrivateCookieJar) -> impl IntoResponse {
    (StatusCode::NO_CONTENT, invalidate_auth_cookie(jar))
}
