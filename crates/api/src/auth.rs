use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::json;
use tracing::debug;

use crate::AppState;

/// Middleware that enforces HTTP Basic authentication on the data routes.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let authorized = basic_credentials(&headers)
        .map(|(user, pass)| {
            // Evaluate both so timing does not reveal which half was wrong.
            let user_ok = constant_time_eq(user.as_bytes(), state.app_user.as_bytes());
            let pass_ok = constant_time_eq(pass.as_bytes(), state.app_pass.as_bytes());
            user_ok & pass_ok
        })
        .unwrap_or(false);

    if authorized {
        next.run(request).await
    } else {
        debug!(path = %request.uri().path(), "Rejected unauthenticated request");
        (
            StatusCode::UNAUTHORIZED,
            [(WWW_AUTHENTICATE, "Basic")],
            Json(json!({"error": "unauthorized"})),
        )
            .into_response()
    }
}

/// Decode `Authorization: Basic <base64(user:pass)>`.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let encoded = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Basic ")?
        .trim();
    let decoded = String::from_utf8(STANDARD.decode(encoded).ok()?).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Byte comparison whose running time depends only on the lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
