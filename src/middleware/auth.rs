use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::state::AppState;

/// Verified caller identity, attached to the request by the auth guard.
///
/// `uid` is whatever subject id the identity provider vouched for. The raw
/// token is carried along because the account-deletion flow has to present
/// it back to the provider. Handlers must never take a user id from the
/// request body for identity-sensitive operations.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub uid: String,
    pub token: String,
}

/// Bearer-token guard for routes that require identity.
///
/// Verifies the `Authorization: Bearer <token>` header against the identity
/// provider and injects [`AuthUser`] into the request for downstream
/// handlers (and the per-user rate limit key).
pub async fn require_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).ok_or(AuthError::MissingToken)?;
    let uid = state.verifier.verify(token).await?;

    request.extensions_mut().insert(AuthUser {
        uid,
        token: token.to_string(),
    });

    Ok(next.run(request).await)
}

/// Optional identity for routes that serve both anonymous and signed-in
/// callers. No header resolves to `MaybeUser(None)`; a header that is
/// present but fails verification is still a hard 401.
pub struct MaybeUser(pub Option<AuthUser>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key("authorization") {
            return Ok(MaybeUser(None));
        }

        let token = extract_bearer(&parts.headers).ok_or(AuthError::MissingToken)?;
        let uid = state.verifier.verify(token).await?;

        Ok(MaybeUser(Some(AuthUser {
            uid,
            token: token.to_string(),
        })))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;

    if token.trim().is_empty() {
        None
    } else {
        Some(token)
    }
}
