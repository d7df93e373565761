use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// Shared-secret guard for catalog-mutating routes.
///
/// Pulls `secretKey` out of the JSON body, checks it against the configured
/// admin credential, and removes it before the rest of the payload is
/// deserialized - the secret never reaches persistence logic. The key is
/// checked before the payload shape, so a bad key is always a 401 even when
/// the body is otherwise malformed.
pub struct AdminGuard<T>(pub T);

#[async_trait]
impl<T> FromRequest<AppState> for AdminGuard<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(mut value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|_| ApiError::bad_request("Invalid JSON body"))?;

        let supplied = value
            .get("secretKey")
            .and_then(Value::as_str)
            .unwrap_or_default();

        if !state.admin.authorize(supplied) {
            return Err(ApiError::unauthorized("Invalid secret key"));
        }

        if let Some(object) = value.as_object_mut() {
            object.remove("secretKey");
        }

        let body = serde_json::from_value(value)
            .map_err(|_| ApiError::bad_request("Invalid request body"))?;

        Ok(AdminGuard(body))
    }
}

/// Body type for admin routes whose payload is only the secret key.
#[derive(Debug, Default, serde::Deserialize)]
pub struct EmptyBody {}
