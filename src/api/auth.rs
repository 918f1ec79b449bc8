//! Login endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::AppState;
use crate::error::{ApiError, ErrorPayload};
use crate::{Request, Response};

/// Login request body. Never stored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Credentials {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub message: String,
}

/// Authenticate and receive a bearer token
///
/// Any mismatch, unknown user or wrong password alike, is the same `401`.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = Credentials,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Malformed body", body = ErrorPayload),
        (status = 401, description = "Invalid username or password", body = ErrorPayload)
    )
)]
pub async fn login(mut req: Request) -> Result<Response, ApiError> {
    let state = req.state::<AppState>()?;
    let credentials: Credentials = req.json().await?;

    let account = &state.account;
    if credentials.username != account.username || credentials.password != account.password {
        warn!(username = %credentials.username, "login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let issued = state.tokens.issue(&credentials.username, &account.role)?;
    info!(username = %credentials.username, expires_at = %issued.expires_at, "token issued");

    Ok(Response::json(&LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        message: "Login successful".to_string(),
    })?)
}
