//! User CRUD endpoints.
//!
//! Every handler follows the same shape: parse input, consult the store,
//! answer with the record or an [`ErrorPayload`]. Validation and not-found
//! outcomes are ordinary return values; only store failures propagate.

use http::header::{HeaderValue, LOCATION};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::AppState;
use crate::error::{ApiError, ErrorPayload};
use crate::store::User;
use crate::validation::validate_name;
use crate::{Request, Response, Status};

/// Body of create and update requests.
///
/// `status` is ignored on create (new users always start `Inactive`) and
/// applied on update.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserInput {
    #[schema(example = "Ann Marie Lee")]
    pub name: String,
    #[schema(example = "Active")]
    pub status: String,
}

fn user_id(req: &Request) -> Result<i64, ApiError> {
    req.param("id")
        .and_then(|raw| raw.parse().ok())
        .ok_or(ApiError::InvalidId)
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All users in insertion order", body = Vec<User>),
        (status = 401, description = "Missing or invalid token", body = ErrorPayload)
    )
)]
pub async fn list_users(req: Request) -> Result<Response, ApiError> {
    let state = req.state::<AppState>()?;
    Ok(Response::json(&state.store.list()?)?)
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 400, description = "Non-integer ID", body = ErrorPayload),
        (status = 401, description = "Missing or invalid token", body = ErrorPayload),
        (status = 404, description = "No such user", body = ErrorPayload)
    )
)]
pub async fn get_user(req: Request) -> Result<Response, ApiError> {
    let state = req.state::<AppState>()?;
    let id = user_id(&req)?;

    let user = state.store.get(id)?.ok_or(ApiError::UserNotFound(id))?;
    Ok(Response::json(&user)?)
}

/// Create a user
///
/// The name must contain at least three words. New users always start
/// `Inactive`, whatever status the request carries.
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    security(("bearer" = [])),
    request_body = UserInput,
    responses(
        (status = 201, description = "Created; `Location` points at the new user", body = User),
        (status = 400, description = "Validation failed or malformed body", body = ErrorPayload),
        (status = 401, description = "Missing or invalid token", body = ErrorPayload)
    )
)]
pub async fn create_user(mut req: Request) -> Result<Response, ApiError> {
    let state = req.state::<AppState>()?;
    let input: UserInput = req.json().await?;
    validate_name(&input.name)?;

    let user = state.store.add(input.name)?;
    info!(id = user.id, "user created");

    let location = HeaderValue::try_from(format!("/api/users/{}", user.id)).map_err(crate::Error::from)?;
    Ok(Response::builder()
        .status(Status::Created)
        .header(LOCATION, location)
        .json(&user)?)
}

/// Update a user
///
/// The user must exist; the new name must pass the same rule as on create.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "User ID")),
    request_body = UserInput,
    responses(
        (status = 200, description = "The updated user", body = User),
        (status = 400, description = "Validation failed or malformed body", body = ErrorPayload),
        (status = 401, description = "Missing or invalid token", body = ErrorPayload),
        (status = 404, description = "No such user", body = ErrorPayload)
    )
)]
pub async fn update_user(mut req: Request) -> Result<Response, ApiError> {
    let state = req.state::<AppState>()?;
    let id = user_id(&req)?;
    let input: UserInput = req.json().await?;

    if state.store.get(id)?.is_none() {
        return Err(ApiError::UserNotFound(id));
    }
    validate_name(&input.name)?;

    let user = state
        .store
        .update(id, input.name, input.status)?
        .ok_or(ApiError::UserNotFound(id))?;
    info!(id, "user updated");
    Ok(Response::json(&user)?)
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Non-integer ID", body = ErrorPayload),
        (status = 401, description = "Missing or invalid token", body = ErrorPayload),
        (status = 404, description = "No such user", body = ErrorPayload)
    )
)]
pub async fn delete_user(req: Request) -> Result<Status, ApiError> {
    let state = req.state::<AppState>()?;
    let id = user_id(&req)?;

    state.store.remove(id)?.ok_or(ApiError::UserNotFound(id))?;
    info!(id, "user deleted");
    Ok(Status::NoContent)
}
