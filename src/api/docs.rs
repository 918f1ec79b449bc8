//! OpenAPI document and the Swagger UI that renders it.
//!
//! The UI lives under [`SWAGGER_UI_PATH`]; the site root redirects there.

use std::sync::Arc;

use http::header::{HeaderValue, LOCATION};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::Config as SwaggerConfig;

use super::auth::{self, Credentials, LoginResponse};
use super::users::{self, UserInput};
use crate::error::{ApiError, ErrorPayload};
use crate::store::User;
use crate::{Error, Request, Response, Status};

pub const OPENAPI_PATH: &str = "/swagger/v1/swagger.json";
pub const SWAGGER_UI_PATH: &str = "/swagger/";

const DOCUMENT_TITLE: &str = "User Management API - Swagger UI";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Management API",
        version = "v1",
        description = "A RESTful API for managing user records with JWT authentication",
        contact(name = "jrigo23", url = "https://github.com/jrigo23/UserManagementAPI")
    ),
    paths(
        auth::login,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
    ),
    components(schemas(User, UserInput, Credentials, LoginResponse, ErrorPayload)),
    modifiers(&BearerScheme),
    tags(
        (name = "Authentication", description = "Token issuance"),
        (name = "Users", description = "User records; every route needs a bearer token")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme the user routes refer to.
struct BearerScheme;

impl Modify for BearerScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("JWT Authorization header using the Bearer scheme. Example: \"Authorization: Bearer {token}\""))
                    .build(),
            ),
        );
    }
}

pub async fn openapi_json(_req: Request) -> Result<Response, ApiError> {
    Ok(Response::json(&ApiDoc::openapi())?)
}

/// `/` → the Swagger UI.
pub async fn root(_req: Request) -> Response {
    Response::builder()
        .status(Status::TemporaryRedirect)
        .header(LOCATION, HeaderValue::from_static(SWAGGER_UI_PATH))
        .no_body()
}

/// Serves a bundled Swagger UI file; the `file` path parameter is empty for
/// the index page.
pub async fn swagger_ui(req: Request) -> Result<Response, ApiError> {
    let file = req.param("file").unwrap_or_default();
    let config = Arc::new(SwaggerConfig::new([OPENAPI_PATH]));

    let asset = utoipa_swagger_ui::serve(file, config)
        .map_err(|e| Error::SwaggerUi(e.to_string()))?
        .ok_or_else(|| ApiError::RouteNotFound(req.path().to_owned()))?;

    let content_type = HeaderValue::try_from(asset.content_type).map_err(Error::from)?;
    let bytes = asset.bytes.into_owned();
    let body = if file.is_empty() || file == "index.html" { with_title(bytes) } else { bytes };

    Ok(Response::builder().body(content_type, body))
}

/// Replaces the bundled page title with the service's own.
fn with_title(index: Vec<u8>) -> Vec<u8> {
    match String::from_utf8(index) {
        Ok(html) => html.replacen("<title>Swagger UI</title>", &format!("<title>{DOCUMENT_TITLE}</title>"), 1).into_bytes(),
        Err(e) => e.into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_and_the_bearer_scheme() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        for path in ["/api/auth/login", "/api/users", "/api/users/{id}"] {
            assert!(doc["paths"].get(path).is_some(), "missing {path}");
        }
        assert_eq!(doc["components"]["securitySchemes"]["bearer"]["scheme"], "bearer");
        assert!(doc["components"]["schemas"].get("ErrorPayload").is_some());
        assert_eq!(doc["info"]["contact"]["name"], "jrigo23");
    }

    #[test]
    fn index_page_carries_the_service_title() {
        let page = with_title(b"<html><title>Swagger UI</title></html>".to_vec());
        assert_eq!(page, b"<html><title>User Management API - Swagger UI</title></html>");
    }
}
