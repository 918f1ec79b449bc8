//! HTTP surface of the service.
//!
//! | Method | Path | Access |
//! |---|---|---|
//! | POST | `/api/auth/login` | anonymous |
//! | GET | `/api/users` | bearer token |
//! | GET | `/api/users/{id}` | bearer token |
//! | POST | `/api/users` | bearer token |
//! | PUT | `/api/users/{id}` | bearer token |
//! | DELETE | `/api/users/{id}` | bearer token |
//! | GET | `/healthz`, `/readyz` | anonymous |
//! | GET | `/swagger/v1/swagger.json` | anonymous |
//! | GET | `/`, `/swagger/…` (Swagger UI) | anonymous |

pub mod auth;
pub mod docs;
pub mod users;

use std::sync::Arc;

use crate::config::Account;
use crate::health;
use crate::method::Method;
use crate::router::{Access, Router};
use crate::store::UserStore;
use crate::token::TokenService;

/// Shared state every handler can reach through [`Request::state`](crate::Request::state).
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UserStore>,
    pub tokens: Arc<TokenService>,
    pub account: Arc<Account>,
}

/// All service routes with their access policies.
pub fn routes() -> Router {
    Router::new()
        .on(Method::Post, "/api/auth/login", auth::login)
        .guarded(Method::Get, "/api/users", Access::Authenticated, users::list_users)
        .guarded(Method::Get, "/api/users/{id}", Access::Authenticated, users::get_user)
        .guarded(Method::Post, "/api/users", Access::Authenticated, users::create_user)
        .guarded(Method::Put, "/api/users/{id}", Access::Authenticated, users::update_user)
        .guarded(Method::Delete, "/api/users/{id}", Access::Authenticated, users::delete_user)
        .on(Method::Get, "/healthz", health::liveness)
        .on(Method::Get, "/readyz", health::readiness)
        .on(Method::Get, docs::OPENAPI_PATH, docs::openapi_json)
        .on(Method::Get, "/", docs::root)
        .on(Method::Get, docs::SWAGGER_UI_PATH, docs::swagger_ui)
        .on(Method::Get, "/swagger/{*file}", docs::swagger_ui)
}
