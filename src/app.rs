//! Composition root: wires configuration, state and middleware together.
//!
//! The layer order is fixed. Each layer sees the request after every layer
//! above it and the response before them:
//!
//! 1. [`Recover`]: anything below that fails or panics becomes a `500`
//! 2. [`HttpsRedirect`]
//! 3. [`Authenticate`]
//! 4. [`Authorize`]
//! 5. [`RequestLog`]: sees only requests that passed authorization
//! 6. the route handler

use std::sync::Arc;

use crate::api::{self, AppState};
use crate::config::Config;
use crate::middleware::Pipeline;
use crate::middleware::auth::{Authenticate, Authorize};
use crate::middleware::https::HttpsRedirect;
use crate::middleware::logging::RequestLog;
use crate::middleware::recover::Recover;
use crate::router::Router;
use crate::store::UserStore;
use crate::token::TokenService;

/// Shared state for `config`, backed by `store`.
pub fn state(config: &Config, store: Arc<UserStore>) -> AppState {
    AppState {
        store,
        tokens: Arc::new(TokenService::new(config.token.clone())),
        account: Arc::new(config.account.clone()),
    }
}

/// Wraps `router` in the standard middleware stack.
pub fn assemble(router: Router, config: &Config, state: AppState) -> Pipeline {
    Pipeline::new(router)
        .layer(Recover)
        .layer(HttpsRedirect::new(config.https_port))
        .layer(Authenticate::new(Arc::clone(&state.tokens)))
        .layer(Authorize)
        .layer(RequestLog)
        .state(state)
}

/// The full service over a freshly seeded store.
pub fn build(config: &Config) -> Pipeline {
    let state = state(config, Arc::new(UserStore::seeded()));
    assemble(api::routes(), config, state)
}
