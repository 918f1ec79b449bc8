//! Authentication and authorization.
//!
//! Two layers, in this order:
//!
//! - [`Authenticate`] never rejects. A valid bearer token puts an
//!   [`Identity`] into the request extensions; anything else leaves the
//!   request anonymous.
//! - [`Authorize`] compares that identity against the matched route's
//!   [`Access`] policy and answers `401` / `403` when it falls short.

use std::sync::Arc;

use http::header::{HeaderValue, WWW_AUTHENTICATE};
use tracing::debug;

use super::{Middleware, Next};
use crate::error::ApiError;
use crate::handler::{BoxFuture, Outcome};
use crate::request::Request;
use crate::router::Access;
use crate::token::{Identity, TokenService, bearer_token};

pub struct Authenticate {
    tokens: Arc<TokenService>,
}

impl Authenticate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    fn identify(&self, req: &Request) -> Option<Identity> {
        let header = req.header("authorization")?;
        let Some(token) = bearer_token(header) else {
            debug!("authorization header is not a bearer token");
            return None;
        };
        match self.tokens.verify(token) {
            Ok(claims) => Some(Identity::from(claims)),
            Err(e) => {
                debug!(reason = %e, "bearer token rejected");
                None
            }
        }
    }
}

impl Middleware for Authenticate {
    fn handle<'a>(&'a self, mut req: Request, next: Next<'a>) -> BoxFuture<'a, Outcome> {
        if let Some(identity) = self.identify(&req) {
            req.extensions_mut().insert(identity);
        }
        Box::pin(next.run(req))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Authorize;

impl Authorize {
    /// `Ok` when the caller may proceed, otherwise the error to answer with.
    fn check(access: Access, identity: Option<&Identity>) -> Result<(), ApiError> {
        match (access, identity) {
            (Access::Anonymous, _) => Ok(()),
            (_, None) => Err(ApiError::Unauthenticated),
            (Access::Authenticated, Some(_)) => Ok(()),
            (Access::Role(role), Some(identity)) if identity.role == role => Ok(()),
            (Access::Role(role), Some(_)) => Err(ApiError::Forbidden(role)),
        }
    }
}

impl Middleware for Authorize {
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Outcome> {
        let verdict = Self::check(req.access(), req.identity());
        match verdict {
            Ok(()) => Box::pin(next.run(req)),
            Err(denied) => {
                let challenge = matches!(denied, ApiError::Unauthenticated);
                let mut response = denied.payload().into_response();
                if challenge {
                    response.headers_mut().insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                }
                Box::pin(async move { Ok(response) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Identity {
        Identity { username: "admin".into(), role: "Admin".into() }
    }

    #[test]
    fn anonymous_routes_admit_everyone() {
        assert!(Authorize::check(Access::Anonymous, None).is_ok());
    }

    #[test]
    fn protected_routes_require_an_identity() {
        assert!(matches!(
            Authorize::check(Access::Authenticated, None),
            Err(ApiError::Unauthenticated)
        ));
        assert!(Authorize::check(Access::Authenticated, Some(&admin())).is_ok());
    }

    #[test]
    fn role_routes_compare_the_role_claim() {
        assert!(Authorize::check(Access::Role("Admin"), Some(&admin())).is_ok());

        let viewer = Identity { username: "v".into(), role: "Viewer".into() };
        assert!(matches!(
            Authorize::check(Access::Role("Admin"), Some(&viewer)),
            Err(ApiError::Forbidden("Admin"))
        ));
    }
}
