//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Each route also carries
//! its [`Access`] policy, which the authorization layer reads after the route
//! has been matched.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// Who may call a route.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Access {
    /// No credentials needed.
    #[default]
    Anonymous,
    /// Any caller with a verified bearer token.
    Authenticated,
    /// A verified caller whose role claim equals the given role.
    Role(&'static str),
}

struct Route {
    handler: BoxedHandler,
    access: Access,
}

/// The application router.
///
/// Build it once at startup and hand it to a [`Pipeline`](crate::Pipeline).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Route>>,
}

/// Result of matching a method + path against the router.
pub(crate) enum Lookup {
    Found {
        handler: BoxedHandler,
        access: Access,
        params: HashMap<String, String>,
    },
    MethodNotAllowed,
    NotFound,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register an anonymous handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use user_registry::{Access, Method, Request, Response, Router};
    /// # async fn login(_: Request) -> Response { Response::text("") }
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Post, "/api/auth/login", login)
    ///     .guarded(Method::Get, "/api/users/{id}", Access::Authenticated, get_user);
    /// ```
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, Access::Anonymous, handler)
    }

    /// Register a handler that only callers satisfying `access` may reach.
    pub fn guarded(self, method: Method, path: &str, access: Access, handler: impl Handler) -> Self {
        self.add(method, path, access, handler)
    }

    fn add(mut self, method: Method, path: &str, access: Access, handler: impl Handler) -> Self {
        let route = Route { handler: handler.into_boxed_handler(), access };
        self.routes
            .entry(method)
            .or_default()
            .insert(path, route)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(&self, method: &http::Method, path: &str) -> Lookup {
        let found = Method::try_from(method)
            .ok()
            .and_then(|method| self.routes.get(&method))
            .and_then(|tree| tree.at(path).ok());

        if let Some(matched) = found {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found {
                handler: Arc::clone(&matched.value.handler),
                access: matched.value.access,
                params,
            };
        }

        // The path exists under some other method.
        if self.routes.values().any(|tree| tree.at(path).is_ok()) {
            Lookup::MethodNotAllowed
        } else {
            Lookup::NotFound
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;

    async fn noop(_req: crate::Request) -> Status {
        Status::NoContent
    }

    fn router() -> Router {
        Router::new()
            .on(Method::Post, "/api/auth/login", noop)
            .guarded(Method::Get, "/api/users/{id}", Access::Authenticated, noop)
    }

    #[test]
    fn matches_params_and_carries_access() {
        let Lookup::Found { access, params, .. } = router().lookup(&http::Method::GET, "/api/users/12") else {
            panic!("expected a match");
        };
        assert_eq!(access, Access::Authenticated);
        assert_eq!(params.get("id").map(String::as_str), Some("12"));
    }

    #[test]
    fn known_path_with_wrong_method_is_not_allowed() {
        assert!(matches!(
            router().lookup(&http::Method::DELETE, "/api/auth/login"),
            Lookup::MethodNotAllowed
        ));
    }

    #[test]
    fn unknown_path_is_not_found() {
        assert!(matches!(router().lookup(&http::Method::GET, "/nope"), Lookup::NotFound));
    }

    #[test]
    fn extension_methods_never_match() {
        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        assert!(matches!(router().lookup(&purge, "/api/auth/login"), Lookup::MethodNotAllowed));
    }
}
