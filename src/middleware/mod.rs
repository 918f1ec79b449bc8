//! Middleware layer.
//!
//! Middleware wraps every request in a fixed order and is the place for
//! cross-cutting concerns. A [`Pipeline`] is a [`Router`] plus an ordered
//! stack of layers; the first layer added is the outermost:
//!
//! ```text
//! request ─▶ recover ─▶ https ─▶ authenticate ─▶ authorize ─▶ logging ─▶ handler
//! response ◀──────────────────── same chain, in reverse ◀────────────────────┘
//! ```
//!
//! Routing happens *before* the first layer runs, so every layer already
//! knows the matched route's [`Access`](crate::Access) policy, and requests
//! for unknown paths still travel the whole chain down to a `404`.
//!
//! Built-in middleware:
//! - [`recover`]: turns failures and panics into a `500` payload
//! - [`https`]: redirects plain-HTTP requests to the HTTPS port
//! - [`auth`]: bearer-token authentication and route authorization
//! - [`logging`]: request/response logging with body capture

pub mod auth;
pub mod https;
pub mod logging;
pub mod recover;

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::Extensions;
use hyper::body::Body as HttpBody;
use tracing::error;

use crate::body::{Body, ResponseBody};
use crate::error::{ApiError, BoxError, ErrorPayload};
use crate::handler::{BoxFuture, BoxedHandler, Outcome};
use crate::request::Request;
use crate::router::{Access, Lookup, Router};

/// One layer of the pipeline.
///
/// Implementations receive the request and the rest of the chain; they may
/// answer early, or call [`Next::run`] and inspect what comes back.
pub trait Middleware: Send + Sync + 'static {
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Outcome>;
}

/// The remainder of the chain below the current layer.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    layers: &'a [Arc<dyn Middleware>],
    endpoint: &'a Endpoint,
}

impl Next<'_> {
    pub async fn run(self, req: Request) -> Outcome {
        match self.layers.split_first() {
            Some((layer, rest)) => {
                layer.handle(req, Next { layers: rest, endpoint: self.endpoint }).await
            }
            None => self.endpoint.call(req).await,
        }
    }
}

/// What the router resolved the request to.
enum Endpoint {
    Handler(BoxedHandler),
    MethodNotAllowed,
    NotFound,
}

impl Endpoint {
    async fn call(&self, req: Request) -> Outcome {
        match self {
            Self::Handler(handler) => handler.call(req).await,
            Self::MethodNotAllowed => ApiError::MethodNotAllowed {
                method: req.method().to_string(),
                path: req.path().to_owned(),
            }
            .into_outcome(),
            Self::NotFound => ApiError::RouteNotFound(req.path().to_owned()).into_outcome(),
        }
    }
}

/// A router wrapped in middleware: the single per-request entry point.
pub struct Pipeline {
    router: Router,
    layers: Vec<Arc<dyn Middleware>>,
    state: Extensions,
}

impl Pipeline {
    pub fn new(router: Router) -> Self {
        Self { router, layers: Vec::new(), state: Extensions::new() }
    }

    /// Appends a layer inside every layer added before it.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Shares `value` with every request, retrievable via [`Request::state`].
    pub fn state<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.state.insert(value);
        self
    }

    /// Runs one request through routing, every layer and the handler.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<ResponseBody>
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (mut parts, body) = req.into_parts();

        let (endpoint, access, params) = match self.router.lookup(&parts.method, parts.uri.path()) {
            Lookup::Found { handler, access, params } => (Endpoint::Handler(handler), access, params),
            Lookup::MethodNotAllowed => (Endpoint::MethodNotAllowed, Access::Anonymous, HashMap::new()),
            Lookup::NotFound => (Endpoint::NotFound, Access::Anonymous, HashMap::new()),
        };
        parts.extensions.extend(self.state.clone());

        let req = Request::new(parts, Body::from_stream(body), params, access);
        let next = Next { layers: &self.layers, endpoint: &endpoint };

        match next.run(req).await {
            Ok(response) => response.into_http(),
            // Only reachable when no recover layer is installed.
            Err(e) => {
                error!(error = %e, "unhandled error escaped the pipeline");
                ErrorPayload::internal(e.to_string()).into_response().into_http()
            }
        }
    }
}
