//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router needs to hold handlers of *different* types in a single
//! `HashMap<Method, Tree>`. Rust collections can only hold one concrete type,
//! so we use **trait objects** (`dyn ErasedHandler`) to hide the concrete
//! handler type behind a common interface and store everything uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn get_user(req: Request) -> Result<Response, ApiError> { … }
//!        ↓ router.on(Method::Get, "/api/users/{id}", get_user)
//! get_user.into_boxed_handler()                    ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(get_user))                    ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time               ← one vtable dispatch
//!        ↓
//! Box::pin(async { get_user(req).await.into_outcome() })  ← BoxFuture
//! ```
//!
//! A handler's return value becomes an [`Outcome`]: plain responses and
//! client errors become `Ok(Response)`, unexpected failures stay `Err` and
//! travel outward to the error boundary.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{ApiError, Error};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased, `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What every handler and middleware produces: a response, or a failure
/// nobody downstream could answer.
pub type Outcome = Result<Response, Error>;

// ── IntoOutcome ───────────────────────────────────────────────────────────────

/// Conversion of a handler's return value into an [`Outcome`].
pub trait IntoOutcome {
    fn into_outcome(self) -> Outcome;
}

impl<T: IntoResponse> IntoOutcome for T {
    fn into_outcome(self) -> Outcome { Ok(self.into_response()) }
}

impl<T: IntoResponse> IntoOutcome for Result<T, ApiError> {
    fn into_outcome(self) -> Outcome {
        match self {
            Ok(value) => Ok(value.into_response()),
            Err(e) => e.into_outcome(),
        }
    }
}

impl<T: IntoResponse> IntoOutcome for Result<T, Error> {
    fn into_outcome(self) -> Outcome { self.map(IntoResponse::into_response) }
}

// ── Internal types ────────────────────────────────────────────────────────────

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<'static, Outcome>;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoOutcome
/// ```
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<'static, Outcome> {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_outcome() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::test_support::request;
    use crate::status::Status;

    async fn ok(_req: Request) -> Status {
        Status::NoContent
    }

    async fn not_found(_req: Request) -> Result<Response, ApiError> {
        Err(ApiError::UserNotFound(7))
    }

    async fn broken(_req: Request) -> Result<Response, Error> {
        Err(Error::Handler("boom".into()))
    }

    #[tokio::test]
    async fn plain_values_become_responses() {
        let outcome = ok.into_boxed_handler().call(request("GET", "/", "")).await;
        assert_eq!(outcome.unwrap().status_code(), http::StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn client_errors_become_payload_responses() {
        let outcome = not_found.into_boxed_handler().call(request("GET", "/", "")).await;
        assert_eq!(outcome.unwrap().status_code(), http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn infrastructure_errors_stay_errors() {
        let outcome = broken.into_boxed_handler().call(request("GET", "/", "")).await;
        assert!(matches!(outcome, Err(Error::Handler(_))));
    }
}
