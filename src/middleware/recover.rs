//! Global error boundary.
//!
//! Installed outermost, so failures in every other layer — redirect,
//! authentication, logging — land here too. Both kinds of failure are
//! caught: an [`Error`](crate::Error) returned up the chain, and a panic
//! raised while the chain was being polled. Either way the client gets the
//! standard `500` [`ErrorPayload`] and the full failure goes to the log.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::error;

use super::{Middleware, Next};
use crate::error::ErrorPayload;
use crate::handler::{BoxFuture, Outcome};
use crate::request::Request;

#[derive(Clone, Copy, Debug, Default)]
pub struct Recover;

impl Recover {
    async fn guard(&self, req: Request, next: Next<'_>) -> Outcome {
        let method = req.method().clone();
        let path = req.path().to_owned();

        let details = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
            Ok(Ok(response)) => return Ok(response),
            Ok(Err(e)) => {
                error!(%method, %path, error = %e, error.debug = ?e, "an unhandled error occurred");
                e.to_string()
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(%method, %path, panic = %message, "a handler panicked");
                message
            }
        };

        Ok(ErrorPayload::internal(details).into_response())
    }
}

impl Middleware for Recover {
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Outcome> {
        Box::pin(self.guard(req, next))
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_static_and_formatted_panic_messages() {
        let payload = std::panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let id = 7;
        let payload = std::panic::catch_unwind(|| panic!("user {id} exploded")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "user 7 exploded");
    }

    #[test]
    fn opaque_payloads_get_a_generic_message() {
        let payload = std::panic::catch_unwind(|| std::panic::panic_any(42_u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "handler panicked");
    }
}
