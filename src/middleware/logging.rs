//! Request/response logging.
//!
//! Logs every request on the way in and its response on the way out,
//! including both bodies, without changing what the client receives.
//!
//! # Bodies are read twice
//!
//! Both bodies may arrive as streams, and a stream can only be drained once.
//! If the logger drained the request body, the handler would see nothing; if
//! it drained the response body, the client would. So each body is first
//! [buffered](crate::Body::buffer): the stream is collected into memory and
//! the collected bytes are put back in its place. The logger reads a cheap
//! clone of those bytes; the handler (or hyper) reads the same bytes again.
//!
//! # Every exit path
//!
//! The response body is moved out, buffered and moved back exactly once, and
//! only when downstream produced a response. When downstream fails — an
//! `Err` or a panic — there is no response body to capture: the failure
//! passes through untouched, the "after" line is skipped, and the error
//! boundary logs it once.
//!
//! Elapsed time runs from entry until downstream returns; buffering the
//! response body afterwards is not counted.
//!
//! Bodies are logged verbatim, credentials included.

use std::borrow::Cow;
use std::time::Instant;

use tracing::info;

use super::{Middleware, Next};
use crate::handler::{BoxFuture, Outcome};
use crate::request::Request;

/// Logged in place of a missing header or an empty body.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Clone, Copy, Debug, Default)]
pub struct RequestLog;

impl RequestLog {
    async fn observe(&self, mut req: Request, next: Next<'_>) -> Outcome {
        let started = Instant::now();

        let body = if declares_body(&req) {
            req.body_mut().buffer().await?
        } else {
            Default::default()
        };

        let method = req.method().clone();
        let path = req.path().to_owned();
        info!(
            %method,
            %path,
            query = %req.query().map(|q| format!("?{q}")).unwrap_or_default(),
            content_type = req.content_type().unwrap_or(NOT_AVAILABLE),
            body = %loggable(&body),
            "HTTP request"
        );

        let outcome = next.run(req).await;
        let elapsed = started.elapsed();
        let mut response = outcome?;

        let body = response.body_mut().buffer().await?;
        info!(
            %method,
            %path,
            status = response.status_code().as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            body = %loggable(&body),
            "HTTP response"
        );

        Ok(response)
    }
}

impl Middleware for RequestLog {
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Outcome> {
        Box::pin(self.observe(req, next))
    }
}

/// Whether the client said a body follows: a positive `content-length`, or
/// no length at all but a `transfer-encoding`.
fn declares_body(req: &Request) -> bool {
    match req.content_length() {
        Some(len) => len > 0,
        None => req.header("transfer-encoding").is_some(),
    }
}

/// Body text for the log: lossy UTF-8, or [`NOT_AVAILABLE`] when blank.
pub fn loggable(body: &[u8]) -> Cow<'_, str> {
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() { Cow::Borrowed(NOT_AVAILABLE) } else { text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::test_support::request;

    #[test]
    fn blank_bodies_log_as_not_available() {
        assert_eq!(loggable(b""), NOT_AVAILABLE);
        assert_eq!(loggable(b" \r\n\t "), NOT_AVAILABLE);
    }

    #[test]
    fn text_bodies_log_verbatim() {
        assert_eq!(loggable(br#"{"name":"Ann Marie Lee"}"#), r#"{"name":"Ann Marie Lee"}"#);
    }

    #[test]
    fn invalid_utf8_is_logged_lossily() {
        assert_eq!(loggable(&[b'o', b'k', 0xff]), "ok\u{fffd}");
    }

    #[test]
    fn only_declared_bodies_are_read() {
        assert!(declares_body(&request("POST", "/api/users", "{}")));
        assert!(!declares_body(&request("GET", "/api/users", "")));

        let mut chunked = request("POST", "/api/users", "");
        chunked.parts.headers.remove("content-length");
        chunked.parts.headers.insert("transfer-encoding", http::HeaderValue::from_static("chunked"));
        assert!(declares_body(&chunked));
    }
}
