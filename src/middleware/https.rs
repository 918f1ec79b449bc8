//! Redirect to secure transport.
//!
//! The service sits behind a TLS-terminating reverse proxy, so "did this
//! arrive over HTTPS" is answered by the proxy's `x-forwarded-proto` header
//! (or by an absolute `https://` request URI). Plain-HTTP requests are
//! answered with `307 Temporary Redirect` to the same path on the HTTPS port.
//!
//! Without a configured HTTPS port there is nowhere to redirect to: the layer
//! passes everything through and warns once.

use std::sync::atomic::{AtomicBool, Ordering};

use http::header::{HeaderValue, LOCATION};
use tracing::{debug, warn};

use super::{Middleware, Next};
use crate::handler::{BoxFuture, Outcome};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

#[derive(Debug, Default)]
pub struct HttpsRedirect {
    port: Option<u16>,
    warned: AtomicBool,
}

impl HttpsRedirect {
    pub fn new(port: Option<u16>) -> Self {
        Self { port, warned: AtomicBool::new(false) }
    }

    async fn redirect(&self, req: Request, next: Next<'_>) -> Outcome {
        let Some(port) = self.port else {
            if !self.warned.swap(true, Ordering::Relaxed) {
                warn!("failed to determine the https port for redirect");
            }
            return next.run(req).await;
        };

        if is_secure(&req) {
            return next.run(req).await;
        }

        let Some(host) = host_of(&req) else {
            return next.run(req).await;
        };
        let location = secure_location(host, port, req.path(), req.query());
        debug!(%location, "redirecting to https");

        Ok(Response::builder()
            .status(Status::TemporaryRedirect)
            .header(LOCATION, HeaderValue::try_from(location)?)
            .no_body())
    }
}

impl Middleware for HttpsRedirect {
    fn handle<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Outcome> {
        Box::pin(self.redirect(req, next))
    }
}

fn is_secure(req: &Request) -> bool {
    if req.uri().scheme_str() == Some("https") {
        return true;
    }
    req.header("x-forwarded-proto")
        .and_then(|v| v.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

/// Host without its port: `x-forwarded-host`, then `host`, then the URI authority.
fn host_of(req: &Request) -> Option<&str> {
    let raw = req
        .header("x-forwarded-host")
        .or_else(|| req.header("host"))
        .or_else(|| req.uri().host())?;
    let host = match raw.strip_prefix('[') {
        // IPv6 literal: keep the brackets, drop any port after them.
        Some(rest) => &raw[..rest.find(']').map_or(raw.len(), |i| i + 2)],
        None => raw.split(':').next().unwrap_or(raw),
    };
    (!host.is_empty()).then_some(host)
}

fn secure_location(host: &str, port: u16, path: &str, query: Option<&str>) -> String {
    let authority = if port == 443 { host.to_string() } else { format!("{host}:{port}") };
    match query {
        Some(q) => format!("https://{authority}{path}?{q}"),
        None => format!("https://{authority}{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::test_support::request;

    #[test]
    fn location_keeps_path_and_query() {
        assert_eq!(
            secure_location("api.example.com", 8443, "/api/users", Some("page=2")),
            "https://api.example.com:8443/api/users?page=2"
        );
        assert_eq!(secure_location("example.com", 443, "/", None), "https://example.com/");
    }

    #[test]
    fn host_drops_port() {
        let mut req = request("GET", "/", "");
        req.parts.headers.insert("host", HeaderValue::from_static("example.com:5000"));
        assert_eq!(host_of(&req), Some("example.com"));

        req.parts.headers.insert("host", HeaderValue::from_static("[::1]:5000"));
        assert_eq!(host_of(&req), Some("[::1]"));
    }

    #[test]
    fn forwarded_proto_marks_request_secure() {
        let mut req = request("GET", "/", "");
        assert!(!is_secure(&req));

        req.parts.headers.insert("x-forwarded-proto", HeaderValue::from_static("HTTPS"));
        assert!(is_secure(&req));
    }
}
