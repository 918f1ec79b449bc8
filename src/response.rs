//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it. Middleware may look at
//! it on the way out; the server turns it into a hyper response at the very
//! end.

use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use serde::Serialize;

use crate::body::{Body, ResponseBody};
use crate::error::Error;
use crate::status::Status;

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use user_registry::{Response, Status};
///
/// Response::json(&serde_json::json!({ "id": 1 })).unwrap();
/// Response::text("hello");
/// Response::status(Status::NoContent);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use http::header::{HeaderValue, LOCATION};
/// use user_registry::{Response, Status};
///
/// Response::builder()
///     .status(Status::Created)
///     .header(LOCATION, HeaderValue::from_static("/api/users/42"))
///     .json(&serde_json::json!({ "id": 42 }))
///     .unwrap();
/// ```
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Body,
}

impl Response {
    /// `200 OK` — `application/json`.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        Self::builder().json(value)
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { status: code.into(), headers: HeaderMap::new(), body: Body::empty() }
    }

    /// `200 OK` with raw bytes and no content type.
    pub fn bytes(body: impl Into<Body>) -> Self {
        Self { status: StatusCode::OK, headers: HeaderMap::new(), body: body.into() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn set_status(&mut self, status: StatusCode) { self.status = status; }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body_mut(&mut self) -> &mut Body { &mut self.body }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub(crate) fn into_http(self) -> http::Response<ResponseBody> {
        let mut response = http::Response::new(self.body.into_http());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method — you always know what you're sending.
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code.into();
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Response, Error> {
        let body = serde_json::to_vec(value)?;
        Ok(self.finish(HeaderValue::from_static("application/json"), body.into()))
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        let text: String = body.into();
        self.finish(HeaderValue::from_static("text/plain; charset=utf-8"), Body::from(text))
    }

    /// Terminate with raw bytes of the given content type.
    pub fn body(self, content_type: HeaderValue, body: impl Into<Body>) -> Response {
        self.finish(content_type, body.into())
    }

    /// Terminate with no body (e.g. `Status::NoContent`, `Status::TemporaryRedirect`).
    pub fn no_body(self) -> Response {
        Response { body: Body::empty(), headers: self.headers, status: self.status }
    }

    fn finish(mut self, content_type: HeaderValue, body: Body) -> Response {
        self.headers.insert(header::CONTENT_TYPE, content_type);
        Response { body, headers: self.headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

/// Return a [`Status`] directly from a handler: `return Status::NoContent`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

#[cfg(test)]
mod tests {
    use http::header::LOCATION;

    use super::*;

    #[test]
    fn builder_sets_status_headers_and_json_type() {
        let response = Response::builder()
            .status(Status::Created)
            .header(LOCATION, HeaderValue::from_static("/api/users/3"))
            .json(&serde_json::json!({ "id": 3 }))
            .unwrap();

        assert_eq!(response.status_code(), StatusCode::CREATED);
        assert_eq!(response.header("location"), Some("/api/users/3"));
        assert_eq!(response.header("content-type"), Some("application/json"));
    }

    #[test]
    fn status_only_response_has_no_content_type() {
        let response = Status::NoContent.into_response();
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }
}
