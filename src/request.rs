//! Incoming HTTP request type.

use std::any::type_name;
use std::collections::HashMap;

use bytes::Bytes;
use http::request::Parts;
use http::{Extensions, HeaderMap, Uri};
use serde::de::DeserializeOwned;

use crate::body::Body;
use crate::error::{ApiError, Error};
use crate::router::Access;
use crate::token::Identity;

/// An incoming HTTP request, already matched against the router.
pub struct Request {
    pub(crate) parts: Parts,
    pub(crate) body: Body,
    pub(crate) params: HashMap<String, String>,
    pub(crate) access: Access,
}

impl Request {
    pub(crate) fn new(
        parts: Parts,
        body: Body,
        params: HashMap<String, String>,
        access: Access,
    ) -> Self {
        Self { parts, body, params, access }
    }

    pub fn method(&self) -> &http::Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn query(&self) -> Option<&str> { self.parts.uri.query() }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.parts.extensions }
    pub fn body_mut(&mut self) -> &mut Body { &mut self.body }

    /// Access policy of the matched route. Unmatched requests are `Anonymous`.
    pub fn access(&self) -> Access { self.access }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Declared `content-length`, if the client sent a parseable one.
    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length").and_then(|v| v.trim().parse().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The caller's verified identity, set by the authentication layer.
    pub fn identity(&self) -> Option<&Identity> {
        self.parts.extensions.get::<Identity>()
    }

    /// A clone of shared application state registered on the pipeline.
    pub fn state<T: Clone + Send + Sync + 'static>(&self) -> Result<T, Error> {
        self.parts
            .extensions
            .get::<T>()
            .cloned()
            .ok_or_else(|| Error::MissingState(type_name::<T>()))
    }

    /// The full body. Buffers it first, so it can be read again afterwards.
    pub async fn bytes(&mut self) -> Result<Bytes, Error> {
        self.body.buffer().await
    }

    /// Deserializes the body as JSON. Malformed input is a client error.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T, ApiError> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidBody(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn request(method: &str, uri: &str, body: &'static str) -> Request {
        let (parts, ()) = http::Request::builder()
            .method(method)
            .uri(uri)
            .header("content-length", body.len())
            .body(())
            .unwrap()
            .into_parts();
        Request::new(parts, Body::from(Bytes::from_static(body.as_bytes())), HashMap::new(), Access::Anonymous)
    }
}
