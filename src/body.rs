//! Request and response bodies.
//!
//! A [`Body`] is either already in memory or still a stream. A stream can be
//! read exactly once: whoever drains it owns the bytes, and everyone after
//! sees nothing. [`Body::buffer`] is how a body is made re-readable — it
//! drains the stream and leaves the collected bytes in its place, so the next
//! reader gets the same bytes again.
//!
//! `Bytes` is reference counted, so handing the buffered bytes to a logger and
//! keeping them in the body costs one atomic increment, not a copy.

use std::mem;

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Body as HttpBody;

use crate::error::{BoxError, Error};

/// The body type handed to hyper for every response.
pub type ResponseBody = UnsyncBoxBody<Bytes, BoxError>;

pub enum Body {
    Full(Bytes),
    Stream(ResponseBody),
}

impl Body {
    pub fn empty() -> Self {
        Self::Full(Bytes::new())
    }

    /// Wraps any `http_body::Body` without reading it.
    pub fn from_stream<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self::Stream(body.map_err(Into::into).boxed_unsync())
    }

    /// Drains a streaming body into memory and stores the bytes back in place.
    ///
    /// Idempotent: an already buffered body returns its bytes untouched.
    pub async fn buffer(&mut self) -> Result<Bytes, Error> {
        if let Self::Full(bytes) = self {
            return Ok(bytes.clone());
        }

        let Self::Stream(stream) = mem::replace(self, Self::empty()) else {
            return Ok(Bytes::new());
        };
        let bytes = stream.collect().await.map_err(Error::Body)?.to_bytes();
        *self = Self::Full(bytes.clone());
        Ok(bytes)
    }

    pub(crate) fn into_http(self) -> ResponseBody {
        match self {
            Self::Full(bytes) if bytes.is_empty() => {
                Empty::new().map_err(|never| match never {}).boxed_unsync()
            }
            Self::Full(bytes) => Full::new(bytes).map_err(|never| match never {}).boxed_unsync(),
            Self::Stream(stream) => stream,
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Full(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Full(bytes.into())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Full(text.into())
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffering_a_stream_makes_it_readable_twice() {
        let mut body = Body::from_stream(Full::new(Bytes::from_static(b"hello")));
        assert!(matches!(body, Body::Stream(_)));

        let first = body.buffer().await.unwrap();
        let second = body.buffer().await.unwrap();

        assert_eq!(first, Bytes::from_static(b"hello"));
        assert_eq!(first, second);
        assert!(matches!(body, Body::Full(_)));
    }

    #[tokio::test]
    async fn buffered_bytes_survive_conversion_to_hyper() {
        let mut body = Body::from_stream(Full::new(Bytes::from_static(b"{\"id\":1}")));
        body.buffer().await.unwrap();

        let sent = body.into_http().collect().await.unwrap().to_bytes();
        assert_eq!(sent, Bytes::from_static(b"{\"id\":1}"));
    }

    #[tokio::test]
    async fn empty_body_buffers_to_nothing() {
        let mut body = Body::empty();
        assert!(body.buffer().await.unwrap().is_empty());
    }
}
