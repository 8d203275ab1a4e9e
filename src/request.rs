//! Incoming HTTP request type.

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;

use crate::context::Params;

/// Boxed error produced while reading a request body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

enum Body {
    Streaming(UnsyncBoxBody<Bytes, BoxError>),
    Buffered(Bytes),
    Failed,
}

/// An incoming HTTP request as seen by decode steps.
///
/// The body is read lazily: the first call to [`Request::body`] drains the
/// stream, later calls return the buffered bytes.
pub struct Request {
    parts: Parts,
    params: Params,
    body: Body,
}

impl Request {
    pub(crate) fn new<B>(req: http::Request<B>, params: Params) -> Self
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (parts, body) = req.into_parts();
        let body = Body::Streaming(body.map_err(Into::into).boxed_unsync());
        Self { parts, params, body }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }

    /// Header lookup. Names are case-insensitive; values that are not
    /// visible ASCII are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Reads the whole body.
    ///
    /// An error here is a transport failure, not a malformed payload.
    pub async fn body(&mut self) -> Result<Bytes, BoxError> {
        match std::mem::replace(&mut self.body, Body::Failed) {
            Body::Buffered(bytes) => {
                self.body = Body::Buffered(bytes.clone());
                Ok(bytes)
            }
            Body::Streaming(stream) => {
                let bytes = stream.collect().await?.to_bytes();
                self.body = Body::Buffered(bytes.clone());
                Ok(bytes)
            }
            Body::Failed => Err("request body stream already failed".into()),
        }
    }
}
