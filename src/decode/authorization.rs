use std::fmt;
use std::future::ready;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use http::HeaderMap;
use http::header::AUTHORIZATION;
use serde::de::DeserializeOwned;

use super::{DecodeStep, StepFuture};
use crate::context::{Context, Key};
use crate::rejection::Rejection;
use crate::request::Request;

/// Decodes `Authorization: Basic <token>` into a principal of type `P`.
///
/// The Basic scheme is only used as a carrier: the token is standard base64 of
/// a JSON document, not `user:password`. The decoded principal is stored in
/// the context under the configured key.
///
/// A missing or malformed header, bad base64, or JSON that does not fit `P`
/// all reject the request with `400 Bad Request`.
pub struct Authorization<P> {
    key: Key<P>,
}

impl<P> Authorization<P>
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(key: Key<P>) -> Self {
        Self { key }
    }

    fn principal(&self, req: &Request) -> Result<P, Rejection> {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .ok_or_else(|| Rejection::bad_request("missing authorization header"))?;

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("basic"))
            .map(|(_, token)| token.trim())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Rejection::bad_request("malformed authorization header"))?;

        let raw = STANDARD
            .decode(token)
            .map_err(|e| Rejection::bad_request(format!("malformed authorization token: {e}")))?;

        serde_json::from_slice(&raw)
            .map_err(|e| Rejection::bad_request(format!("malformed authorization credential: {e}")))
    }
}

impl<P> Clone for Authorization<P> {
    fn clone(&self) -> Self {
        Self { key: self.key }
    }
}

impl<P> fmt::Debug for Authorization<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorization").field("key", &self.key).finish()
    }
}

impl<P> DecodeStep for Authorization<P>
where
    P: DeserializeOwned + Send + Sync + 'static,
{
    fn decode<'a>(
        &'a self,
        cx: Context,
        _headers: &'a mut HeaderMap,
        req: &'a mut Request,
    ) -> StepFuture<'a> {
        let decoded = self.principal(req).map(|principal| cx.with(self.key, principal));
        Box::pin(ready(decoded))
    }
}
