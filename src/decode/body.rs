use std::fmt;

use http::HeaderMap;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::{DecodeStep, StepFuture};
use crate::context::{Context, Key};
use crate::rejection::Rejection;
use crate::request::Request;

/// A value that can check its own semantic correctness after parsing.
///
/// ```rust
/// use strata::decode::Validate;
///
/// #[derive(serde::Deserialize)]
/// struct Transfer { amount: u64 }
///
/// impl Validate for Transfer {
///     type Error = &'static str;
///
///     fn validate(&self) -> Result<(), Self::Error> {
///         if self.amount == 0 { Err("amount must be positive") } else { Ok(()) }
///     }
/// }
/// ```
pub trait Validate {
    type Error: fmt::Display;

    fn validate(&self) -> Result<(), Self::Error>;
}

/// Parses the JSON request body into a fresh `T`, validates it, and stores it
/// in the context under the configured key.
///
/// | Failure                          | Status |
/// |----------------------------------|--------|
/// | the body stream errors           | 500    |
/// | the body is not JSON fitting `T` | 400, message echoes the raw body |
/// | [`Validate::validate`] fails     | 400, message is the validation error |
pub struct RequestBody<T> {
    key: Key<T>,
}

impl<T> RequestBody<T>
where
    T: DeserializeOwned + Validate + Send + Sync + 'static,
{
    pub fn new(key: Key<T>) -> Self {
        Self { key }
    }

    async fn read(&self, req: &mut Request) -> Result<T, Rejection> {
        let raw = req.body().await.map_err(|e| {
            warn!("failed to read request body: {e}");
            Rejection::internal(format!("failed to read request body: {e}"))
        })?;

        let value: T = serde_json::from_slice(&raw).map_err(|_| {
            Rejection::bad_request(format!(
                "malformed request body: {}",
                String::from_utf8_lossy(&raw)
            ))
        })?;

        value
            .validate()
            .map_err(|e| Rejection::bad_request(e.to_string()))?;

        Ok(value)
    }
}

impl<T> Clone for RequestBody<T> {
    fn clone(&self) -> Self {
        Self { key: self.key }
    }
}

impl<T> fmt::Debug for RequestBody<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBody").field("key", &self.key).finish()
    }
}

impl<T> DecodeStep for RequestBody<T>
where
    T: DeserializeOwned + Validate + Send + Sync + 'static,
{
    fn decode<'a>(
        &'a self,
        cx: Context,
        _headers: &'a mut HeaderMap,
        req: &'a mut Request,
    ) -> StepFuture<'a> {
        Box::pin(async move {
            let value = self.read(req).await?;
            Ok(cx.with(self.key, value))
        })
    }
}
