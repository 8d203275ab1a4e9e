//! Decode steps.
//!
//! A decode step runs before a route's handler. It sees the per-request
//! [`Context`], the response headers staged so far, and the [`Request`], and
//! either hands back a (possibly extended) context or stops the request with a
//! [`Rejection`]. A route's steps form a [`Chain`] that runs in declared order;
//! the first rejection becomes the response and nothing after it runs.
//!
//! Built-in steps:
//! - [`Cors`] — `Access-Control-Allow-Methods` / `Access-Control-Allow-Origin`
//! - [`Authorization`] — `Authorization: Basic <base64 JSON>` into a typed principal
//! - [`RequestBody`] — JSON body into a typed, self-validating value
//!
//! Custom synchronous steps are plain closures wrapped with [`from_fn`]:
//!
//! ```rust
//! use strata::decode::{Chain, from_fn};
//! use strata::{Rejection, StatusCode};
//!
//! let chain = Chain::new().step(from_fn(|cx, _headers, req| {
//!     match req.header("x-api-version") {
//!         Some("2") => Ok(cx),
//!         _ => Err(Rejection::new(StatusCode::BAD_REQUEST, "unsupported api version")),
//!     }
//! }));
//! # assert_eq!(chain.len(), 1);
//! ```

mod authorization;
mod body;
mod cors;

pub use authorization::Authorization;
pub use body::{RequestBody, Validate};
pub use cors::Cors;

use std::fmt;
use std::future::{Future, ready};
use std::pin::Pin;
use std::sync::Arc;

use http::HeaderMap;

use crate::context::Context;
use crate::rejection::Rejection;
use crate::request::Request;

/// What a decode step resolves to.
pub type Decoded = Result<Context, Rejection>;

/// Boxed future returned by [`DecodeStep::decode`]. It may borrow the step,
/// the staged headers and the request for the duration of the call.
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Decoded> + Send + 'a>>;

/// One unit of pre-handler logic.
///
/// A step value is built once at route registration and shared by every
/// request on the routes that use it, possibly concurrently. It must keep all
/// per-request state in its arguments.
pub trait DecodeStep: Send + Sync + 'static {
    fn decode<'a>(
        &'a self,
        cx: Context,
        headers: &'a mut HeaderMap,
        req: &'a mut Request,
    ) -> StepFuture<'a>;
}

// ── from_fn ───────────────────────────────────────────────────────────────────

/// Wraps a synchronous closure as a [`DecodeStep`].
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(Context, &mut HeaderMap, &Request) -> Decoded + Send + Sync + 'static,
{
    FromFn(f)
}

/// A [`DecodeStep`] backed by a closure. See [`from_fn`].
#[derive(Clone)]
pub struct FromFn<F>(F);

impl<F> DecodeStep for FromFn<F>
where
    F: Fn(Context, &mut HeaderMap, &Request) -> Decoded + Send + Sync + 'static,
{
    fn decode<'a>(
        &'a self,
        cx: Context,
        headers: &'a mut HeaderMap,
        req: &'a mut Request,
    ) -> StepFuture<'a> {
        Box::pin(ready((self.0)(cx, headers, &*req)))
    }
}

// ── Chain ─────────────────────────────────────────────────────────────────────

/// The ordered decode steps of one route.
///
/// ```rust
/// use strata::decode::{Chain, Cors};
/// use strata::Method;
///
/// let cors = Cors::new([Method::GET], [r"^https://(\w+\.)?example\.com$"]).unwrap();
/// let chain = Chain::new().step(cors.clone());
/// # assert!(!chain.is_empty());
/// ```
#[derive(Clone, Default)]
pub struct Chain {
    steps: Vec<Arc<dyn DecodeStep>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step. Steps run in the order they were appended.
    pub fn step(self, step: impl DecodeStep) -> Self {
        self.shared(Arc::new(step))
    }

    /// Appends a step that is already shared with other chains.
    pub fn shared(mut self, step: Arc<dyn DecodeStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize { self.steps.len() }
    pub fn is_empty(&self) -> bool { self.steps.is_empty() }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Arc<dyn DecodeStep>> {
        self.steps.iter()
    }
}

impl FromIterator<Arc<dyn DecodeStep>> for Chain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn DecodeStep>>>(iter: I) -> Self {
        Self { steps: iter.into_iter().collect() }
    }
}

impl From<Vec<Arc<dyn DecodeStep>>> for Chain {
    fn from(steps: Vec<Arc<dyn DecodeStep>>) -> Self {
        Self { steps }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("steps", &self.steps.len()).finish()
    }
}
