//! Handler trait and type erasure.
//!
//! A handler is the last link of a route's chain. It receives the
//! [`Context`] the decode steps built and either produces a response or
//! rejects the request:
//!
//! ```text
//! async fn name(cx: Context) -> Result<impl IntoResponse, Rejection>
//! ```
//!
//! The router stores handlers of different concrete types side by side, so
//! each one is wrapped in `FnHandler` and kept behind
//! `Arc<dyn ErasedHandler>`. The cost per request is one `Arc` clone and one
//! virtual call.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::rejection::Rejection;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future resolving to the handler's outcome.
pub(crate) type BoxFuture =
    Pin<Box<dyn Future<Output = Result<Response, Rejection>> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, cx: Context) -> BoxFuture;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is satisfied by any `async fn`
/// (or closure returning a future) with the signature shown in the module
/// docs. The trait is sealed.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Rejection>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Rejection>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, Rejection>> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, cx: Context) -> BoxFuture {
        let fut = (self.0)(cx);
        Box::pin(async move { fut.await.map(IntoResponse::into_response) })
    }
}
