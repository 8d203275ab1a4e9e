//! The router as a hyper [`Service`].
//!
//! strata does not own a listener or a connection lifecycle. Hand
//! [`Router::into_service`] to whatever serves connections (for example
//! `hyper_util::server::conn::auto::Builder`); hyper then calls the router
//! once per request.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::Service;

use crate::request::BoxError;
use crate::router::Router;

/// A cheaply cloneable, shared handle to a [`Router`] implementing hyper's
/// [`Service`]. Every call runs [`Router::call`].
#[derive(Clone)]
pub struct RouterService {
    router: Arc<Router>,
}

impl Router {
    /// Freezes the route table into a service shared by all connections.
    pub fn into_service(self) -> RouterService {
        RouterService { router: Arc::new(self) }
    }
}

impl<B> Service<http::Request<B>> for RouterService
where
    B: hyper::body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    type Response = http::Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let router = Arc::clone(&self.router);
        Box::pin(async move { Ok(router.call(req).await) })
    }
}
