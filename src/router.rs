//! Radix-tree request router and chain executor.
//!
//! One tree per HTTP method, O(path-length) lookup. Each route owns a
//! [`Chain`] of decode steps and a terminal handler. A request runs the steps
//! in order; the first [`Rejection`] becomes the response and nothing after it
//! runs. If every step passes, the handler gets the enriched [`Context`] and
//! its result becomes the response. Exactly one response is produced either
//! way.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{ALLOW, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use http_body_util::Full;
use matchit::Router as MatchitRouter;
use tracing::{Instrument, debug, debug_span, error};

use crate::context::{Context, Params};
use crate::decode::Chain;
use crate::handler::{BoxedHandler, Handler};
use crate::rejection::Rejection;
use crate::request::{BoxError, Request};
use crate::response::{IntoResponse, Response};

struct Route {
    chain: Chain,
    handler: BoxedHandler,
}

enum Lookup {
    Found(Arc<Route>, Params),
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// The application router.
///
/// Build it once at startup; serve it through [`Router::into_service`]
/// or drive it directly with [`Router::call`]. Registration methods return
/// `self` so they chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Arc<Route>>>,
    base: Context,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), base: Context::new() }
    }

    /// Sets the context every request starts from.
    pub fn with_context(mut self, base: Context) -> Self {
        self.base = base;
        self
    }

    /// Register a handler behind an ordered chain of decode steps.
    ///
    /// Path parameters use `{name}` syntax and are readable from both the
    /// [`Request`] and the [`Context`].
    ///
    /// ```rust,no_run
    /// # use strata::{Context, Json, Key, Method, Rejection, Router};
    /// # use strata::decode::{Authorization, Chain, Cors};
    /// # #[derive(serde::Deserialize, serde::Serialize, Clone)] struct User { id: u64 }
    /// # async fn me(_: Context) -> Result<Json<u64>, Rejection> { Ok(Json(1)) }
    /// let user: Key<User> = Key::new("user");
    /// let cors = Cors::new([Method::GET], [r"^https://(\w+\.)?example\.com$"]).unwrap();
    ///
    /// Router::new().handle(
    ///     Method::GET,
    ///     "/me",
    ///     Chain::new().step(cors).step(Authorization::new(user)),
    ///     me,
    /// );
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid pattern or conflicts with a route
    /// already registered for `method`.
    pub fn handle(
        mut self,
        method: Method,
        path: &str,
        chain: impl Into<Chain>,
        handler: impl Handler,
    ) -> Self {
        let route = Arc::new(Route {
            chain: chain.into(),
            handler: handler.into_boxed_handler(),
        });
        self.routes
            .entry(method)
            .or_default()
            .insert(path, route)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Register a handler with no decode steps.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.handle(method, path, Chain::new(), handler)
    }

    /// Routes one request through its chain and handler.
    ///
    /// Unknown paths answer `404 Not Found`; a path registered only under other
    /// methods answers `405 Method Not Allowed` with an `Allow` header.
    pub async fn call<B>(&self, req: http::Request<B>) -> http::Response<Full<Bytes>>
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let span = debug_span!("request", method = %req.method(), path = %req.uri().path());

        async move {
            let lookup = self.lookup(req.method(), req.uri().path());
            let response = match lookup {
                Lookup::Found(route, params) => {
                    let cx = self.base.clone().with_params(Arc::clone(&params));
                    route.run(cx, Request::new(req, params)).await
                }
                Lookup::MethodNotAllowed(allowed) => {
                    debug!("method not allowed");
                    method_not_allowed(&allowed)
                }
                Lookup::NotFound => {
                    debug!("no route");
                    Response::status(StatusCode::NOT_FOUND)
                }
            };
            response.into_http()
        }
        .instrument(span)
        .await
    }

    fn lookup(&self, method: &Method, path: &str) -> Lookup {
        if let Some(matched) = self.routes.get(method).and_then(|tree| tree.at(path).ok()) {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found(Arc::clone(matched.value), Arc::new(params));
        }

        let mut allowed: Vec<Method> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(m, _)| m.clone())
            .collect();

        if allowed.is_empty() {
            Lookup::NotFound
        } else {
            allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            Lookup::MethodNotAllowed(allowed)
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl Route {
    async fn run(&self, mut cx: Context, mut req: Request) -> Response {
        let mut staged = HeaderMap::new();

        for (index, step) in self.chain.iter().enumerate() {
            match step.decode(cx, &mut staged, &mut req).await {
                Ok(next) => cx = next,
                Err(rejection) => {
                    log_rejection(&rejection, "decode step", Some(index));
                    return finish(rejection.into_response(), staged);
                }
            }
        }

        match self.handler.call(cx).await {
            Ok(response) => finish(response, staged),
            Err(rejection) => {
                log_rejection(&rejection, "handler", None);
                finish(rejection.into_response(), staged)
            }
        }
    }
}

fn finish(mut response: Response, staged: HeaderMap) -> Response {
    response.merge_headers(staged);
    response
}

fn log_rejection(rejection: &Rejection, stage: &str, step: Option<usize>) {
    let status = rejection.status().as_u16();
    let message = rejection.message().unwrap_or_default();
    if rejection.status().is_server_error() {
        error!(status, step, "{stage} failed: {message}");
    } else {
        debug!(status, step, "{stage} rejected request: {message}");
    }
}

fn method_not_allowed(allowed: &[Method]) -> Response {
    let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
    let mut response = Response::status(StatusCode::METHOD_NOT_ALLOWED);
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers.insert(ALLOW, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok(_cx: Context) -> Result<&'static str, Rejection> {
        Ok("ok")
    }

    #[test]
    fn lookup_captures_params() {
        let router = Router::new().on(Method::GET, "/users/{id}", ok);
        match router.lookup(&Method::GET, "/users/42") {
            Lookup::Found(_, params) => assert_eq!(params.get("id").map(String::as_str), Some("42")),
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn lookup_reports_other_methods() {
        let router = Router::new()
            .on(Method::POST, "/items", ok)
            .on(Method::DELETE, "/items", ok);
        match router.lookup(&Method::GET, "/items") {
            Lookup::MethodNotAllowed(allowed) => assert_eq!(allowed, [Method::DELETE, Method::POST]),
            _ => panic!("expected 405"),
        }
        assert!(matches!(router.lookup(&Method::GET, "/nothing"), Lookup::NotFound));
    }

    #[test]
    #[should_panic(expected = "invalid route `/a/{id}`")]
    fn duplicate_route_panics() {
        let _ = Router::new()
            .on(Method::GET, "/a/{id}", ok)
            .on(Method::GET, "/a/{id}", ok);
    }
}
