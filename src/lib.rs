//! # strata
//!
//! A minimal HTTP framework where every route is a chain: an ordered list of
//! decode steps in front of one handler.
//!
//! ## The model
//!
//! A decode step looks at the incoming request before the handler does. It can
//! - stage response headers (CORS),
//! - add typed data to the request's [`Context`] (a decoded principal, a
//!   validated body),
//! - or stop the request with a [`Rejection`].
//!
//! Steps run in the order they were registered. The first rejection is written
//! as the response and nothing after it runs. Otherwise the handler receives
//! the enriched context and its result is written. One request, one response.
//!
//! What strata leaves to others: TLS, body-size limits and rate limiting belong
//! to the reverse proxy; listeners and connections belong to hyper; route
//! matching is a [`matchit`] radix tree.
//!
//! ## Quick start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use strata::decode::{Authorization, Chain, Cors, RequestBody, Validate};
//! use strata::{Context, Json, Key, Method, Rejection, Router, StatusCode};
//!
//! #[derive(Clone, Deserialize, Serialize)]
//! struct User { id: u64, email: String }
//!
//! #[derive(Clone, Deserialize, Serialize)]
//! struct NewNote { text: String }
//!
//! impl Validate for NewNote {
//!     type Error = &'static str;
//!     fn validate(&self) -> Result<(), Self::Error> {
//!         if self.text.is_empty() { Err("text must not be empty") } else { Ok(()) }
//!     }
//! }
//!
//! fn app() -> Result<Router, strata::Error> {
//!     let user: Key<User> = Key::new("user");
//!     let note: Key<NewNote> = Key::new("note");
//!     let cors = Cors::new([Method::POST], [r"^https://(\w+\.)?example\.com$"])?;
//!
//!     let chain = Chain::new()
//!         .step(cors)
//!         .step(Authorization::new(user))
//!         .step(RequestBody::new(note));
//!
//!     let app = Router::new().handle(Method::POST, "/notes", chain, move |cx: Context| async move {
//!         let text = cx.get(&note).map(|n| n.text.clone()).unwrap_or_default();
//!         let author = cx.get(&user).map(|u| u.id).unwrap_or_default();
//!         Ok::<_, Rejection>((StatusCode::CREATED, Json((author, text))))
//!     });
//!
//!     Ok(app)
//! }
//! ```
//!
//! Serving connections is left to hyper: pass [`Router::into_service`] to
//! `hyper_util::server::conn::auto::Builder::serve_connection` (see
//! `demos/basic.rs`).

mod context;
mod error;
mod handler;
mod rejection;
mod request;
mod response;
mod router;
mod service;

pub mod decode;

pub use context::{Context, Key};
pub use error::Error;
pub use handler::Handler;
pub use rejection::Rejection;
pub use request::{BoxError, Request};
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use service::RouterService;

pub use http;
pub use http::{HeaderMap, Method, StatusCode};
