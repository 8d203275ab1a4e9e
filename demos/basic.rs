//! Minimal strata example: CORS, a Basic-carried JSON principal, and a
//! validated JSON body in front of a handler, served by hyper-util.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/health
//!   curl -i -H 'Origin: http://app.example.com' http://localhost:3000/health
//!   TOKEN=$(printf '{"id":1,"email":"cliff@example.com"}' | base64)
//!   curl -i -H "Authorization: Basic $TOKEN" http://localhost:3000/me
//!   curl -i -X POST -H "Authorization: Basic $TOKEN" \
//!        -d '{"count":1}' http://localhost:3000/counters/a
//!   curl -i -X POST -H "Authorization: Basic $TOKEN" \
//!        -d '{"count":2}' http://localhost:3000/counters/a

use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use serde::{Deserialize, Serialize};
use strata::decode::{Authorization, Chain, Cors, RequestBody, Validate};
use strata::{Context, Json, Key, Method, Rejection, Router, StatusCode};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Deserialize, Serialize)]
struct User {
    id: u64,
    email: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct Increment {
    count: u32,
}

impl Validate for Increment {
    type Error = String;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.count == 1 {
            Ok(())
        } else {
            Err(format!("count must be 1, got {}", self.count))
        }
    }
}

#[derive(Serialize)]
struct Counter {
    name: String,
    added: u32,
    by: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let user: Key<User> = Key::new("user");
    let increment: Key<Increment> = Key::new("increment");

    let cors = Cors::new(
        [Method::GET, Method::POST],
        [r"^http://(\w+\.)?example\.com$", r"^http://localhost(:\d+)?$"],
    )?;
    let auth = Authorization::new(user);

    let app = Router::new()
        .handle(Method::GET, "/health", Chain::new().step(cors.clone()), health)
        .handle(
            Method::GET,
            "/me",
            Chain::new().step(cors.clone()).step(auth.clone()),
            move |cx: Context| async move {
                cx.get(&user)
                    .cloned()
                    .map(Json)
                    .ok_or_else(|| Rejection::internal("principal missing from context"))
            },
        )
        .handle(
            Method::POST,
            "/counters/{name}",
            Chain::new()
                .step(cors)
                .step(auth)
                .step(RequestBody::new(increment)),
            move |cx: Context| async move {
                let (Some(by), Some(inc)) = (cx.get(&user), cx.get(&increment)) else {
                    return Err(Rejection::internal("decoded values missing from context"));
                };
                let counter = Counter {
                    name: cx.param("name").unwrap_or_default().to_owned(),
                    added: inc.count,
                    by: by.id,
                };
                Ok((StatusCode::CREATED, Json(counter)))
            },
        );

    let service = app.into_service();
    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    info!(addr = %listener.local_addr()?, "listening");

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = tokio::signal::ctrl_c() => break,
        };
        let service = service.clone();
        tokio::spawn(async move {
            if let Err(e) = Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                warn!(%peer, "connection error: {e}");
            }
        });
    }

    Ok(())
}

async fn health(_cx: Context) -> Result<&'static str, Rejection> {
    Ok("ok")
}
