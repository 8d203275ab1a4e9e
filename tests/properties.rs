//! Property tests for the decode steps' observable behaviour.

mod common;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use common::{Reply, request, send};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use strata::decode::{Authorization, Chain, Cors, RequestBody, Validate};
use strata::http::header::{AUTHORIZATION, HeaderValue, ORIGIN};
use strata::{Context, Json, Key, Method, Rejection, Router};

fn block_on_send(router: &Router, req: http::Request<http_body_util::Full<bytes::Bytes>>) -> Reply {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(send(router, req))
}

fn cors_router() -> Router {
    let cors = Cors::new([Method::GET, Method::PUT], [r"^https://(\w+\.)?example\.com$"]).unwrap();
    Router::new().handle(Method::GET, "/", Chain::new().step(cors), |_cx: Context| async {
        Ok::<_, Rejection>("ok")
    })
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
struct Principal {
    id: u64,
    name: String,
    roles: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
struct Bounded {
    value: i32,
}

impl Validate for Bounded {
    type Error = String;

    fn validate(&self) -> Result<(), Self::Error> {
        if (0..=100).contains(&self.value) {
            Ok(())
        } else {
            Err(format!("value {} out of range", self.value))
        }
    }
}

fn arb_principal() -> impl Strategy<Value = Principal> {
    (
        any::<u64>(),
        "[A-Za-z0-9 ]{0,20}",
        prop::collection::vec("[a-z]{1,8}", 0..4),
    )
        .prop_map(|(id, name, roles)| Principal { id, name, roles })
}

proptest! {
    /// Property: without an Origin header only the methods header is set.
    #[test]
    fn proptest_cors_without_origin(path_noise in "[a-z]{0,8}") {
        let mut req = request(Method::GET, "/", "");
        if !path_noise.is_empty() {
            req.headers_mut().insert("x-noise", HeaderValue::from_str(&path_noise).unwrap());
        }

        let reply = block_on_send(&cors_router(), req);

        prop_assert_eq!(reply.status.as_u16(), 200);
        prop_assert_eq!(reply.header("access-control-allow-methods"), Some("GET, PUT"));
        prop_assert_eq!(reply.header("access-control-allow-origin"), None);
    }

    /// Property: a matching origin is echoed literally, never as a wildcard.
    #[test]
    fn proptest_cors_matching_origin_echoed(sub in prop::option::of("[a-z0-9]{1,12}")) {
        let origin = match sub {
            Some(s) => format!("https://{s}.example.com"),
            None => "https://example.com".to_owned(),
        };
        let mut req = request(Method::GET, "/", "");
        req.headers_mut().insert(ORIGIN, HeaderValue::from_str(&origin).unwrap());

        let reply = block_on_send(&cors_router(), req);

        prop_assert_eq!(reply.status.as_u16(), 200);
        prop_assert_eq!(reply.header("access-control-allow-origin"), Some(origin.as_str()));
    }

    /// Property: a non-matching origin never blocks and never gets the header.
    #[test]
    fn proptest_cors_unknown_origin_passes(host in "[a-z]{1,12}\\.(test|org|net)") {
        let mut req = request(Method::GET, "/", "");
        req.headers_mut().insert(ORIGIN, HeaderValue::from_str(&format!("https://{host}")).unwrap());

        let reply = block_on_send(&cors_router(), req);

        prop_assert_eq!(reply.status.as_u16(), 200);
        prop_assert_eq!(&reply.body[..], b"ok");
        prop_assert_eq!(reply.header("access-control-allow-origin"), None);
    }

    /// Property: any encoded principal comes back out of the context intact.
    #[test]
    fn proptest_authorization_round_trip(principal in arb_principal()) {
        let key: Key<Principal> = Key::new("principal");
        let router = Router::new().handle(
            Method::GET,
            "/",
            Chain::new().step(Authorization::new(key)),
            move |cx: Context| async move {
                cx.get(&key).cloned().map(Json).ok_or_else(|| Rejection::internal("missing"))
            },
        );

        let token = STANDARD.encode(serde_json::to_vec(&principal).unwrap());
        let mut req = request(Method::GET, "/", "");
        req.headers_mut().insert(AUTHORIZATION, HeaderValue::from_str(&format!("Basic {token}")).unwrap());

        let reply = block_on_send(&router, req);

        prop_assert_eq!(reply.status.as_u16(), 200);
        let decoded: Principal = serde_json::from_slice(&reply.body).unwrap();
        prop_assert_eq!(decoded, principal);
    }

    /// Property: bodies inside the validator's range round-trip, bodies outside
    /// are rejected with 400 and the validator's message.
    #[test]
    fn proptest_request_body_validation(value in -1000i32..1000) {
        let key: Key<Bounded> = Key::new("bounded");
        let router = Router::new().handle(
            Method::POST,
            "/",
            Chain::new().step(RequestBody::new(key)),
            move |cx: Context| async move {
                cx.get(&key).cloned().map(Json).ok_or_else(|| Rejection::internal("missing"))
            },
        );

        let body = serde_json::to_string(&Bounded { value }).unwrap();
        let reply = block_on_send(&router, request(Method::POST, "/", &body));

        if (0..=100).contains(&value) {
            prop_assert_eq!(reply.status.as_u16(), 200);
            let echoed: Bounded = serde_json::from_slice(&reply.body).unwrap();
            prop_assert_eq!(echoed, Bounded { value });
        } else {
            prop_assert_eq!(reply.status.as_u16(), 400);
            let expected = format!("value {value} out of range");
            let json = reply.json();
            prop_assert_eq!(json["message"].as_str(), Some(expected.as_str()));
        }
    }
}
