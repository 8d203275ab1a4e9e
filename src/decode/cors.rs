use std::future::ready;

use http::header::{ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue, ORIGIN};
use http::{HeaderMap, Method};
use regex::Regex;
use tracing::trace;

use super::{DecodeStep, StepFuture};
use crate::context::Context;
use crate::error::Error;
use crate::request::Request;

/// CORS headers driven by a method list and origin patterns.
///
/// Every request gets `Access-Control-Allow-Methods` with the configured
/// methods. A request whose `Origin` matches one of the patterns also gets
/// `Access-Control-Allow-Origin` echoing that exact origin. Nothing is ever
/// rejected here: an unknown origin simply gets no allow-origin header and the
/// browser enforces the same-origin policy itself.
///
/// Patterns are unanchored regular expressions, tested in order. Anchor them
/// (`^...$`) when a partial match should not count.
#[derive(Clone, Debug)]
pub struct Cors {
    allow_methods: HeaderValue,
    origins: Vec<Regex>,
}

impl Cors {
    /// Compiles the origin patterns.
    ///
    /// Fails with [`Error::Pattern`] on the first pattern that is not a
    /// valid regular expression.
    pub fn new<M, P>(methods: M, patterns: P) -> Result<Self, Error>
    where
        M: IntoIterator<Item = Method>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let methods: Vec<String> = methods.into_iter().map(|m| m.to_string()).collect();
        let allow_methods = HeaderValue::from_str(&methods.join(", "))?;
        let origins = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { allow_methods, origins })
    }

    fn allows(&self, origin: &str) -> bool {
        self.origins.iter().any(|re| re.is_match(origin))
    }
}

impl DecodeStep for Cors {
    fn decode<'a>(
        &'a self,
        cx: Context,
        headers: &'a mut HeaderMap,
        req: &'a mut Request,
    ) -> StepFuture<'a> {
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());

        if let Some(origin) = req.headers().get(ORIGIN).filter(|o| !o.is_empty()) {
            match origin.to_str() {
                Ok(o) if self.allows(o) => {
                    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
                }
                _ => trace!(origin = ?origin, "origin not allowed"),
            }
        }

        Box::pin(ready(Ok(cx)))
    }
}
