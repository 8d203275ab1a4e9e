//! Per-request context.
//!
//! A [`Context`] is created for every request from the router's base context,
//! handed to each decode step in turn, and finally to the handler. Steps add
//! values with [`Context::with`]; handlers read them back with [`Context::get`].
//!
//! Values are addressed by [`Key<T>`] tokens rather than strings. Every key
//! minted by [`Key::new`] is distinct, so two decoders storing values of the
//! same type never collide, and the key's type parameter fixes what `get`
//! returns:
//!
//! ```rust
//! use strata::{Context, Key};
//!
//! let user: Key<u64> = Key::new("user");
//! let cx = Context::new().with(user, 42);
//! assert_eq!(cx.get(&user), Some(&42));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Path parameters captured by the route pattern, shared between the
/// [`Request`](crate::Request) and the [`Context`] of one request.
pub(crate) type Params = Arc<HashMap<String, String>>;

type Value = Arc<dyn Any + Send + Sync>;

static NEXT_KEY: AtomicU64 = AtomicU64::new(0);

// ── Key ───────────────────────────────────────────────────────────────────────

/// A typed handle for one slot in a [`Context`].
///
/// Mint keys once at startup and copy them into the decoders and handlers
/// that share the slot. The name is only used in `Debug` output.
pub struct Key<T> {
    id: u64,
    name: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Key<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            id: NEXT_KEY.fetch_add(1, Ordering::Relaxed),
            name,
            _value: PhantomData,
        }
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self { *self }
}

impl<T> Copy for Key<T> {}

impl<T> PartialEq for Key<T> {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl<T> Eq for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}#{})", self.name, self.id)
    }
}

// ── Context ───────────────────────────────────────────────────────────────────

/// Typed values accumulated while one request runs through its chain.
///
/// Cloning is cheap: the value table is shared until the next
/// [`with`](Context::with) on a shared copy, which copies the table first.
#[derive(Clone, Default)]
pub struct Context {
    values: Arc<HashMap<u64, Value>>,
    params: Params,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this context extended with `value` stored under `key`.
    ///
    /// A value already stored under the same key is replaced.
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, key: Key<T>, value: T) -> Self {
        Arc::make_mut(&mut self.values).insert(key.id, Arc::new(value));
        self
    }

    pub fn get<T: Send + Sync + 'static>(&self, key: &Key<T>) -> Option<&T> {
        self.values.get(&key.id)?.downcast_ref::<T>()
    }

    pub fn contains<T: Send + Sync + 'static>(&self, key: &Key<T>) -> bool {
        self.values.contains_key(&key.id)
    }

    /// Returns a path parameter of the matched route.
    ///
    /// For a route `/users/{id}`, `cx.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub(crate) fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values.len())
            .field("params", &self.params)
            .finish()
    }
}
