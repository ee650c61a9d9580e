//! Middleware trait, name registry, and built-in guards.
//!
//! A middleware is a short-circuiting pre-handler filter. Routes reference
//! middlewares by name; names resolve against a [`MiddlewareRegistry`] once,
//! during startup discovery — an unknown name aborts startup, it is never
//! discovered per request.
//!
//! Built-ins:
//! - [`Auth`] — rejects requests without an authenticated session (403)
//! - [`Trace`] — logs the matched parameters and always continues

use std::collections::HashMap;
use std::sync::Arc;

use http::StatusCode;
use tracing::debug;

use crate::pattern::Params;
use crate::response::Response;
use crate::session::Context;

// ── Middleware trait ──────────────────────────────────────────────────────────

/// A short-circuiting pre-handler guard.
///
/// Invoked with the extracted path parameters and the request context, in the
/// order declared on the route. Returning `Some(response)` stops the dispatch
/// immediately: later middlewares and the handler never run. Returning `None`
/// lets the chain continue.
///
/// Implementations must be stateless with respect to the route table; any
/// per-request state (an auth check, say) is read from `ctx`.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, params: &Params, ctx: &Context) -> Option<Response>;
}

/// Plain functions and closures work as middlewares directly.
impl<F> Middleware for F
where
    F: Fn(&Params, &Context) -> Option<Response> + Send + Sync + 'static,
{
    fn handle(&self, params: &Params, ctx: &Context) -> Option<Response> {
        self(params, ctx)
    }
}

// ── MiddlewareRegistry ────────────────────────────────────────────────────────

/// Maps stable middleware names to shared instances.
///
/// Populated before discovery; route metadata refers to entries by name.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    entries: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `middleware` under `name`. Re-registering a name replaces
    /// the previous instance. Returns `self` for chaining.
    pub fn register(mut self, name: &str, middleware: impl Middleware) -> Self {
        self.entries.insert(name.to_owned(), Arc::new(middleware));
        self
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<Arc<dyn Middleware>> {
        self.entries.get(name).map(Arc::clone)
    }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ── Built-ins ─────────────────────────────────────────────────────────────────

/// Session-based authentication guard.
///
/// Continues when the session has a `user` entry; otherwise short-circuits
/// with `403 Forbidden` and the body `403 Forbidden`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Auth;

impl Middleware for Auth {
    fn handle(&self, _params: &Params, ctx: &Context) -> Option<Response> {
        if ctx.session().exists("user") {
            return None;
        }
        Some(
            Response::builder()
                .status(StatusCode::FORBIDDEN)
                .text("403 Forbidden"),
        )
    }
}

/// Per-request trace middleware: logs the extracted parameters at `debug`
/// level and always continues.
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Middleware for Trace {
    fn handle(&self, params: &Params, _ctx: &Context) -> Option<Response> {
        let mut pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        pairs.sort();
        debug!(params = %pairs.join(","), "request matched");
        None
    }
}
