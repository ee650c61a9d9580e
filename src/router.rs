//! Route discovery and request dispatch.
//!
//! [`Router`] is built once at startup: register middlewares by name, then
//! feed it controllers. Discovery walks each controller's declarative
//! metadata, compiles the templates, resolves middleware names, and fails
//! fast on any configuration problem. After that the router is immutable and
//! safely shared across concurrent requests.
//!
//! Dispatch is first-match-wins: candidates for the request method are tried
//! in registration order, the first template that matches selects the route,
//! and no further candidates are considered — registration order, not
//! specificity, decides overlaps.

use tracing::{debug, info};

use crate::error::ConfigError;
use crate::meta::Controller;
use crate::method::Method;
use crate::middleware::MiddlewareRegistry;
use crate::pattern::PathPattern;
use crate::response::Response;
use crate::route::{Route, RouteTable};
use crate::session::Context;

// ── Outcome ───────────────────────────────────────────────────────────────────

/// The result of one dispatch call. Exactly one variant per call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A route matched, every middleware continued, and the handler ran.
    Handled(Response),
    /// A middleware short-circuited; the handler (and any later middleware)
    /// never ran.
    Intercepted(Response),
    /// No route matched the (method, path) pair. Not an error — the
    /// transport boundary maps this to a 404-class response.
    NotFound,
}

impl Outcome {
    /// The response carried by `Handled` or `Intercepted`, if any.
    pub fn response(self) -> Option<Response> {
        match self {
            Self::Handled(resp) | Self::Intercepted(resp) => Some(resp),
            Self::NotFound => None,
        }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// The application router: a middleware registry plus the discovered route
/// table, with [`dispatch`](Router::dispatch) on top.
///
/// ```rust
/// use strada::{middleware, routes, Context, MiddlewareRegistry, Params, Response, Router};
///
/// struct Home;
///
/// impl Home {
///     async fn index(_params: Params, _ctx: Context) -> Response {
///         Response::text("Welcome to Home!")
///     }
/// }
///
/// routes! {
///     Home {
///         index => GET "/home", ["auth"];
///     }
/// }
///
/// # fn main() -> Result<(), strada::Error> {
/// let router = Router::new()
///     .middlewares(MiddlewareRegistry::new().register("auth", middleware::Auth))
///     .controller(Home)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Router {
    registry: MiddlewareRegistry,
    table: RouteTable,
}

impl Router {
    pub fn new() -> Self {
        Self { registry: MiddlewareRegistry::new(), table: RouteTable::new() }
    }

    /// Installs the middleware registry route metadata resolves against.
    /// Call before [`controller`](Router::controller).
    pub fn middlewares(mut self, registry: MiddlewareRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Discovers every route `controller` declares and adds it to the table.
    ///
    /// Operations without route metadata are skipped. Fails fast on a
    /// duplicate (method, template) pair, a malformed template, a middleware
    /// name absent from the registry, or metadata naming an operation the
    /// controller cannot bind. Discovery reads metadata only; it never
    /// invokes a handler.
    pub fn controller(mut self, controller: impl Controller) -> Result<Self, ConfigError> {
        for op in controller.operations() {
            let Some(meta) = op.route else {
                continue;
            };

            let pattern = PathPattern::compile(meta.template)?;

            let handler = controller.bind(op.name).ok_or(ConfigError::UnknownOperation {
                controller: controller.name(),
                name: op.name.to_owned(),
            })?;

            let middlewares = meta
                .middlewares
                .iter()
                .map(|name| {
                    self.registry
                        .resolve(name)
                        .ok_or_else(|| ConfigError::UnknownMiddleware { name: (*name).to_owned() })
                })
                .collect::<Result<Vec<_>, _>>()?;

            info!(
                controller = controller.name(),
                operation = op.name,
                method = %meta.method,
                template = meta.template,
                middlewares = middlewares.len(),
                "route registered"
            );

            self.table.register(meta.method, Route { pattern, handler, middlewares })?;
        }
        Ok(self)
    }

    /// Resolves one request to an [`Outcome`].
    ///
    /// Candidates for `method` are tried in registration order; the first
    /// template matching `raw_path` wins. The route's middlewares then run
    /// in declared order — the first to return a response terminates the
    /// dispatch with [`Outcome::Intercepted`]. If all continue, the handler
    /// runs with the extracted parameters and `ctx`.
    ///
    /// A panic inside a middleware or handler propagates out unchanged; this
    /// layer does not catch, retry, or translate failures.
    pub async fn dispatch(&self, method: Method, raw_path: &str, ctx: Context) -> Outcome {
        for route in self.table.routes_for(method) {
            let Some(params) = route.pattern.matches(raw_path) else {
                continue;
            };

            debug!(method = %method, path = raw_path, template = route.pattern.template(), "route matched");

            for middleware in &route.middlewares {
                if let Some(response) = middleware.handle(&params, &ctx) {
                    debug!(template = route.pattern.template(), "middleware short-circuit");
                    return Outcome::Intercepted(response);
                }
            }

            return Outcome::Handled(route.handler.call(params, ctx).await);
        }

        debug!(method = %method, path = raw_path, "no route matched");
        Outcome::NotFound
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::handler::BoxedHandler;
    use crate::meta::OperationMeta;
    use crate::middleware::{Auth, Middleware};
    use crate::pattern::Params;
    use crate::routes;
    use crate::session::Session;

    struct Home;

    impl Home {
        async fn index(_params: Params, _ctx: Context) -> Response {
            Response::text("Welcome to Home!")
        }

        async fn submit(_params: Params, _ctx: Context) -> Response {
            Response::text("Form submitted!")
        }
    }

    routes! {
        Home {
            index  => GET "/home", ["auth"];
            submit => POST "/submit";
        }
    }

    fn home_router() -> Router {
        Router::new()
            .middlewares(MiddlewareRegistry::new().register("auth", Auth))
            .controller(Home)
            .unwrap()
    }

    fn authed_ctx() -> Context {
        let session = Session::new();
        session.set("user", "alice");
        Context::with_session(session)
    }

    #[tokio::test]
    async fn guarded_route_rejects_anonymous_request() {
        let outcome = home_router().dispatch(Method::Get, "/home", Context::new()).await;
        let Outcome::Intercepted(resp) = outcome else {
            panic!("expected middleware short-circuit, got {outcome:?}");
        };
        assert_eq!(resp.status_code(), http::StatusCode::FORBIDDEN);
        assert_eq!(resp.body(), b"403 Forbidden");
    }

    #[tokio::test]
    async fn guarded_route_admits_authenticated_request() {
        let outcome = home_router().dispatch(Method::Get, "/home", authed_ctx()).await;
        let Outcome::Handled(resp) = outcome else {
            panic!("expected handler response, got {outcome:?}");
        };
        assert_eq!(resp.body(), b"Welcome to Home!");
    }

    #[tokio::test]
    async fn unguarded_route_runs_handler_directly() {
        let outcome = home_router().dispatch(Method::Post, "/submit", Context::new()).await;
        assert_eq!(outcome.response().unwrap().body(), b"Form submitted!");
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let outcome = home_router().dispatch(Method::Get, "/unknown", Context::new()).await;
        assert_eq!(outcome, Outcome::NotFound);
    }

    #[tokio::test]
    async fn unregistered_method_is_not_found() {
        // "/home" exists, but only under GET.
        let outcome = home_router().dispatch(Method::Delete, "/home", Context::new()).await;
        assert_eq!(outcome, Outcome::NotFound);
    }

    // Manual Controller impl: overlapping templates under one method, plus
    // an operation carrying no route metadata.
    struct Overlap;

    impl Overlap {
        async fn by_template(params: Params, _ctx: Context) -> Response {
            Response::text(format!("capture:{}", params.get("x").unwrap_or("")))
        }

        async fn by_literal(_params: Params, _ctx: Context) -> Response {
            Response::text("literal")
        }
    }

    impl Controller for Overlap {
        fn name(&self) -> &'static str {
            "Overlap"
        }

        fn operations(&self) -> Vec<OperationMeta> {
            vec![
                OperationMeta::new("by_template").route(Method::Get, "/items/{x}"),
                OperationMeta::new("by_literal").route(Method::Get, "/items/special"),
                OperationMeta::new("helper"),
            ]
        }

        fn bind(&self, operation: &str) -> Option<BoxedHandler> {
            use crate::handler::Handler;
            match operation {
                "by_template" => Some(Self::by_template.into_boxed_handler()),
                "by_literal" => Some(Self::by_literal.into_boxed_handler()),
                _ => None,
            }
        }
    }

    #[tokio::test]
    async fn first_match_wins_over_later_more_specific_route() {
        let router = Router::new().controller(Overlap).unwrap();
        // Both templates match "/items/special"; the one registered first
        // wins, even though the second is the more specific literal.
        let outcome = router.dispatch(Method::Get, "/items/special", Context::new()).await;
        assert_eq!(outcome.response().unwrap().body(), b"capture:special");
    }

    #[tokio::test]
    async fn routeless_operation_is_skipped() {
        let router = Router::new().controller(Overlap).unwrap();
        let outcome = router.dispatch(Method::Get, "/helper", Context::new()).await;
        assert_eq!(outcome, Outcome::NotFound);
    }

    #[tokio::test]
    async fn handler_receives_extracted_params() {
        let router = Router::new().controller(Overlap).unwrap();
        let outcome = router.dispatch(Method::Get, "/items/42", Context::new()).await;
        assert_eq!(outcome.response().unwrap().body(), b"capture:42");
    }

    // Counter middleware: proves the chain stops at the first short-circuit.
    #[derive(Clone)]
    struct Counting {
        calls: Arc<AtomicUsize>,
        stop: bool,
    }

    impl Middleware for Counting {
        fn handle(&self, _params: &Params, _ctx: &Context) -> Option<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.stop.then(|| Response::status(http::StatusCode::FORBIDDEN))
        }
    }

    struct Chained;

    impl Chained {
        async fn guarded(_params: Params, _ctx: Context) -> Response {
            Response::text("reached handler")
        }
    }

    routes! {
        Chained {
            guarded => GET "/guarded", ["first", "second", "third"];
        }
    }

    #[tokio::test]
    async fn short_circuit_skips_later_middlewares_and_handler() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));

        let registry = MiddlewareRegistry::new()
            .register("first", Counting { calls: Arc::clone(&first), stop: false })
            .register("second", Counting { calls: Arc::clone(&second), stop: true })
            .register("third", Counting { calls: Arc::clone(&third), stop: false });

        let router = Router::new().middlewares(registry).controller(Chained).unwrap();
        let outcome = router.dispatch(Method::Get, "/guarded", Context::new()).await;

        assert!(matches!(outcome, Outcome::Intercepted(_)));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn full_chain_continues_to_handler_in_order() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let third = Arc::new(AtomicUsize::new(0));

        let registry = MiddlewareRegistry::new()
            .register("first", Counting { calls: Arc::clone(&first), stop: false })
            .register("second", Counting { calls: Arc::clone(&second), stop: false })
            .register("third", Counting { calls: Arc::clone(&third), stop: false });

        let router = Router::new().middlewares(registry).controller(Chained).unwrap();
        let outcome = router.dispatch(Method::Get, "/guarded", Context::new()).await;

        assert_eq!(outcome.response().unwrap().body(), b"reached handler");
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(third.load(Ordering::SeqCst), 1);
    }

    // Discovery failure paths.

    struct Duplicated;

    impl Duplicated {
        async fn a(_params: Params, _ctx: Context) -> Response {
            Response::text("a")
        }
        async fn b(_params: Params, _ctx: Context) -> Response {
            Response::text("b")
        }
    }

    routes! {
        Duplicated {
            a => GET "/same";
            b => GET "/same";
        }
    }

    #[test]
    fn duplicate_route_fails_discovery() {
        let err = Router::new().controller(Duplicated).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateRoute { .. }));
    }

    struct BadTemplate;

    impl BadTemplate {
        async fn a(_params: Params, _ctx: Context) -> Response {
            Response::text("a")
        }
    }

    routes! {
        BadTemplate {
            a => GET "/x/{id}/{id}";
        }
    }

    #[test]
    fn malformed_template_fails_discovery() {
        let err = Router::new().controller(BadTemplate).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedTemplate { .. }));
    }

    #[test]
    fn unknown_middleware_fails_discovery() {
        // Home declares "auth" but no registry is installed.
        let err = Router::new().controller(Home).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMiddleware { ref name } if name == "auth"));
    }

    struct Unbindable;

    impl Controller for Unbindable {
        fn name(&self) -> &'static str {
            "Unbindable"
        }
        fn operations(&self) -> Vec<OperationMeta> {
            vec![OperationMeta::new("ghost").route(Method::Get, "/ghost")]
        }
        fn bind(&self, _operation: &str) -> Option<BoxedHandler> {
            None
        }
    }

    #[test]
    fn unbindable_operation_fails_discovery() {
        let err = Router::new().controller(Unbindable).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOperation { .. }));
    }

    #[tokio::test]
    async fn same_template_across_methods_dispatches_independently() {
        struct Both;
        impl Both {
            async fn read(_params: Params, _ctx: Context) -> Response {
                Response::text("read")
            }
            async fn write(_params: Params, _ctx: Context) -> Response {
                Response::text("write")
            }
        }
        routes! {
            Both {
                read  => GET "/thing";
                write => POST "/thing";
            }
        }

        let router = Router::new().controller(Both).unwrap();
        let get = router.dispatch(Method::Get, "/thing", Context::new()).await;
        let post = router.dispatch(Method::Post, "/thing", Context::new()).await;
        assert_eq!(get.response().unwrap().body(), b"read");
        assert_eq!(post.response().unwrap().body(), b"write");
    }
}
