//! Routes and the per-method route table.
//!
//! The table is append-only during startup discovery and read-only from then
//! on. Within one method, candidates keep registration order — matching is
//! first-match-wins, so overlapping templates are legal and order-dependent
//! by design. Distinct methods are independent partitions; the same template
//! may appear under both `GET` and `POST`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::middleware::Middleware;
use crate::pattern::PathPattern;

/// One registered route: a compiled template bound to a handler and its
/// resolved middleware chain. Built once during discovery, immutable after.
pub(crate) struct Route {
    pub(crate) pattern: PathPattern,
    pub(crate) handler: BoxedHandler,
    pub(crate) middlewares: Vec<Arc<dyn Middleware>>,
}

/// The per-method route table.
#[derive(Default)]
pub(crate) struct RouteTable {
    routes: HashMap<Method, Vec<Route>>,
}

impl RouteTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends `route` under `method`, rejecting an exact duplicate
    /// (method, template) pair. Overlap between different templates is not
    /// checked; first-match-wins handles it at dispatch time.
    pub(crate) fn register(&mut self, method: Method, route: Route) -> Result<(), ConfigError> {
        let routes = self.routes.entry(method).or_default();
        if routes.iter().any(|r| r.pattern.template() == route.pattern.template()) {
            return Err(ConfigError::DuplicateRoute {
                method,
                template: route.pattern.template().to_owned(),
            });
        }
        routes.push(route);
        Ok(())
    }

    /// Candidates for `method`, in registration order. Empty when the method
    /// has no routes.
    pub(crate) fn routes_for(&self, method: Method) -> &[Route] {
        self.routes.get(&method).map_or(&[], Vec::as_slice)
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let templates: HashMap<Method, Vec<&str>> = self
            .routes
            .iter()
            .map(|(m, rs)| (*m, rs.iter().map(|r| r.pattern.template()).collect()))
            .collect();
        f.debug_struct("RouteTable").field("templates", &templates).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Handler;
    use crate::pattern::Params;
    use crate::response::Response;
    use crate::session::Context;

    fn route(template: &str) -> Route {
        async fn noop(_params: Params, _ctx: Context) -> Response {
            Response::text("")
        }
        Route {
            pattern: PathPattern::compile(template).unwrap(),
            handler: noop.into_boxed_handler(),
            middlewares: Vec::new(),
        }
    }

    #[test]
    fn preserves_registration_order() {
        let mut table = RouteTable::new();
        table.register(Method::Get, route("/a/{x}")).unwrap();
        table.register(Method::Get, route("/a/b")).unwrap();
        table.register(Method::Get, route("/c")).unwrap();

        let templates: Vec<_> = table
            .routes_for(Method::Get)
            .iter()
            .map(|r| r.pattern.template())
            .collect();
        assert_eq!(templates, vec!["/a/{x}", "/a/b", "/c"]);
    }

    #[test]
    fn rejects_duplicate_method_template_pair() {
        let mut table = RouteTable::new();
        table.register(Method::Get, route("/home")).unwrap();
        let err = table.register(Method::Get, route("/home")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateRoute { method: Method::Get, ref template } if template == "/home"
        ));
    }

    #[test]
    fn methods_are_independent_partitions() {
        let mut table = RouteTable::new();
        table.register(Method::Get, route("/home")).unwrap();
        table.register(Method::Post, route("/home")).unwrap();

        assert_eq!(table.routes_for(Method::Get).len(), 1);
        assert_eq!(table.routes_for(Method::Post).len(), 1);
        assert!(table.routes_for(Method::Delete).is_empty());
    }
}
