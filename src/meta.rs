//! Declarative route metadata.
//!
//! Routes are declared *next to* the handler, not registered imperatively:
//! a controller exposes a metadata table describing its public operations,
//! and discovery ([`Router::controller`](crate::Router::controller)) reads
//! that table once at startup. The [`routes!`](crate::routes) macro writes
//! both sides of this trait from a single declaration.
//!
//! Discovery only ever *reads* metadata and binds callables — it never
//! invokes an operation.

use crate::handler::BoxedHandler;
use crate::method::Method;

/// Route metadata attached to one operation: a (method, template) pair and
/// the names of the middlewares to run before the handler, in order.
#[derive(Clone, Debug)]
pub struct RouteMeta {
    pub method: Method,
    pub template: &'static str,
    pub middlewares: Vec<&'static str>,
}

/// Metadata for one public operation on a controller.
///
/// An operation without route metadata (`route: None`) is skipped by
/// discovery and contributes no route.
#[derive(Clone, Debug)]
pub struct OperationMeta {
    pub name: &'static str,
    pub route: Option<RouteMeta>,
}

impl OperationMeta {
    /// An operation with no route metadata.
    pub fn new(name: &'static str) -> Self {
        Self { name, route: None }
    }

    /// Attaches route metadata. At most one route per operation.
    pub fn route(mut self, method: Method, template: &'static str) -> Self {
        self.route = Some(RouteMeta { method, template, middlewares: Vec::new() });
        self
    }

    /// Attaches middleware names, run in the given order. Only meaningful
    /// after [`route`](Self::route).
    pub fn middlewares(mut self, names: &[&'static str]) -> Self {
        if let Some(route) = &mut self.route {
            route.middlewares = names.to_vec();
        }
        self
    }
}

/// A handler-bearing type with declarative route metadata.
///
/// Implement by hand, or declare with the [`routes!`](crate::routes) macro:
///
/// ```rust
/// use strada::{routes, Context, Params, Response};
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
/// ```
pub trait Controller {
    /// A short stable name for diagnostics (conventionally the type name).
    fn name(&self) -> &'static str;

    /// The declarative metadata table: one entry per public operation.
    fn operations(&self) -> Vec<OperationMeta>;

    /// Resolves an operation name to its callable. Returns `None` for names
    /// absent from the metadata table.
    fn bind(&self, operation: &str) -> Option<BoxedHandler>;
}

/// Implements [`Controller`] from a single route declaration.
///
/// Each line binds an operation (an `async fn` on the type, taking
/// `(Params, Context)`) to a method, a path template, and an optional
/// ordered middleware list:
///
/// ```rust
/// use strada::{routes, Context, Params, Response};
///
/// struct Home;
///
/// impl Home {
///     async fn index(_params: Params, _ctx: Context) -> Response {
///         Response::text("Welcome to Home!")
///     }
///     async fn submit(_params: Params, _ctx: Context) -> Response {
///         Response::text("Form submitted!")
///     }
/// }
///
/// routes! {
///     Home {
///         index  => GET "/home", ["auth"];
///         submit => POST "/submit";
///     }
/// }
/// ```
#[macro_export]
macro_rules! routes {
    ($ty:ident { $( $op:ident => $method:ident $template:literal $(, [ $($mw:literal),* $(,)? ])? ; )+ }) => {
        impl $crate::Controller for $ty {
            fn name(&self) -> &'static str {
                stringify!($ty)
            }

            fn operations(&self) -> ::std::vec::Vec<$crate::OperationMeta> {
                ::std::vec![
                    $(
                        $crate::OperationMeta::new(stringify!($op))
                            .route($crate::routes!(@method $method), $template)
                            $( .middlewares(&[ $($mw),* ]) )?
                    ),+
                ]
            }

            fn bind(&self, operation: &str) -> ::std::option::Option<$crate::BoxedHandler> {
                match operation {
                    $( stringify!($op) => {
                        ::std::option::Option::Some($crate::Handler::into_boxed_handler(Self::$op))
                    } )+
                    _ => ::std::option::Option::None,
                }
            }
        }
    };

    (@method GET)     => { $crate::Method::Get };
    (@method POST)    => { $crate::Method::Post };
    (@method PUT)     => { $crate::Method::Put };
    (@method DELETE)  => { $crate::Method::Delete };
    (@method PATCH)   => { $crate::Method::Patch };
    (@method HEAD)    => { $crate::Method::Head };
    (@method OPTIONS) => { $crate::Method::Options };
    (@method CONNECT) => { $crate::Method::Connect };
    (@method TRACE)   => { $crate::Method::Trace };
}
