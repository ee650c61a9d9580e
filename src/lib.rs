//! # strada
//!
//! A minimal declarative request router. Routes live *next to* the handlers
//! they invoke, as metadata on a controller type; a startup discovery pass
//! reads that metadata, compiles the path templates, resolves middleware
//! names, and builds an immutable dispatch table. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! - **Declare once, discover at startup.** A controller lists its routes in
//!   one place with the [`routes!`] macro (or a hand-written [`Controller`]
//!   impl). Misconfiguration — duplicate routes, malformed templates, unknown
//!   middleware names — aborts startup, never a request.
//! - **First-match-wins.** Candidates are tried in registration order; the
//!   first matching template is dispatched. Overlapping templates are legal
//!   and order-dependent by design — no specificity rules.
//! - **Short-circuiting middleware.** Each route carries an ordered guard
//!   chain. The first guard to return a response ends the dispatch; the
//!   handler only runs when every guard continues.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use strada::{middleware, routes, Context, MiddlewareRegistry, Params, Response, Router, Server};
//!
//! struct Home;
//!
//! impl Home {
//!     async fn index(_params: Params, _ctx: Context) -> Response {
//!         Response::text("Welcome to Home!")
//!     }
//!
//!     async fn submit(_params: Params, _ctx: Context) -> Response {
//!         Response::text("Form submitted!")
//!     }
//! }
//!
//! routes! {
//!     Home {
//!         index  => GET "/home", ["auth"];
//!         submit => POST "/submit";
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), strada::Error> {
//!     let router = Router::new()
//!         .middlewares(MiddlewareRegistry::new().register("auth", middleware::Auth))
//!         .controller(Home)?;
//!
//!     Server::bind("0.0.0.0:3000").serve(router).await
//! }
//! ```
//!
//! The dispatch core is usable without the server: call
//! [`Router::dispatch`] with a method, a raw path, and a [`Context`] and
//! match on the returned [`Outcome`].

mod error;
mod handler;
mod meta;
mod method;
mod pattern;
mod response;
mod route;
mod router;
mod server;
mod session;

pub mod middleware;

pub use error::{ConfigError, Error};
pub use handler::{BoxedHandler, Handler};
pub use meta::{Controller, OperationMeta, RouteMeta};
pub use method::Method;
pub use middleware::MiddlewareRegistry;
pub use pattern::{Params, PathPattern};
pub use response::{IntoResponse, Response};
pub use router::{Outcome, Router};
pub use server::Server;
pub use session::{Context, Session};
