//! Minimal strada example — declarative routes, an auth guard, and sessions.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/home            # 403 Forbidden (no session user)
//!   curl -X POST http://localhost:3000/login   # stores a session user
//!   curl http://localhost:3000/home            # Welcome to Home!
//!   curl -X POST http://localhost:3000/submit  # Form submitted!
//!   curl http://localhost:3000/greet/world     # Hello, world!

use strada::{middleware, routes, Context, MiddlewareRegistry, Params, Response, Router, Server, Session};

struct Home;

impl Home {
    // GET /home — guarded: only runs when the session has a "user".
    async fn index(_params: Params, _ctx: Context) -> Response {
        Response::text("Welcome to Home!")
    }

    // POST /submit — no middleware.
    async fn submit(_params: Params, _ctx: Context) -> Response {
        Response::text("Form submitted!")
    }

    // POST /login — sets the session user the auth guard looks for.
    async fn login(_params: Params, ctx: Context) -> Response {
        ctx.session().set("user", "alice");
        Response::text("logged in")
    }

    // GET /greet/{name} — path capture.
    async fn greet(params: Params, _ctx: Context) -> Response {
        let name = params.get("name").unwrap_or("stranger");
        Response::text(format!("Hello, {name}!"))
    }
}

routes! {
    Home {
        index  => GET "/home", ["trace", "auth"];
        submit => POST "/submit";
        login  => POST "/login";
        greet  => GET "/greet/{name}", ["trace"];
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let registry = MiddlewareRegistry::new()
        .register("auth", middleware::Auth)
        .register("trace", middleware::Trace);

    let router = Router::new()
        .middlewares(registry)
        .controller(Home)
        .expect("route configuration error");

    Server::bind("0.0.0.0:3000")
        .session(Session::new())
        .serve(router)
        .await
        .expect("server error");
}
