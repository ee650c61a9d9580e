//! HTTP transport and graceful shutdown.
//!
//! The server is the outermost boundary: it decodes one (method, raw-path)
//! pair per request, builds the request-scoped [`Context`], calls
//! [`Router::dispatch`], and maps the [`Outcome`] onto the wire:
//!
//! - `Handled` / `Intercepted` — the carried response, verbatim
//! - `NotFound` — `404` with body `404 Not Found`
//! - an unparseable method string — `405`, before dispatch is ever called
//!
//! On SIGTERM or Ctrl-C the listener stops accepting immediately and every
//! in-flight connection is drained before [`Server::serve`] returns.

use std::net::SocketAddr;
use std::sync::Arc;

use http::StatusCode;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Error;
use crate::method::Method;
use crate::response::Response;
use crate::router::{Outcome, Router};
use crate::session::{Context, Session};

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    session: Session,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr, session: Session::new() }
    }

    /// Uses `session` as the ambient session store handed to every request
    /// context, replacing the default empty store.
    pub fn session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // Shared read-only across connection tasks; the table never mutates
        // after discovery.
        let router = Arc::new(router);
        let session = self.session;

        info!(addr = %self.addr, "strada listening");

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` makes select! check arms top-to-bottom, so a
                // shutdown signal stops accepting even with connections queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let session = session.clone();
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection, not once
                        // per connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            let ctx = Context::with_session(session.clone());
                            async move { handle(router, req, ctx).await }
                        });

                        // auto::Builder speaks HTTP/1.1 or HTTP/2, whatever
                        // the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection before returning.
        while tasks.join_next().await.is_some() {}

        info!("strada stopped");
        Ok(())
    }
}

// ── Request handling ──────────────────────────────────────────────────────────

/// Core hot path: one request in, one response out.
///
/// The error type is [`Infallible`](std::convert::Infallible) — every outcome
/// becomes a response, so hyper never sees an error from this layer. A panic
/// inside a handler or middleware aborts only its own connection task.
async fn handle(
    router: Arc<Router>,
    req: hyper::Request<hyper::body::Incoming>,
    ctx: Context,
) -> Result<http::Response<http_body_util::Full<bytes::Bytes>>, std::convert::Infallible> {
    let Ok(method) = req.method().as_str().parse::<Method>() else {
        let resp = Response::status(StatusCode::METHOD_NOT_ALLOWED);
        return Ok(resp.into_http());
    };
    let path = req.uri().path().to_owned();

    let response = match router.dispatch(method, &path, ctx).await {
        Outcome::Handled(resp) | Outcome::Intercepted(resp) => resp,
        Outcome::NotFound => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .text("404 Not Found"),
    };

    Ok(response.into_http())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both SIGTERM (sent by orchestrators) and SIGINT
/// (Ctrl-C, for local dev). On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` never resolves — on non-Unix platforms the SIGTERM arm is
    // effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
