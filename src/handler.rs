//! Handler trait and type erasure.
//!
//! The route table holds handlers of *different* concrete types in one
//! collection, so each handler is hidden behind a trait object. The chain
//! from user code to vtable call:
//!
//! ```text
//! async fn index(params: Params, ctx: Context) -> Response { … }
//!        ↓ discovery: Controller::bind("index")
//! index.into_boxed_handler()                     ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(index))                     ← stored as BoxedHandler
//!        ↓ dispatch time
//! handler.call(params, ctx)                      ← one vtable dispatch
//!        ↓
//! Box::pin(async { index(params, ctx).await.into_response() })
//! ```
//!
//! Per request that is one `Arc` clone and one virtual call — noise next to
//! network I/O.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::pattern::Params;
use crate::response::{IntoResponse, Response};
use crate::session::Context;

/// A heap-allocated, type-erased future resolving to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears behind
/// the public [`BoxedHandler`] alias returned by [`Handler::into_boxed_handler`].
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, params: Params, ctx: Context) -> BoxFuture;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with the signature:
///
/// ```text
/// async fn name(params: Params, ctx: Context) -> impl IntoResponse
/// ```
///
/// The trait is sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Params, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Params, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Newtype bridging a concrete handler `F` into the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Params, Context) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, params: Params, ctx: Context) -> BoxFuture {
        let fut = (self.0)(params, ctx);
        Box::pin(async move { fut.await.into_response() })
    }
}
