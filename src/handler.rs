//! Handler traits and type erasure.
//!
//! # How async handlers are stored
//!
//! The router holds handlers of *different* types in a single
//! `HashMap<Method, Tree>`, so each one is hidden behind a trait object
//! (`dyn ErasedHandler`) and stored uniformly:
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.on(Method::GET, "/", hello)
//! hello.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(hello))                       ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time               ← one vtable dispatch
//! ```
//!
//! There are two kinds of handler:
//!
//! - [`Handler`]: `async fn(Request) -> impl IntoResponse`. The response is
//!   sent as-is.
//! - [`ApiHandler`]: `async fn(Request) -> Result<T, E>`. `Ok` becomes a
//!   success envelope, `Err` an error envelope, both marshaled with the codec
//!   negotiated from the request.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;

use crate::envelope;
use crate::error::{BoxError, Error};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// Pinned because a future may not move once it has been polled. `Send +
/// 'static` so tokio can run it on any worker thread.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public handler traits.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
///
/// Cloning the `Arc` per request is one atomic increment; the handler itself
/// is never copied.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// Private, so no type outside this crate can name these and implement the
// handler traits by hand.
mod private {
    pub trait Sealed {}
    pub trait SealedApi<M> {}
}

// ── Raw handlers ──────────────────────────────────────────────────────────────

/// Implemented for every valid raw route handler:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// Sealed: only the blanket impl below satisfies it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── API handlers ──────────────────────────────────────────────────────────────

/// Implemented for every valid API route handler:
///
/// ```text
/// async fn name(req: Request) -> Result<T: Serialize, E: Into<BoxError>>
/// ```
///
/// `M` is an inference marker; callers never name it. It carries `(T, E)`
/// so the compiler can pick the impl from the handler's return type without
/// the two blanket impls overlapping.
pub trait ApiHandler<M>: private::SealedApi<M> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

impl<F, Fut, T, E> private::SealedApi<(T, E)> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Serialize + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
}

impl<F, Fut, T, E> ApiHandler<(T, E)> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Serialize + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(EnvelopeHandler { f: self, _marker: PhantomData })
    }
}

struct EnvelopeHandler<F, M> {
    f: F,
    _marker: PhantomData<fn() -> M>,
}

impl<F, Fut, T, E> ErasedHandler for EnvelopeHandler<F, (T, E)>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Serialize + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        // Negotiate before the handler takes ownership of the request.
        let codec = req.negotiate();
        let fut = (self.f)(req);
        Box::pin(async move {
            match fut.await {
                Ok(value) => envelope::encode_response(codec.as_ref(), value)
                    .unwrap_or_else(|e| Error::from(e).into_response()),
                Err(err) => envelope::encode_error(codec.as_ref(), err),
            }
        })
    }
}
