//! HTTP server and graceful shutdown.
//!
//! One tokio task per connection; hyper drives the requests on it. Each
//! request body is read in full before routing, so handlers see a plain
//! byte slice.
//!
//! # Shutdown
//!
//! On SIGTERM or Ctrl-C the server stops accepting, lets every in-flight
//! connection finish, then returns from [`Server::serve`]. Give the pod a
//! `terminationGracePeriodSeconds` longer than the slowest request.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::{ConfigError, ServerConfig};
use crate::error::Error;
use crate::router::Router;
use crate::status::StatusError;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust,no_run
    /// use std::net::SocketAddr;
    /// use rivet::Server;
    /// let server = Server::bind(SocketAddr::from(([0, 0, 0, 0], 3000)));
    /// ```
    pub fn bind(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Configures the server from the `[server]` section of a [`Config`](crate::Config).
    pub fn from_config(config: &ServerConfig) -> Result<Self, Error> {
        let addr = config.addr.parse().map_err(|_| ConfigError::InvalidAddr(config.addr.clone()))?;
        Ok(Self::bind(addr))
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // Shared by every connection task; never mutated after startup. The
        // Arc lets each task hold the routing table without cloning it.
        let router = Arc::new(router);

        info!(addr = %self.addr, "rivet listening");

        // Every spawned connection task, so shutdown can wait for them.
        let mut tasks = tokio::task::JoinSet::new();

        // select! polls the shutdown future by reference on every turn of the
        // loop, so it has to stay at one address: pin it to the stack.
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Arms are polled in order rather than at random. Shutdown
                // comes first so a SIGTERM stops accepting even while
                // connections are still queued on the listener.
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
                    // hyper has its own IO traits; TokioIo bridges tokio's
                    // AsyncRead/AsyncWrite onto them.
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // service_fn wraps the closure as a hyper Service. It
                        // runs once per request on this connection, not once
                        // per connection.
                        let svc = service_fn(move |req| {
                            let router = Arc::clone(&router);
                            async move { dispatch(router, req).await }
                        });

                        // HTTP/1.1 or HTTP/2, whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet stays bounded.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection to finish before we return.
        while tasks.join_next().await.is_some() {}

        info!("rivet stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Reads the body, then hands the request to the router.
///
/// Never returns an error to hyper: failures become responses.
async fn dispatch(
    router: Arc<Router>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(path = parts.uri.path(), "failed to read request body: {e}");
            let err = StatusError::bad_request(
                "INVALID_BODY",
                format!("failed to read request body: {e}"),
            );
            return Ok(router.reject(parts, err).await);
        }
    };

    Ok(router.call(http::Request::from_parts(parts, body)).await)
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or Ctrl-C.
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

    // A future that never resolves: outside Unix the SIGTERM arm never fires.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
