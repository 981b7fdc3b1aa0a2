//! # rivet
//!
//! A small HTTP service framework built around two contracts every endpoint
//! shares:
//!
//! - **Request ids.** Each request carries an `X-Request-ID`. A supplied one
//!   is trimmed and kept; otherwise a UUID is generated. It is bound into the
//!   request's [`Context`] before the handler runs and echoed on the response.
//! - **One envelope.** API handlers return `Result<T, E>`. `Ok(v)` becomes
//!   `{"code":0,"message":"ok","ts":…,"data":v}`; `Err(e)` becomes
//!   `{"code":…,"message":…,"ts":…,"reason":…,"data":null}`. Both are sent
//!   with `200 OK` in the format negotiated from `Accept`.
//!
//! Around those sit a radix-tree router, a middleware chain, a hyper server
//! with graceful shutdown, TOML configuration and the connection settings
//! for the stores a service usually talks to ([`store`]).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::net::SocketAddr;
//!
//! use http::Method;
//! use rivet::middleware::{RequestIdLayer, Trace, request_id};
//! use rivet::{Request, Router, Server, StatusError};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User { id: u64, name: String }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rivet::Error> {
//!     let app = Router::new()
//!         .layer(RequestIdLayer)
//!         .layer(Trace)
//!         .api(Method::GET, "/users/{id}", get_user);
//!
//!     Server::bind(SocketAddr::from(([0, 0, 0, 0], 3000))).serve(app).await
//! }
//!
//! async fn get_user(req: Request) -> Result<User, StatusError> {
//!     let id = request_id::from_context(req.context());
//!     tracing::info!(%id, "loading user");
//!     match req.param("id").and_then(|s| s.parse().ok()) {
//!         Some(42) => Ok(User { id: 42, name: "alice".into() }),
//!         _ => Err(StatusError::not_found("USER_NOT_FOUND", "no such user")),
//!     }
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod codec;
pub mod config;
pub mod context;
pub mod envelope;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod store;

pub use config::Config;
pub use context::{Context, RequestId};
pub use error::{BoxError, Error};
pub use handler::{ApiHandler, BoxFuture, Handler};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::StatusError;
