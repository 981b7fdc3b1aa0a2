//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Both answer with the success envelope, so probes and clients parse the
//! same shape:
//!
//! ```rust,no_run
//! use http::Method;
//! use rivet::{Router, health};
//!
//! let app = Router::new()
//!     .api(Method::GET, "/healthz", health::liveness)
//!     .api(Method::GET, "/readyz", health::readiness);
//! ```
//!
//! Gate readiness on dependencies by writing your own handler and failing
//! with a [`StatusError`]:
//!
//! ```rust,no_run
//! use rivet::{Request, StatusError};
//!
//! async fn readiness(_req: Request) -> Result<&'static str, StatusError> {
//!     if dependencies_are_healthy().await {
//!         Ok("ready")
//!     } else {
//!         Err(StatusError::service_unavailable("NOT_READY", "database unreachable"))
//!     }
//! }
//!
//! async fn dependencies_are_healthy() -> bool { true }
//! ```

use crate::{Request, StatusError};

/// Liveness probe. Always `{"code":0,"message":"ok",…,"data":"ok"}`.
pub async fn liveness(_req: Request) -> Result<&'static str, StatusError> {
    Ok("ok")
}

/// Readiness probe (default implementation). Always ready.
pub async fn readiness(_req: Request) -> Result<&'static str, StatusError> {
    Ok("ready")
}
