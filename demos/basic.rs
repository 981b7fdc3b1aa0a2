//! Minimal rivet service: envelope-encoded endpoints, request ids, health checks.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/users/42
//!   curl -i http://localhost:3000/users/7 -H 'x-request-id: demo-1'
//!   curl -i http://localhost:3000/users/42 -H 'accept: application/yaml'
//!   curl -i -X POST http://localhost:3000/users -d '{"name":"bob"}'
//!   curl -i http://localhost:3000/healthz

use http::{Method, StatusCode};
use rivet::middleware::{RequestIdLayer, Trace, request_id};
use rivet::{Config, Request, Response, Router, Server, StatusError, health};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct User {
    id: u64,
    name: String,
}

#[derive(Deserialize)]
struct CreateUser {
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    rivet::logging::init(&config.server.log_filter)?;

    let app = Router::new()
        .layer(RequestIdLayer)
        .layer(Trace)
        .api(Method::GET,  "/users/{id}", get_user)
        .api(Method::POST, "/users",      create_user)
        .on(Method::DELETE, "/users/{id}", delete_user)
        .api(Method::GET,  "/healthz",    health::liveness)
        .api(Method::GET,  "/readyz",     health::readiness);

    Server::from_config(&config.server)?.serve(app).await?;
    Ok(())
}

// GET /users/{id}
async fn get_user(req: Request) -> Result<User, StatusError> {
    let id: u64 = req
        .param("id")
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| StatusError::bad_request("INVALID_ID", "id must be a number"))?;

    tracing::info!(request_id = %request_id::from_context(req.context()), id, "loading user");

    if id != 42 {
        return Err(StatusError::not_found("USER_NOT_FOUND", format!("user {id} not found")));
    }
    Ok(User { id, name: "alice".into() })
}

// POST /users
//
// Body parse failures are plain serde errors; the envelope reports them as
// code 500 with the parser's message.
async fn create_user(req: Request) -> Result<User, serde_json::Error> {
    let input: CreateUser = serde_json::from_slice(req.body())?;
    Ok(User { id: 99, name: input.name })
}

// DELETE /users/{id} → 204, no envelope
async fn delete_user(_req: Request) -> Response {
    Response::status(StatusCode::NO_CONTENT)
}
