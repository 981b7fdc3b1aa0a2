//! End-to-end behaviour of the router, request-id middleware and envelopes.

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, StatusCode};
use http_body_util::BodyExt;
use rivet::codec::{Codec, CodecError};
use rivet::middleware::{Middleware, Next, RequestIdLayer, Trace, X_REQUEST_ID, request_id};
use rivet::{BoxFuture, Request, RequestId, Response, Router, StatusError};
use serde_json::{Value, json};
use uuid::Uuid;

struct Reply {
    status: StatusCode,
    request_id: Option<String>,
    content_type: Option<String>,
    body: Bytes,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("body is json")
    }
}

async fn send(app: &Router, method: Method, path: &str, headers: &[(&str, &str)]) -> Reply {
    let mut builder = http::Request::builder().method(method).uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let resp = app.call(builder.body(Bytes::new()).unwrap()).await;

    let header = |name: http::HeaderName| {
        resp.headers().get(name).map(|v: &http::HeaderValue| v.to_str().unwrap().to_owned())
    };
    let status = resp.status();
    let request_id = header(X_REQUEST_ID);
    let content_type = header(CONTENT_TYPE);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    Reply { status, request_id, content_type, body }
}

fn is_timestamp(ts: &str) -> bool {
    let Some((secs, frac)) = ts.split_once('.') else { return false };
    chrono::NaiveDateTime::parse_from_str(secs, "%Y-%m-%d %H:%M:%S").is_ok()
        && frac.len() == 5
        && frac.bytes().all(|b| b.is_ascii_digit())
}

async fn counter(_req: Request) -> Result<Value, StatusError> {
    Ok(json!({ "n": 1 }))
}

async fn missing(_req: Request) -> Result<Value, StatusError> {
    Err(StatusError::not_found("NOT_FOUND", "not found"))
}

async fn echo_id(req: Request) -> Result<String, StatusError> {
    Ok(request_id::from_context(req.context()).to_string())
}

fn app() -> Router {
    Router::new()
        .layer(RequestIdLayer)
        .layer(Trace)
        .api(Method::GET, "/counter", counter)
        .api(Method::GET, "/missing", missing)
        .api(Method::GET, "/whoami", echo_id)
}

// ── Request ids ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn padded_request_id_is_trimmed_bound_and_echoed() {
    let reply = send(&app(), Method::GET, "/counter", &[("x-request-id", "  abc-123  ")]).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.request_id.as_deref(), Some("abc-123"));
    assert_eq!(reply.content_type.as_deref(), Some("application/json"));

    let body = reply.json();
    assert_eq!(body["code"], 0);
    assert_eq!(body["message"], "ok");
    assert_eq!(body["data"], json!({ "n": 1 }));
    assert!(is_timestamp(body["ts"].as_str().unwrap()));

    let text = std::str::from_utf8(&reply.body).unwrap();
    let ts = body["ts"].as_str().unwrap();
    assert_eq!(text, format!(r#"{{"code":0,"message":"ok","ts":"{ts}","data":{{"n":1}}}}"#));
}

#[tokio::test]
async fn handler_sees_the_bound_id() {
    let reply = send(&app(), Method::GET, "/whoami", &[("X-Request-ID", "Trace-Me")]).await;
    assert_eq!(reply.json()["data"], "Trace-Me");
    assert_eq!(reply.request_id.as_deref(), Some("Trace-Me"));
}

#[tokio::test]
async fn missing_or_blank_id_is_generated_and_consistent() {
    for headers in [&[][..], &[("x-request-id", "   ")][..]] {
        let reply = send(&app(), Method::GET, "/whoami", headers).await;
        let echoed = reply.request_id.clone().expect("id echoed");
        assert!(Uuid::parse_str(&echoed).is_ok(), "{echoed}");
        assert_eq!(reply.json()["data"], echoed.as_str());
    }
}

#[tokio::test]
async fn without_the_layer_lookup_still_answers() {
    let app = Router::new().api(Method::GET, "/whoami", echo_id);
    let reply = send(&app, Method::GET, "/whoami", &[("x-request-id", "ignored")]).await;

    assert!(reply.request_id.is_none());
    let data = reply.json()["data"].as_str().unwrap().to_owned();
    assert!(Uuid::parse_str(&data).is_ok());
}

/// Rebinds the id for everything downstream of it.
struct Override(&'static str);

impl Middleware for Override {
    fn call(&self, mut req: Request, next: Next) -> BoxFuture {
        let original = req.context().clone();
        req.set_context(request_id::with_context(&original, RequestId::from(self.0)));
        Box::pin(async move {
            let mut resp = next.run(req).await;
            // The context captured before the override still holds the old id.
            if let Some(id) = original.request_id() {
                resp.headers_mut().insert("x-original-id", id.as_str().parse().unwrap());
            }
            resp
        })
    }
}

#[tokio::test]
async fn override_applies_downstream_only() {
    let app = Router::new()
        .layer(RequestIdLayer)
        .layer(Override("rebound"))
        .api(Method::GET, "/whoami", echo_id);
    let resp = app
        .call(
            http::Request::get("/whoami")
                .header("x-request-id", "outer")
                .body(Bytes::new())
                .unwrap(),
        )
        .await;

    assert_eq!(resp.headers()[X_REQUEST_ID], "outer");
    assert_eq!(resp.headers()["x-original-id"], "outer");
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"], "rebound");
}

// ── Error envelopes ───────────────────────────────────────────────────────────

#[tokio::test]
async fn structured_error_is_encoded_with_status_200() {
    let reply = send(&app(), Method::GET, "/missing", &[]).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert!(Uuid::parse_str(reply.request_id.as_deref().unwrap()).is_ok());

    let body = reply.json();
    let ts = body["ts"].as_str().unwrap();
    assert!(is_timestamp(ts));
    assert_eq!(
        std::str::from_utf8(&reply.body).unwrap(),
        format!(r#"{{"code":404,"message":"not found","ts":"{ts}","reason":"NOT_FOUND","data":null}}"#),
    );
}

#[derive(Debug)]
struct DiskFull;

impl std::fmt::Display for DiskFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("disk full")
    }
}

impl std::error::Error for DiskFull {}

async fn foreign(_req: Request) -> Result<(), DiskFull> {
    Err(DiskFull)
}

#[tokio::test]
async fn foreign_error_gets_generic_code() {
    let app = Router::new().api(Method::GET, "/foreign", foreign);
    let body = send(&app, Method::GET, "/foreign", &[]).await.json();

    assert_eq!(body["code"], 500);
    assert_eq!(body["reason"], "");
    assert_eq!(body["message"], "disk full");
    assert_eq!(body["data"], Value::Null);
}

struct Broken;

impl Codec for Broken {
    fn name(&self) -> &str { "broken" }
    fn marshal(&self, _: &Value) -> Result<Vec<u8>, CodecError> {
        Err(CodecError::Custom("nope".into()))
    }
}

#[tokio::test]
async fn marshal_failure_is_bare_500_on_both_paths() {
    let app = app().codec(Broken);

    for path in ["/missing", "/counter"] {
        let reply = send(&app, Method::GET, path, &[("accept", "application/broken")]).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        assert!(reply.body.is_empty(), "{path}");
        assert!(reply.content_type.is_none(), "{path}");
        assert!(reply.request_id.is_some(), "{path}");
    }
}

// ── Negotiation and routing ───────────────────────────────────────────────────

#[tokio::test]
async fn yaml_is_negotiated_from_accept() {
    let reply = send(&app(), Method::GET, "/counter", &[(ACCEPT.as_str(), "application/yaml")]).await;

    assert_eq!(reply.content_type.as_deref(), Some("application/yaml"));
    let body: Value = serde_yaml::from_slice(&reply.body).unwrap();
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["n"], 1);
}

#[tokio::test]
async fn unknown_accept_falls_back_to_json() {
    let reply = send(&app(), Method::GET, "/counter", &[("accept", "text/html, */*")]).await;
    assert_eq!(reply.content_type.as_deref(), Some("application/json"));
    assert_eq!(reply.json()["code"], 0);
}

#[tokio::test]
async fn unmatched_routes_get_error_envelopes() {
    let reply = send(&app(), Method::GET, "/nowhere", &[]).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.request_id.is_some());
    assert_eq!(reply.json()["code"], 404);
    assert_eq!(reply.json()["reason"], "NOT_FOUND");

    let reply = send(&app(), Method::POST, "/counter", &[]).await;
    assert_eq!(reply.json()["code"], 405);
    assert_eq!(reply.json()["reason"], "METHOD_NOT_ALLOWED");
}

async fn raw(req: Request) -> Response {
    Response::builder()
        .status(StatusCode::CREATED)
        .text(format!("user {}", req.param("id").unwrap_or("?")))
}

#[tokio::test]
async fn raw_routes_bypass_the_envelope_but_keep_the_id() {
    let app = Router::new().layer(RequestIdLayer).on(Method::PUT, "/users/{id}", raw);
    let reply = send(&app, Method::PUT, "/users/7", &[("x-request-id", "r-1")]).await;

    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(&reply.body[..], b"user 7");
    assert_eq!(reply.request_id.as_deref(), Some("r-1"));
}

#[tokio::test]
async fn health_probes_answer_with_envelopes() {
    let app = Router::new()
        .api(Method::GET, "/healthz", rivet::health::liveness)
        .api(Method::GET, "/readyz", rivet::health::readiness);

    assert_eq!(send(&app, Method::GET, "/healthz", &[]).await.json()["data"], "ok");
    assert_eq!(send(&app, Method::GET, "/readyz", &[]).await.json()["data"], "ready");
}
