//! Incoming HTTP request type.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};

use crate::codec::{Codec, Codecs};
use crate::context::Context;

/// An incoming HTTP request with its body fully read.
pub struct Request {
    head: Parts,
    body: Bytes,
    params: HashMap<String, String>,
    context: Context,
    codecs: Arc<Codecs>,
}

impl Request {
    pub(crate) fn new(
        head: Parts,
        body: Bytes,
        params: HashMap<String, String>,
        codecs: Arc<Codecs>,
    ) -> Self {
        Self { head, body, params, context: Context::new(), codecs }
    }

    pub fn method(&self) -> &Method { &self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn path(&self) -> &str { self.head.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Values that are not visible ASCII
    /// are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Request-scoped state.
    pub fn context(&self) -> &Context { &self.context }

    /// Replaces the request-scoped state seen by everything downstream.
    pub fn set_context(&mut self, context: Context) {
        self.context = context;
    }

    /// The codec negotiated from this request's `Accept` header.
    pub fn negotiate(&self) -> Arc<dyn Codec> {
        self.codecs.for_request(&self.head.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestId;

    fn request(accept: Option<&str>) -> Request {
        let mut builder = http::Request::builder().uri("/users/42?full=1");
        if let Some(accept) = accept {
            builder = builder.header("accept", accept);
        }
        let (head, ()) = builder.body(()).unwrap().into_parts();
        let params = HashMap::from([("id".to_owned(), "42".to_owned())]);
        Request::new(head, Bytes::from_static(b"{}"), params, Arc::new(Codecs::new()))
    }

    #[test]
    fn accessors() {
        let req = request(Some("application/yaml"));
        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.path(), "/users/42");
        assert_eq!(req.param("id"), Some("42"));
        assert_eq!(req.param("missing"), None);
        assert_eq!(req.header("ACCEPT"), Some("application/yaml"));
        assert_eq!(req.body(), b"{}");
    }

    #[test]
    fn negotiates_from_accept() {
        assert_eq!(request(Some("application/yaml")).negotiate().name(), "yaml");
        assert_eq!(request(None).negotiate().name(), "json");
    }

    #[test]
    fn context_starts_empty_and_can_be_replaced() {
        let mut req = request(None);
        assert!(req.context().request_id().is_none());
        let ctx = req.context().with_request_id(RequestId::from("abc"));
        req.set_context(ctx);
        assert_eq!(req.context().request_id().map(RequestId::as_str), Some("abc"));
    }
}
