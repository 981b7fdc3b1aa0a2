//! The response envelope.
//!
//! Every API response, success or failure, has one of two shapes:
//!
//! ```text
//! {"code":0,"message":"ok","ts":"2024-05-01 12:00:00.12345","data":{...}}
//! {"code":404,"message":"not found","ts":"...","reason":"NOT_FOUND","data":null}
//! ```
//!
//! The HTTP status is `200 OK` whenever an envelope is written. The logical
//! outcome is carried by `code`, so clients parse one shape regardless of
//! result. `500` with an empty body is reserved for the case where the
//! envelope itself cannot be marshaled.

use chrono::{DateTime, Local};
use http::StatusCode;
use http::header::CONTENT_TYPE;
use serde::Serialize;

use crate::codec::{self, Codec, CodecError};
use crate::error::BoxError;
use crate::response::Response;
use crate::status::StatusError;

/// Success envelope. `code` is always `0`.
#[derive(Debug, Serialize)]
pub struct Reply<T> {
    pub code: i32,
    pub message: String,
    pub ts: String,
    pub data: T,
}

impl<T> Reply<T> {
    pub fn ok(data: T) -> Self {
        Self { code: 0, message: "ok".to_owned(), ts: timestamp(), data }
    }
}

/// Error envelope. `data` is always `null`.
#[derive(Debug, Serialize)]
pub struct ErrorReply {
    pub code: i32,
    pub message: String,
    pub ts: String,
    pub reason: String,
    pub data: Option<()>,
}

impl From<&StatusError> for ErrorReply {
    fn from(err: &StatusError) -> Self {
        Self {
            code: err.code(),
            message: err.message().to_owned(),
            ts: timestamp(),
            reason: err.reason().to_owned(),
            data: None,
        }
    }
}

/// Encodes `value` as a success envelope using `codec`.
///
/// `codec` is the one negotiated for the request, see
/// [`Request::negotiate`](crate::Request::negotiate). A marshal failure is
/// returned to the caller untouched; that includes values outside the
/// [`Codec`] data model.
pub fn encode_response<T: Serialize>(codec: &dyn Codec, value: T) -> Result<Response, CodecError> {
    let body = marshal(codec, &Reply::ok(value))?;
    Ok(written(codec, body))
}

/// Encodes `err` as an error envelope using `codec`.
///
/// The error is normalized with [`StatusError::from_error`] first. This
/// never fails: if the envelope cannot be marshaled the response is a bare
/// `500` and the failure is only logged.
pub fn encode_error(codec: &dyn Codec, err: impl Into<BoxError>) -> Response {
    let status = StatusError::from_error(err.into());
    match marshal(codec, &ErrorReply::from(&status)) {
        Ok(body) => written(codec, body),
        Err(e) => {
            tracing::error!(
                error = %e,
                code = status.code(),
                reason = status.reason(),
                codec = codec.name(),
                "failed to marshal error reply",
            );
            Response::status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn marshal<T: Serialize>(codec: &dyn Codec, reply: &T) -> Result<Vec<u8>, CodecError> {
    let value = serde_json::to_value(reply)?;
    codec.marshal(&value)
}

fn written(codec: &dyn Codec, body: Vec<u8>) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE.as_str(), &codec::content_type(codec))
        .body(body)
}

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// Local time as `YYYY-MM-DD HH:MM:SS.fffff`.
pub fn timestamp() -> String {
    format_timestamp(Local::now())
}

fn format_timestamp(at: DateTime<Local>) -> String {
    // Five fractional digits, truncated. chrono has no `%5f`.
    let frac = at.timestamp_subsec_nanos() % 1_000_000_000 / 10_000;
    format!("{}.{frac:05}", at.format("%Y-%m-%d %H:%M:%S"))
}

#[cfg(test)]
pub(crate) fn is_timestamp(ts: &str) -> bool {
    let Some((secs, frac)) = ts.split_once('.') else { return false };
    chrono::NaiveDateTime::parse_from_str(secs, "%Y-%m-%d %H:%M:%S").is_ok()
        && frac.len() == 5
        && frac.bytes().all(|b| b.is_ascii_digit())
}
