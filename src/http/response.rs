//! HTTP response building module
//!
//! Turns a [`BlobResult`] into a hyper response, plus the few
//! transport-level responses the router emits itself.

use crate::handler::result::{BlobResult, StatusMessage};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::Response;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters re-encoded when a decoded path is put back into `Location`
const LOCATION_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Build the response for a handler result
///
/// HEAD requests get the same status and headers with an empty body.
pub fn build_result_response(
    result: BlobResult,
    is_head: bool,
    server_name: &str,
) -> Response<Full<Bytes>> {
    let mut response = match result {
        BlobResult::ObjectBody {
            content,
            content_type,
            etag,
        } => build_object_response(content, &content_type, &etag, is_head),
        BlobResult::Redirect { url } => build_redirect_response(&url, is_head),
        BlobResult::Status(status) => build_status_response(status, is_head),
    };

    if let Ok(value) = HeaderValue::from_str(server_name) {
        response.headers_mut().insert(header::SERVER, value);
    }
    response
}

/// Build 200 response carrying an object
pub fn build_object_response(
    data: Bytes,
    content_type: &str,
    etag: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(200)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content_length)
        .header(header::ETAG, etag)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            error_response(StatusMessage::InternalServerError)
        })
}

/// Build 301 redirect response
pub fn build_redirect_response(target: &str, is_head: bool) -> Response<Full<Bytes>> {
    let location = utf8_percent_encode(target, LOCATION_ENCODE_SET).to_string();
    let message = Bytes::from(format!("Redirecting to {location}"));
    let content_length = message.len();
    let body = if is_head { Bytes::new() } else { message };

    Response::builder()
        .status(301)
        .header(header::LOCATION, location.as_str())
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            error_response(StatusMessage::InternalServerError)
        })
}

/// Build 404 / 500 response with its plain-text message
pub fn build_status_response(status: StatusMessage, is_head: bool) -> Response<Full<Bytes>> {
    let message = status.message();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from_static(message.as_bytes())
    };

    Response::builder()
        .status(status.code())
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::CONTENT_LENGTH, message.len())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(message, &e);
            error_response(status)
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::ALLOW, "GET, HEAD")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Last-resort response when a builder rejected its headers
fn error_response(status: StatusMessage) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(status.message().as_bytes())));
    *response.status_mut() =
        hyper::StatusCode::from_u16(status.code()).unwrap_or(hyper::StatusCode::INTERNAL_SERVER_ERROR);
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    tracing::error!(status, error = %error, "failed to build response");
}
