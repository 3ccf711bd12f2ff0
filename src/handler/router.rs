//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, extraction of
//! `{prefix}/{container}/{*path}`, redirect base URI computation, and
//! dispatch to the blob handler.

use crate::config::{AppState, FrontendConfig};
use crate::handler::blob::BlobRequest;
use crate::handler::result::{BlobResult, StatusMessage};
use crate::http;
use crate::resolver;
use futures::FutureExt;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HOST;
use hyper::{Method, Request, Response};
use percent_encoding::percent_decode_str;
use std::any::Any;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, warn};

/// Container and container-relative path taken from the request path
#[derive(Debug, PartialEq, Eq)]
pub struct Route<'a> {
    pub container: &'a str,
    /// Wildcard remainder, without its leading `/`
    pub raw_path: &'a str,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method();
    let is_head = *method == Method::HEAD;
    let server_name = state.config.http.server_name.as_str();

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method) {
        return Ok(resp);
    }

    // 2. Split the decoded path into container and object path
    let full_path = decode_path(req.uri().path());
    let Some(route) = parse_route(&full_path, &state.config.http.route_prefix) else {
        warn!(method = %method, path = %full_path, status = 404, "no container in request path");
        return Ok(http::build_result_response(
            BlobResult::Status(StatusMessage::NotFound),
            is_head,
            server_name,
        ));
    };

    // 3. Resolve the object path and the base URI for redirects
    let resolved = resolver::normalize(route.raw_path, &full_path);
    let host = resolver::effective_host(
        state.config.frontend.host_name.as_deref(),
        request_host(&req),
    );
    let base_uri = resolver::base_uri(
        request_scheme(&req, &state.config.frontend),
        host,
        resolver::base_path(&full_path, &resolved),
    );

    // 4. Serve; a panic below this point still yields a response
    let blob_req = BlobRequest {
        method: method.as_str(),
        container: route.container,
        base_uri: &base_uri,
        path: &resolved,
    };
    let result = match AssertUnwindSafe(state.blobs.serve(&blob_req))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(panic) => {
            error!(
                method = %method,
                path = %resolved,
                status = 500,
                category = "panic",
                reason = panic_message(panic.as_ref()),
                "request failed"
            );
            BlobResult::Status(StatusMessage::InternalServerError)
        }
    };

    Ok(http::build_result_response(result, is_head, server_name))
}

/// Check HTTP method and return a response for anything but GET/HEAD
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            warn!(method = %method, status = 405, "method not allowed");
            Some(http::build_405_response())
        }
    }
}

/// Percent-decode a request path; invalid UTF-8 is replaced
pub fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

/// Match `{prefix}/{container}` or `{prefix}/{container}/{*path}`
///
/// `prefix` may be given with or without slashes (`api`, `/api/`).
pub fn parse_route<'a>(full_path: &'a str, prefix: &str) -> Option<Route<'a>> {
    let prefix = prefix.trim_matches('/');
    let rest = if prefix.is_empty() {
        full_path
    } else {
        full_path.strip_prefix('/')?.strip_prefix(prefix)?
    };
    let rest = rest.strip_prefix('/')?;

    let (container, raw_path) = rest.split_once('/').unwrap_or((rest, ""));
    if container.is_empty() {
        return None;
    }
    Some(Route {
        container,
        raw_path,
    })
}

/// `Host` header, falling back to the authority of an absolute-form URI
fn request_host<B>(req: &Request<B>) -> &str {
    req.headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(hyper::http::uri::Authority::as_str))
        .unwrap_or("localhost")
}

fn request_scheme<'a, B>(req: &'a Request<B>, frontend: &'a FrontendConfig) -> &'a str {
    req.uri().scheme_str().unwrap_or(&frontend.scheme)
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
