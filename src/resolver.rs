//! Path resolution module
//!
//! Pure functions that turn a raw request path into an object path inside a
//! container, and compute the absolute base URI used for redirects.
//! Nothing here performs I/O.

/// Normalise the path of an object within a container.
///
/// `raw_path` is the wildcard part of the route (relative to the container
/// root), `full_path` the complete request path. The result is one of:
///
/// - `""` when no path was given and the request did not end in `/`
///   (the bare container root, always redirected)
/// - `"/"` when no path was given but the request ended in `/`
/// - `raw_path` with a leading `/` otherwise
///
/// # Examples
/// ```
/// use blobsite::resolver::normalize;
/// assert_eq!(normalize("", "/site"), "");
/// assert_eq!(normalize("", "/site/"), "/");
/// assert_eq!(normalize("css/main.css", "/site/css/main.css"), "/css/main.css");
/// ```
pub fn normalize(raw_path: &str, full_path: &str) -> String {
    if raw_path.is_empty() {
        if full_path.ends_with('/') {
            "/".to_string()
        } else {
            String::new()
        }
    } else if raw_path.starts_with('/') {
        raw_path.to_string()
    } else {
        format!("/{raw_path}")
    }
}

/// Part of the request path that precedes the resolved object path
///
/// The last occurrence of `resolved` is cut off, so `/api/site/docs` with
/// `/docs` yields `/api/site`. An empty or absent `resolved` leaves the
/// request path untouched.
pub fn base_path<'a>(full_path: &'a str, resolved: &str) -> &'a str {
    if resolved.is_empty() {
        return full_path;
    }
    full_path
        .rfind(resolved)
        .map_or(full_path, |idx| &full_path[..idx])
}

/// Host used to build redirect URLs
///
/// An empty override counts as not configured.
pub fn effective_host<'a>(host_override: Option<&'a str>, host_header: &'a str) -> &'a str {
    match host_override {
        Some(host) if !host.is_empty() => host,
        _ => host_header,
    }
}

/// Absolute base URI for redirects: `{scheme}://{host}{base_path}`
pub fn base_uri(scheme: &str, host: &str, base_path: &str) -> String {
    format!("{scheme}://{host}{base_path}")
}

/// Substitute the index filename for directory-style paths
///
/// Only applies when an index is configured and `resolved` is empty or ends
/// in `/`.
pub fn index_candidate(resolved: &str, index_name: Option<&str>) -> String {
    match index_name {
        Some(index) if !index.is_empty() && (resolved.is_empty() || resolved.ends_with('/')) => {
            format!("{resolved}{index}")
        }
        _ => resolved.to_string(),
    }
}

/// Final `/`-separated segment of a path
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
