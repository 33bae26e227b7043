use may_minihttp::Request;
use std::collections::HashMap;
use tracing::debug;

/// Request line and headers of an incoming request.
#[derive(Debug, PartialEq)]
pub struct RequestHead {
    pub method: String,
    /// Path including the query string
    pub target: String,
    /// Lowercase header names
    pub headers: HashMap<String, String>,
}

/// Extract the request line and headers, leaving the body unread.
#[must_use]
pub fn parse_head(req: &Request) -> RequestHead {
    let headers = collect_headers(
        req.headers()
            .iter()
            .map(|h| (h.name, String::from_utf8_lossy(h.value).into_owned())),
    );

    debug!(
        method = %req.method(),
        target = %req.path(),
        header_count = headers.len(),
        "HTTP request parsed"
    );

    RequestHead {
        method: req.method().to_string(),
        target: req.path().to_string(),
        headers,
    }
}

/// Lowercase header names; a repeated header keeps its last value.
pub fn collect_headers<'a>(
    raw: impl IntoIterator<Item = (&'a str, String)>,
) -> HashMap<String, String> {
    raw.into_iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
        .collect()
}
