use super::status::is_legal_status;
use super::{Body, Reply, Response};
use serde_json::json;
use thiserror::Error;

/// A handler returned a status code outside the legality table.
///
/// This is a programming error in the handler, not a request failure, so it
/// is never turned into a 500 response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid response code {status} for endpoint {handler}")]
pub struct InvalidStatusCode {
    pub status: u16,
    pub handler: String,
}

/// Encode a reply, defaulting the status to 200.
///
/// # Errors
///
/// [`InvalidStatusCode`] when the status is not a registered HTTP status.
pub fn encode(reply: Reply, handler: &str) -> Result<Response, InvalidStatusCode> {
    let status = reply.status.unwrap_or(200);
    if !is_legal_status(status) {
        return Err(InvalidStatusCode {
            status,
            handler: handler.to_string(),
        });
    }
    let body = match reply.body {
        Body::Json(value) => value,
        Body::Error(message) => json!({ "error_msg": message }),
    };
    Ok(Response { body, status })
}
