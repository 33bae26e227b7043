//! Request body decoding.
//!
//! [`decode`] reads the query string and the body into [`RawRequestData`]:
//! urlencoded and multipart bodies become flat [`FieldMap`]s, a JSON body
//! becomes the request's structured document.

pub mod decoder;
pub mod multipart;

pub use decoder::{decode, parse_pairs, BodyEncoding};
pub use multipart::MultipartError;

use crate::router::ParamVec;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// A raw field value from a query string, form or multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Multipart part whose content is not UTF-8
    Binary(Vec<u8>),
    /// Multipart field sent more than once
    Many(Vec<FieldValue>),
}

impl FieldValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

pub type FieldMap = HashMap<String, FieldValue>;

/// Everything one request supplies for parameter binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRequestData {
    /// Path captures, in template order
    pub path: ParamVec,
    pub query: FieldMap,
    pub form: FieldMap,
    /// Parsed JSON body
    pub document: Option<Value>,
}

impl RawRequestData {
    /// Form fields layered over query fields.
    #[must_use]
    pub fn flat_map(&self) -> FieldMap {
        let mut merged = self.query.clone();
        merged.extend(self.form.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Content-Length header is required for {0} bodies")]
    MissingContentLength(&'static str),
    #[error("invalid Content-Length header: {0:?}")]
    InvalidContentLength(String),
    #[error("request body of {length} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { length: usize, limit: usize },
    #[error("request body ended after {received} of {expected} bytes")]
    TruncatedBody { expected: usize, received: usize },
    #[error("failed to read request body: {0}")]
    Io(#[from] std::io::Error),
    #[error("request data is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("malformed field {0:?}: expected key=value")]
    MalformedPair(String),
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error("unsupported content type {0:?}")]
    UnsupportedContentType(String),
}
