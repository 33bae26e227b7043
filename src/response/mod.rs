//! Handler return values and their JSON encoding.
//!
//! Handlers return anything implementing [`IntoReply`]. A `(value, code)`
//! tuple sets the status; any other value is sent with 200. The codec checks
//! the status against [`status::LEGAL_STATUS_CODES`] before a [`Response`] is
//! produced.

pub mod codec;
pub mod status;

pub use codec::{encode, InvalidStatusCode};
pub use status::{is_legal_status, status_reason};

use serde::Serialize;
use serde_json::{json, Value};

/// Body of a reply before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    /// Encoded as `{"error_msg": ...}`
    Error(String),
}

/// A handler's normalized return value.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub body: Body,
    /// `None` means 200
    pub status: Option<u16>,
}

impl Reply {
    #[must_use]
    pub fn json(body: Value) -> Self {
        Self {
            body: Body::Json(body),
            status: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            body: Body::Error(message.into()),
            status: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Conversion from a handler's return type into a [`Reply`].
pub trait IntoReply {
    /// # Errors
    ///
    /// Fails when the value cannot be represented as JSON.
    fn into_reply(self) -> Result<Reply, serde_json::Error>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, serde_json::Error> {
        Ok(self)
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> Result<Reply, serde_json::Error> {
        Ok(Reply::json(self))
    }
}

impl IntoReply for String {
    fn into_reply(self) -> Result<Reply, serde_json::Error> {
        Ok(Reply::json(Value::String(self)))
    }
}

impl IntoReply for &str {
    fn into_reply(self) -> Result<Reply, serde_json::Error> {
        Ok(Reply::json(Value::String(self.to_owned())))
    }
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Reply, serde_json::Error> {
        Ok(Reply::json(Value::Null))
    }
}

macro_rules! impl_into_reply_scalar {
    ($($ty:ty),+) => {$(
        impl IntoReply for $ty {
            fn into_reply(self) -> Result<Reply, serde_json::Error> {
                Ok(Reply::json(Value::from(self)))
            }
        }
    )+};
}

impl_into_reply_scalar!(bool, i32, i64, u32, u64, usize, f64);

impl<T: Serialize> IntoReply for Vec<T> {
    fn into_reply(self) -> Result<Reply, serde_json::Error> {
        serde_json::to_value(self).map(Reply::json)
    }
}

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Result<Reply, serde_json::Error> {
        match self {
            Some(inner) => inner.into_reply(),
            None => Ok(Reply::json(Value::Null)),
        }
    }
}

/// Wrapper sending any serializable value as the JSON body.
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> Result<Reply, serde_json::Error> {
        serde_json::to_value(self.0).map(Reply::json)
    }
}

/// `(body, status)`
impl<T: IntoReply> IntoReply for (T, u16) {
    fn into_reply(self) -> Result<Reply, serde_json::Error> {
        let (body, status) = self;
        Ok(body.into_reply()?.with_status(status))
    }
}

/// An encoded response, ready to be written to the wire as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub body: Value,
    pub status: u16,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { body, status }
    }

    /// `{"error_msg": message}` with the given status.
    #[must_use]
    pub fn error_msg(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "error_msg": message.into() }))
    }

    #[must_use]
    pub fn reason(&self) -> &'static str {
        status_reason(self.status)
    }

    #[must_use]
    pub fn to_json_bytes(&self) -> Vec<u8> {
        self.body.to_string().into_bytes()
    }
}
