//! # Dispatcher Module
//!
//! Runs one request through the pipeline and owns error translation.
//!
//! ## Request Flow
//!
//! 1. Resolve the route; no match goes straight to encoding the not-found reply
//! 2. Decode the query string and body
//! 3. Bind the handler's declared parameters
//! 4. Invoke the handler, catching panics
//! 5. Encode the reply and validate its status code
//!
//! ## Error Handling
//!
//! Failures in steps 2 to 4 become `{"error_msg": ...}` responses with status
//! 500. Decode and binding messages describe the client's input and are always
//! sent. Handler errors and panics are only sent verbatim when
//! `expose_handler_errors` is set; otherwise the client sees
//! `internal error (request <id>)` and the details are logged.
//!
//! An illegal status code from step 5 is not a response at all:
//! [`Dispatcher::dispatch`] returns it as `Err(InvalidStatusCode)`.
//!
//! Every log line of a dispatch carries the request's ULID `request_id`, taken
//! from `x-request-id` when the client sent a valid one.

mod core;

pub use core::{Dispatcher, IncomingRequest, RequestError};
