//! # tinyroute
//!
//! The dispatch core of a small HTTP routing framework served by `may_minihttp`
//! coroutines.
//!
//! A request flows through a fixed pipeline:
//!
//! 1. the [`Router`] matches the path against `/literal/:name` templates in
//!    registration order,
//! 2. the [`body`] decoder turns the query string and the request body
//!    (urlencoded, multipart or JSON) into raw request data,
//! 3. the [`params`] binder converts that data into the handler's declared
//!    parameters,
//! 4. the [`HandlerDescriptor`] invokes the handler,
//! 5. the [`response`] codec validates the status code and encodes the body as JSON.
//!
//! The [`Dispatcher`] runs the pipeline and turns failures into
//! `{"error_msg": ...}` responses. The [`server`] module plugs it into
//! `may_minihttp`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use http::Method;
//! use tinyroute::{endpoint, App};
//!
//! #[endpoint]
//! fn hemlo(title: String, uid: i64, name: String, #[default(0)] age: i64) -> String {
//!     format!("{uid}: hemlo, {title} {name} aged {age}")
//! }
//!
//! let mut app = App::from_env();
//! app.register("/:title/:uid/params", [Method::GET, Method::POST], hemlo_handler())?;
//! let server = app.serve("127.0.0.1:8080")?;
//! server.join().ok();
//! ```

// Lets `#[endpoint]` expansions inside this crate refer to `::tinyroute`.
extern crate self as tinyroute;

pub mod app;
pub mod body;
pub mod cli;
pub mod demo;
pub mod dispatcher;
pub mod handler;
pub mod ids;
pub mod logging;
pub mod params;
pub mod response;
pub mod router;
pub mod runtime_config;
pub mod server;

pub use app::App;
pub use dispatcher::{Dispatcher, IncomingRequest, RequestError};
pub use handler::HandlerDescriptor;
pub use params::{Args, BindError, Bytes, FromArgs, Param, ParamKind, ParameterDescriptor, TypeTag};
pub use response::{InvalidStatusCode, IntoReply, Json, Reply, Response};
pub use router::{RouteError, RouteMatch, Router};
pub use runtime_config::RuntimeConfig;
pub use tinyroute_macros::endpoint;

#[doc(hidden)]
pub mod __private {
    pub use anyhow;
}
