//! # Router Module
//!
//! Path matching and route resolution.
//!
//! Templates use `:name` segments for captures (`/:title/:uid/params`).
//! Each template is compiled once at registration into an anchored regex;
//! requests are tested against the routes in registration order and the
//! first route matching both path and method wins. There is no 405: a path
//! that only matches under another method resolves to nothing, which the
//! dispatcher answers with 404.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use tinyroute::{HandlerDescriptor, ParameterDescriptor, Router};
//!
//! let mut router = Router::new();
//! let handler = HandlerDescriptor::new("show", |args| args.get::<String>("uid"))
//!     .param(ParameterDescriptor::required::<String>("uid"));
//! router.register("/users/:uid", [Method::GET], handler).unwrap();
//!
//! let m = router.route(&Method::GET, "/users/42").unwrap();
//! assert_eq!(m.get_path_param("uid"), Some("42"));
//! assert!(router.route(&Method::POST, "/users/42").is_none());
//! ```

mod core;
#[cfg(test)]
mod tests;

pub use core::{ParamVec, RouteError, RouteMatch, Router, MAX_INLINE_PARAMS};
