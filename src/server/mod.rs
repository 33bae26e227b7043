//! `may_minihttp` integration: the connection acceptor that feeds parsed
//! requests to the [`Dispatcher`](crate::Dispatcher) and writes its responses.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{listen, ServerHandle};
pub use request::{parse_head, RequestHead};
pub use response::write_json_response;
pub use service::AppService;
