use crate::body::{self, DecodeError};
use crate::handler::HandlerDescriptor;
use crate::ids::RequestId;
use crate::params::{self, Args, BindError};
use crate::response::{self, InvalidStatusCode, Reply, Response};
use crate::router::{RouteMatch, Router};
use crate::runtime_config::RuntimeConfig;
use http::Method;
use std::any::Any;
use std::collections::HashMap;
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// A parsed request as handed over by the connection acceptor.
pub struct IncomingRequest<'a, R> {
    pub method: &'a str,
    /// Request target: path plus optional `?query`
    pub target: &'a str,
    /// Header names must be lowercase
    pub headers: &'a HashMap<String, String>,
    pub body: R,
}

/// Request-scoped failures, all answered with status 500.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error("{0:#}")]
    Handler(anyhow::Error),
    #[error("handler panicked: {0}")]
    Panic(String),
}

/// Stateless request dispatcher over a shared, read-only route table.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
    config: RuntimeConfig,
}

impl Dispatcher {
    #[must_use]
    pub fn new(router: Arc<Router>, config: RuntimeConfig) -> Self {
        Self { router, config }
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Handle one request.
    ///
    /// Routing, decoding, binding and handler failures all produce a
    /// [`Response`].
    ///
    /// # Errors
    ///
    /// [`InvalidStatusCode`] when the handler returned a status outside the
    /// legality table. No response is produced for the request.
    pub fn dispatch<R: Read>(
        &self,
        req: IncomingRequest<'_, R>,
    ) -> Result<Response, InvalidStatusCode> {
        let request_id = RequestId::from_header_or_new(
            req.headers.get("x-request-id").map(String::as_str),
        );
        let (path, query) = req.target.split_once('?').unwrap_or((req.target, ""));

        let route = match req.method.parse::<Method>() {
            Ok(method) => self.router.route(&method, path),
            Err(_) => {
                warn!(
                    request_id = %request_id,
                    method = %req.method,
                    "Unparseable request method"
                );
                None
            }
        };

        let (handler, outcome) = match route {
            Some(route) => {
                let handler = route.handler.clone();
                let outcome = self.run(route, req, query, request_id);
                (handler, outcome)
            }
            None => {
                let handler = HandlerDescriptor::not_found();
                let outcome = handler.invoke(&Args::new()).map_err(RequestError::Handler);
                (handler, outcome)
            }
        };

        let response = match outcome {
            Ok(reply) => response::encode(reply, handler.name()).inspect_err(|e| {
                error!(
                    request_id = %request_id,
                    handler_name = %handler.name(),
                    status = e.status,
                    "Handler returned an invalid status code"
                );
            })?,
            Err(err) => self.error_response(&err, &handler, request_id),
        };

        info!(
            request_id = %request_id,
            handler_name = %handler.name(),
            status = response.status,
            "Request completed"
        );
        Ok(response)
    }

    fn run<R: Read>(
        &self,
        route: RouteMatch,
        req: IncomingRequest<'_, R>,
        query: &str,
        request_id: RequestId,
    ) -> Result<Reply, RequestError> {
        let mut data = body::decode(req.headers, req.body, query, self.config.max_body_bytes)?;
        data.path = route.path_params;

        let handler = &route.handler;
        let args = params::bind(
            handler.parameters(),
            &data.path,
            &data.flat_map(),
            data.document.as_ref(),
        )?;
        debug!(
            request_id = %request_id,
            handler_name = %handler.name(),
            args = ?args,
            "Parameters bound"
        );

        self.invoke(handler, &args, request_id)
    }

    fn invoke(
        &self,
        handler: &HandlerDescriptor,
        args: &Args,
        request_id: RequestId,
    ) -> Result<Reply, RequestError> {
        info!(
            request_id = %request_id,
            handler_name = %handler.name(),
            "Handler execution start"
        );
        let start = Instant::now();

        match panic::catch_unwind(AssertUnwindSafe(|| handler.invoke(args))) {
            Ok(Ok(reply)) => {
                info!(
                    request_id = %request_id,
                    handler_name = %handler.name(),
                    status = ?reply.status,
                    duration_us = start.elapsed().as_micros(),
                    "Handler execution complete"
                );
                Ok(reply)
            }
            Ok(Err(e)) => Err(RequestError::Handler(e)),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(
                    request_id = %request_id,
                    handler_name = %handler.name(),
                    panic_message = %message,
                    "Handler panicked"
                );
                Err(RequestError::Panic(message))
            }
        }
    }

    fn error_response(
        &self,
        err: &RequestError,
        handler: &HandlerDescriptor,
        request_id: RequestId,
    ) -> Response {
        let message = match err {
            RequestError::Decode(_) => {
                warn!(request_id = %request_id, handler_name = %handler.name(), error = %err, "Request body rejected");
                err.to_string()
            }
            RequestError::Bind(_) => {
                warn!(request_id = %request_id, handler_name = %handler.name(), error = %err, "Parameter binding failed");
                err.to_string()
            }
            RequestError::Handler(_) | RequestError::Panic(_) => {
                error!(request_id = %request_id, handler_name = %handler.name(), error = %err, "Handler failed");
                if self.config.expose_handler_errors {
                    err.to_string()
                } else {
                    format!("internal error (request {request_id})")
                }
            }
        };
        Response::error_msg(500, message)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
