use super::request::{parse_head, RequestHead};
use super::response::write_json_response;
use crate::dispatcher::{Dispatcher, IncomingRequest};
use may_minihttp::{HttpService, Request, Response};
use std::io;
use tracing::error;

/// `may_minihttp` service running every request through a [`Dispatcher`].
///
/// Cloned once per connection; clones share the route table.
#[derive(Clone)]
pub struct AppService {
    pub dispatcher: Dispatcher,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let RequestHead {
            method,
            target,
            headers,
        } = parse_head(&req);

        let outcome = self.dispatcher.dispatch(IncomingRequest {
            method: &method,
            target: &target,
            headers: &headers,
            body: req.body(),
        });

        match outcome {
            Ok(response) => {
                write_json_response(res, &response);
                Ok(())
            }
            Err(invalid) => {
                // Nothing is written here; may_minihttp owns the failed exchange.
                error!(
                    method = %method,
                    target = %target,
                    error = %invalid,
                    "Aborting request after invalid status code"
                );
                Err(io::Error::other(invalid))
            }
        }
    }
}
