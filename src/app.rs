use crate::dispatcher::Dispatcher;
use crate::handler::HandlerDescriptor;
use crate::router::{RouteError, Router};
use crate::runtime_config::RuntimeConfig;
use crate::server::{listen, AppService, ServerHandle};
use http::Method;
use std::io;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use tracing::info;

/// Registration surface: collect routes, then serve them.
///
/// ```rust,no_run
/// use http::Method;
/// use tinyroute::{endpoint, App};
///
/// #[endpoint]
/// fn poshel() -> (&'static str, u16) {
///     ("away with your football", 400)
/// }
///
/// let mut app = App::from_env();
/// app.register("/poshel", [Method::GET], poshel_handler())?;
/// let server = app.serve("127.0.0.1:8080")?;
/// server.join().ok();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Default)]
pub struct App {
    router: Router,
    config: RuntimeConfig,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// App configured from `TINYROUTE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_config(RuntimeConfig::from_env())
    }

    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            router: Router::new(),
            config,
        }
    }

    /// Add a route. Routes are matched in the order they are registered.
    ///
    /// # Errors
    ///
    /// [`RouteError`] for an invalid template or an empty method set.
    pub fn register(
        &mut self,
        template: &str,
        methods: impl IntoIterator<Item = Method>,
        handler: HandlerDescriptor,
    ) -> Result<&mut Self, RouteError> {
        self.router.register(template, methods, handler)?;
        Ok(self)
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Freeze the route table into a shareable dispatcher.
    #[must_use]
    pub fn into_dispatcher(self) -> Dispatcher {
        let routes_summary = self.router.describe();
        info!(
            routes_count = self.router.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );
        Dispatcher::new(Arc::new(self.router), self.config)
    }

    /// Start serving on `addr` with `may_minihttp`.
    ///
    /// Applies the configured coroutine stack size before the server starts.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub fn serve<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        may::config().set_stack_size(self.config.stack_size);
        let dispatcher = self.into_dispatcher();
        let handle = listen(AppService::new(dispatcher), addr)?;
        info!(addr = %handle.addr(), "Server listening");
        Ok(handle)
    }
}
