//! Route table: `/literal/:name` templates compiled to anchored regexes,
//! matched in registration order.

use crate::handler::HandlerDescriptor;
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Maximum number of path captures before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Path captures in template order.
///
/// Names are shared with the route table; values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("path template {0:?} must start with '/'")]
    MissingLeadingSlash(String),
    #[error("capture name {name:?} in {template:?} is not an identifier")]
    InvalidCaptureName { template: String, name: String },
    #[error("capture {name:?} appears more than once in {template:?}")]
    DuplicateCapture { template: String, name: String },
    #[error("route {0:?} has no HTTP methods")]
    EmptyMethodSet(String),
    #[error("failed to compile path template {template:?}")]
    Pattern {
        template: String,
        #[source]
        source: regex::Error,
    },
}

/// Result of successfully matching a request to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub handler: HandlerDescriptor,
    /// The template the route was registered with
    pub template: Arc<str>,
    /// Captured path segments, e.g. `:uid` -> `("uid", "42")`
    pub path_params: ParamVec,
}

impl RouteMatch {
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
struct Route {
    template: Arc<str>,
    regex: Regex,
    param_names: Vec<Arc<str>>,
    methods: Vec<Method>,
    handler: HandlerDescriptor,
}

/// Ordered route table.
///
/// Built before serving, then shared read-only behind an `Arc`. The first
/// route whose pattern matches the path and whose method set contains the
/// request method wins; a method mismatch is not a distinct outcome.
#[derive(Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `template` and append the route.
    ///
    /// # Errors
    ///
    /// [`RouteError`] for a template without a leading `/`, a capture name
    /// that is not an identifier, a repeated capture name, or no methods.
    pub fn register(
        &mut self,
        template: &str,
        methods: impl IntoIterator<Item = Method>,
        handler: HandlerDescriptor,
    ) -> Result<(), RouteError> {
        let mut method_set: Vec<Method> = Vec::new();
        for method in methods {
            if !method_set.contains(&method) {
                method_set.push(method);
            }
        }
        if method_set.is_empty() {
            return Err(RouteError::EmptyMethodSet(template.to_string()));
        }

        let (regex, param_names) = Self::path_to_regex(template)?;
        debug!(
            template = %template,
            methods = ?method_set,
            handler_name = %handler.name(),
            params = handler.parameters().len(),
            "Route registered"
        );
        self.routes.push(Route {
            template: Arc::from(template),
            regex,
            param_names,
            methods: method_set,
            handler,
        });
        Ok(())
    }

    /// Resolve a request path. `None` means no route matched.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        debug!(method = %method, path = %path, "Route match attempt");

        for route in &self.routes {
            let Some(caps) = route.regex.captures(path) else {
                continue;
            };
            if !route.methods.contains(method) {
                continue;
            }

            let path_params: ParamVec = route
                .param_names
                .iter()
                .zip(caps.iter().skip(1))
                .filter_map(|(name, m)| m.map(|m| (Arc::clone(name), m.as_str().to_string())))
                .collect();

            info!(
                method = %method,
                path = %path,
                handler_name = %route.handler.name(),
                route_pattern = %route.template,
                path_params = ?path_params,
                "Route matched"
            );
            return Some(RouteMatch {
                handler: route.handler.clone(),
                template: Arc::clone(&route.template),
                path_params,
            });
        }

        warn!(method = %method, path = %path, "No route matched");
        None
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// One `METHODS template -> handler(params)` line per route, in match order.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|r| {
                let methods: Vec<&str> = r.methods.iter().map(Method::as_str).collect();
                let params: Vec<String> = r
                    .handler
                    .parameters()
                    .iter()
                    .map(|p| {
                        let optional = if p.is_required() { "" } else { "?" };
                        format!("{}{optional}: {}", p.name(), p.declared_type())
                    })
                    .collect();
                format!(
                    "{} {} -> {}({})",
                    methods.join(","),
                    r.template,
                    r.handler.name(),
                    params.join(", ")
                )
            })
            .collect()
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.routes.len());
        for line in self.describe() {
            println!("[route] {line}");
        }
    }

    /// Compile a template into an anchored regex plus its capture names.
    ///
    /// `/:title/:uid/params` becomes `^/([^/]+)/([^/]+)/params$` with names
    /// `["title", "uid"]`. Literal segments are escaped and trailing slashes
    /// are significant.
    pub(crate) fn path_to_regex(template: &str) -> Result<(Regex, Vec<Arc<str>>), RouteError> {
        if !template.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash(template.to_string()));
        }

        let mut pattern = String::with_capacity(template.len() + 16);
        pattern.push('^');
        let mut param_names: Vec<Arc<str>> = Vec::new();

        for (i, segment) in template.split('/').enumerate() {
            if i > 0 {
                pattern.push('/');
            }
            if let Some(name) = segment.strip_prefix(':') {
                if !is_identifier(name) {
                    return Err(RouteError::InvalidCaptureName {
                        template: template.to_string(),
                        name: name.to_string(),
                    });
                }
                if param_names.iter().any(|n| n.as_ref() == name) {
                    return Err(RouteError::DuplicateCapture {
                        template: template.to_string(),
                        name: name.to_string(),
                    });
                }
                pattern.push_str("([^/]+)");
                param_names.push(Arc::from(name));
            } else {
                pattern.push_str(&regex::escape(segment));
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|source| RouteError::Pattern {
            template: template.to_string(),
            source,
        })?;
        Ok((regex, param_names))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
