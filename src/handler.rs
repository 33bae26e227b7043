use crate::params::{Args, FromArgs, ParameterDescriptor};
use crate::response::{IntoReply, Reply};
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

type Callable = dyn Fn(&Args) -> anyhow::Result<Reply> + Send + Sync;

/// A handler plus its parameter list, built once at registration time.
///
/// Most handlers are declared with `#[endpoint]`, which generates the
/// descriptor from the function signature. Hand-written descriptors chain
/// [`param`](Self::param) calls:
///
/// ```rust
/// use tinyroute::{HandlerDescriptor, ParameterDescriptor};
///
/// let greet = HandlerDescriptor::new("greet", |args| {
///     let name: String = args.get("name")?;
///     Ok(format!("hello {name}"))
/// })
/// .param(ParameterDescriptor::required::<String>("name"));
/// assert_eq!(greet.parameters().len(), 1);
/// ```
#[derive(Clone)]
pub struct HandlerDescriptor {
    name: Arc<str>,
    callable: Arc<Callable>,
    parameters: Vec<ParameterDescriptor>,
}

static NOT_FOUND: Lazy<HandlerDescriptor> = Lazy::new(|| {
    HandlerDescriptor::new("not_found", |_args: &Args| {
        Ok(Reply::error("No such endpoint").with_status(404))
    })
});

impl HandlerDescriptor {
    pub fn new<F, R>(name: &str, f: F) -> Self
    where
        F: Fn(&Args) -> anyhow::Result<R> + Send + Sync + 'static,
        R: IntoReply,
    {
        let callable = move |args: &Args| -> anyhow::Result<Reply> { Ok(f(args)?.into_reply()?) };
        Self {
            name: Arc::from(name),
            callable: Arc::new(callable),
            parameters: Vec::new(),
        }
    }

    /// Handler taking one [`FromArgs`] value; the parameter list comes from `A`.
    pub fn typed<A, R, F>(name: &str, f: F) -> Self
    where
        A: FromArgs,
        R: IntoReply,
        F: Fn(A) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        Self::new(name, move |args: &Args| f(A::from_args(args)?)).params(A::parameters())
    }

    /// The handler used when no route matches: no parameters, replies
    /// `{"error_msg": "No such endpoint"}` with 404.
    #[must_use]
    pub fn not_found() -> Self {
        NOT_FOUND.clone()
    }

    #[must_use]
    pub fn param(mut self, param: ParameterDescriptor) -> Self {
        self.parameters.push(param);
        self
    }

    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = ParameterDescriptor>) -> Self {
        self.parameters.extend(params);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Call the handler with bound arguments.
    ///
    /// # Errors
    ///
    /// Whatever the handler returns, or a serialization failure of its value.
    pub fn invoke(&self, args: &Args) -> anyhow::Result<Reply> {
        (self.callable)(args)
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field(
                "parameters",
                &self.parameters.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Body;
    use serde_json::json;

    struct Paging {
        page: i64,
        per_page: i64,
    }

    impl FromArgs for Paging {
        fn parameters() -> Vec<ParameterDescriptor> {
            vec![
                ParameterDescriptor::with_default::<i64>("page", 1),
                ParameterDescriptor::with_default::<i64>("per_page", 20),
            ]
        }

        fn from_args(args: &Args) -> anyhow::Result<Self> {
            Ok(Self {
                page: args.get("page")?,
                per_page: args.get("per_page")?,
            })
        }
    }

    #[test]
    fn not_found_replies_404() {
        let handler = HandlerDescriptor::not_found();
        assert!(handler.parameters().is_empty());
        let reply = handler.invoke(&Args::new()).unwrap();
        assert_eq!(reply.status, Some(404));
        assert_eq!(reply.body, Body::Error("No such endpoint".into()));
    }

    #[test]
    fn typed_handler_takes_parameters_from_args_type() {
        let handler = HandlerDescriptor::typed("list", |p: Paging| Ok(p.page * p.per_page));
        let names: Vec<&str> = handler.parameters().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["page", "per_page"]);

        let mut args = Args::new();
        args.insert("page", json!(3));
        args.insert("per_page", json!(10));
        assert_eq!(handler.invoke(&args).unwrap().body, Body::Json(json!(30)));
    }

    #[test]
    fn handler_errors_pass_through() {
        let handler = HandlerDescriptor::new("boom", |_args: &Args| -> anyhow::Result<()> {
            anyhow::bail!("kaput")
        });
        let err = handler.invoke(&Args::new()).unwrap_err();
        assert_eq!(err.to_string(), "kaput");
    }
}
