use super::args::Args;
use super::types::{Param, ParamKind, TypeTag};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// One declared handler parameter, built at registration time.
///
/// A parameter is required exactly when it has no default.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    name: Arc<str>,
    declared_type: TypeTag,
    default: Option<Value>,
    conform: fn(Value) -> Result<Value, serde_json::Error>,
}

/// Round-trip a bound value through `T` so width, shape and schema-object
/// fields are checked before the handler runs.
///
/// A float that overflows `T` comes back from serialization as `null`; that
/// is a conversion failure, not a missing value.
fn conform<T: Param>(value: Value) -> Result<Value, serde_json::Error> {
    let typed: T = serde_json::from_value(value.clone())?;
    let conformed = serde_json::to_value(typed)?;
    if lost_number(&value, &conformed) {
        return Err(<serde_json::Error as serde::de::Error>::custom(
            "number is out of range for the declared type",
        ));
    }
    Ok(conformed)
}

/// True when a number in `input` sits where `output` holds `null`.
///
/// Keys absent from `input` are skipped so optional fields that serialize as
/// `null` are not flagged.
fn lost_number(input: &Value, output: &Value) -> bool {
    match (input, output) {
        (Value::Number(_), Value::Null) => true,
        (Value::Array(ins), Value::Array(outs)) => {
            ins.iter().zip(outs).any(|(i, o)| lost_number(i, o))
        }
        (Value::Object(ins), Value::Object(outs)) => ins
            .iter()
            .any(|(k, i)| outs.get(k).is_some_and(|o| lost_number(i, o))),
        _ => false,
    }
}

impl ParameterDescriptor {
    #[must_use]
    pub fn required<T: Param>(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            declared_type: T::type_tag(),
            default: None,
            conform: conform::<T>,
        }
    }

    #[must_use]
    pub fn with_default<T: Param>(name: &str, default: T) -> Self {
        match serde_json::to_value(default) {
            Ok(value) => Self {
                default: Some(value),
                ..Self::required::<T>(name)
            },
            Err(e) => {
                warn!(
                    param = %name,
                    error = %e,
                    "Default value has no JSON form; parameter is required"
                );
                Self::required::<T>(name)
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    #[must_use]
    pub fn declared_type(&self) -> &TypeTag {
        &self.declared_type
    }

    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    #[must_use]
    pub fn kind(&self) -> ParamKind {
        self.declared_type.kind()
    }

    pub(crate) fn conform(&self, value: Value) -> Result<Value, serde_json::Error> {
        (self.conform)(value)
    }
}

/// A type that declares a whole handler parameter list.
///
/// Used with [`HandlerDescriptor::typed`](crate::HandlerDescriptor::typed)
/// for handlers that take a single argument struct.
pub trait FromArgs: Sized {
    fn parameters() -> Vec<ParameterDescriptor>;

    fn from_args(args: &Args) -> anyhow::Result<Self>;
}

impl FromArgs for () {
    fn parameters() -> Vec<ParameterDescriptor> {
        Vec::new()
    }

    fn from_args(_args: &Args) -> anyhow::Result<Self> {
        Ok(())
    }
}
