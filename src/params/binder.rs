use super::args::Args;
use super::descriptor::ParameterDescriptor;
use super::types::{ParamKind, TypeTag};
use crate::body::{FieldMap, FieldValue};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("Argument '{0}' is required")]
    MissingArgument(String),
    #[error("Argument '{name}' must be {expected}: {detail}")]
    TypeConversion {
        name: String,
        expected: TypeTag,
        detail: String,
    },
}

impl BindError {
    fn conversion(desc: &ParameterDescriptor, detail: impl Into<String>) -> Self {
        BindError::TypeConversion {
            name: desc.name().to_string(),
            expected: desc.declared_type().clone(),
            detail: detail.into(),
        }
    }
}

/// Bind request data to a handler's declared parameters.
///
/// Primitive parameters are looked up in `captures` first, then in `flat`
/// (form fields already layered over query fields). Every structured
/// parameter is built from the same top-level `document`.
///
/// # Errors
///
/// [`BindError::MissingArgument`] for an absent required parameter,
/// [`BindError::TypeConversion`] when a value does not fit its declared type.
pub fn bind(
    descriptors: &[ParameterDescriptor],
    captures: &[(Arc<str>, String)],
    flat: &FieldMap,
    document: Option<&Value>,
) -> Result<Args, BindError> {
    let mut args = Args::new();
    for desc in descriptors {
        let bound = match desc.kind() {
            ParamKind::Primitive => {
                let capture = captures
                    .iter()
                    .rfind(|(k, _)| k.as_ref() == desc.name())
                    .map(|(_, v)| v.as_str());
                match (capture, flat.get(desc.name())) {
                    (Some(raw), _) => Some(bind_text(desc, raw)?),
                    (None, Some(field)) => Some(bind_field(desc, field)?),
                    (None, None) => None,
                }
            }
            ParamKind::Structured => document.map(|doc| bind_document(desc, doc)).transpose()?,
        };
        let value = match bound {
            Some(value) => value,
            None => desc
                .default()
                .cloned()
                .ok_or_else(|| BindError::MissingArgument(desc.name().to_string()))?,
        };
        args.insert(desc.shared_name(), value);
    }
    Ok(args)
}

fn bind_text(desc: &ParameterDescriptor, raw: &str) -> Result<Value, BindError> {
    let value = desc
        .declared_type()
        .parse_raw(raw)
        .map_err(|e| BindError::conversion(desc, e))?;
    desc.conform(value)
        .map_err(|e| BindError::conversion(desc, e.to_string()))
}

fn bind_field(desc: &ParameterDescriptor, field: &FieldValue) -> Result<Value, BindError> {
    match field {
        FieldValue::Text(raw) => bind_text(desc, raw),
        FieldValue::Binary(bytes) if *desc.declared_type() == TypeTag::Bytes => {
            Ok(Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()))
        }
        FieldValue::Binary(_) => Err(BindError::conversion(
            desc,
            "received binary data that is not valid UTF-8",
        )),
        FieldValue::Many(values) => Err(BindError::conversion(
            desc,
            format!("received {} values for a single field", values.len()),
        )),
    }
}

fn bind_document(desc: &ParameterDescriptor, doc: &Value) -> Result<Value, BindError> {
    let value = desc
        .declared_type()
        .bind_json(doc)
        .map_err(|e| BindError::conversion(desc, e))?;
    desc.conform(value)
        .map_err(|e| BindError::conversion(desc, e.to_string()))
}
