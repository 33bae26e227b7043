//! Handler parameters: declared types, descriptors and the binder that turns
//! raw request data into call arguments.

pub mod args;
pub mod binder;
pub mod descriptor;
pub mod types;

pub use args::Args;
pub use binder::{bind, BindError};
pub use descriptor::{FromArgs, ParameterDescriptor};
pub use types::{Bytes, Param, ParamKind, TypeTag};
