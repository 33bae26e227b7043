use serde::de::{self, DeserializeOwned, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

/// Declared type of a handler parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Str,
    Int,
    Float,
    Bool,
    Bytes,
    List(Box<TypeTag>),
    Map(Box<TypeTag>, Box<TypeTag>),
    /// A schema object, constructed from the fields of a JSON object
    Object(&'static str),
}

/// Where a parameter's value comes from.
///
/// Primitive parameters are looked up by name among path captures, form
/// fields and query fields. Structured parameters are built from the JSON
/// request document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Primitive,
    Structured,
}

impl TypeTag {
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        match self {
            TypeTag::List(_) | TypeTag::Map(..) | TypeTag::Object(_) => ParamKind::Structured,
            _ => ParamKind::Primitive,
        }
    }

    /// Convert a raw text value using the type's canonical parse rule.
    pub fn parse_raw(&self, raw: &str) -> Result<Value, String> {
        match self {
            TypeTag::Str | TypeTag::Bytes => Ok(Value::String(raw.to_owned())),
            TypeTag::Int => {
                let raw = raw.trim();
                raw.parse::<i64>()
                    .map(Value::from)
                    .or_else(|_| raw.parse::<u64>().map(Value::from))
                    .map_err(|e| format!("'{raw}' is not an integer ({e})"))
            }
            TypeTag::Float => {
                let raw = raw.trim();
                let f = raw
                    .parse::<f64>()
                    .map_err(|e| format!("'{raw}' is not a number ({e})"))?;
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("'{raw}' is not a finite number"))
            }
            TypeTag::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                other => Err(format!("'{other}' is not a boolean")),
            },
            TypeTag::List(_) | TypeTag::Map(..) | TypeTag::Object(_) => {
                let doc: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
                self.bind_json(&doc)
            }
        }
    }

    /// Bind a JSON value to this type, recursing into lists and maps.
    ///
    /// Scalars given as JSON strings go through [`TypeTag::parse_raw`], so a
    /// `list<int>` accepts `["1", 2]`. Schema objects are passed through and
    /// constructed later by deserialization.
    pub fn bind_json(&self, value: &Value) -> Result<Value, String> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (TypeTag::Str, Value::String(_)) => Ok(value.clone()),
            (TypeTag::Str, Value::Number(n)) => Ok(Value::String(n.to_string())),
            (TypeTag::Str, Value::Bool(b)) => Ok(Value::String(b.to_string())),
            (TypeTag::Int | TypeTag::Float | TypeTag::Bool, Value::String(s)) => self.parse_raw(s),
            (TypeTag::Int, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            (TypeTag::Float, Value::Number(_)) | (TypeTag::Bool, Value::Bool(_)) => {
                Ok(value.clone())
            }
            (TypeTag::Bytes, Value::String(_) | Value::Array(_)) => Ok(value.clone()),
            (TypeTag::List(item), Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, v)| item.bind_json(v).map_err(|e| format!("[{i}]: {e}")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (TypeTag::Map(key, val), Value::Object(fields)) => {
                let mut bound = serde_json::Map::with_capacity(fields.len());
                for (k, v) in fields {
                    key.parse_raw(k).map_err(|e| format!("key {e}"))?;
                    let v = val.bind_json(v).map_err(|e| format!("['{k}']: {e}"))?;
                    bound.insert(k.clone(), v);
                }
                Ok(Value::Object(bound))
            }
            (TypeTag::Object(_), Value::Object(_)) => Ok(value.clone()),
            (expected, other) => Err(format!("expected {expected}, found {}", json_kind(other))),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Str => f.write_str("str"),
            TypeTag::Int => f.write_str("int"),
            TypeTag::Float => f.write_str("float"),
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::Bytes => f.write_str("bytes"),
            TypeTag::List(item) => write!(f, "list[{item}]"),
            TypeTag::Map(k, v) => write!(f, "map[{k}, {v}]"),
            TypeTag::Object(name) => f.write_str(name),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a JSON array",
        Value::Object(_) => "a JSON object",
    }
}

/// A type that can be declared as a handler parameter.
///
/// Implemented for strings, booleans, integers, floats, [`Bytes`], `Vec`,
/// `HashMap`/`BTreeMap` and `Option`. Schema objects opt in with
/// [`schema_object!`](crate::schema_object).
pub trait Param: Serialize + DeserializeOwned + 'static {
    fn type_tag() -> TypeTag;
}

macro_rules! impl_param {
    ($tag:ident => $($ty:ty),+) => {$(
        impl Param for $ty {
            fn type_tag() -> TypeTag {
                TypeTag::$tag
            }
        }
    )+};
}

impl_param!(Str => String);
impl_param!(Bool => bool);
impl_param!(Int => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_param!(Float => f32, f64);
impl_param!(Bytes => Bytes);

impl<T: Param> Param for Option<T> {
    fn type_tag() -> TypeTag {
        T::type_tag()
    }
}

impl<T: Param> Param for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::List(Box::new(T::type_tag()))
    }
}

impl<K: Param + Eq + Hash, V: Param> Param for HashMap<K, V> {
    fn type_tag() -> TypeTag {
        TypeTag::Map(Box::new(K::type_tag()), Box::new(V::type_tag()))
    }
}

impl<K: Param + Ord, V: Param> Param for BTreeMap<K, V> {
    fn type_tag() -> TypeTag {
        TypeTag::Map(Box::new(K::type_tag()), Box::new(V::type_tag()))
    }
}

/// Declare serde types as schema-object parameters.
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct Person { name: String, age: Option<i64> }
/// tinyroute::schema_object!(Person);
/// ```
#[macro_export]
macro_rules! schema_object {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Param for $ty {
            fn type_tag() -> $crate::TypeTag {
                $crate::TypeTag::Object(stringify!($ty))
            }
        }
    )+};
}

/// Raw bytes, typically an uploaded multipart file.
///
/// Binds from binary multipart parts, from text (its UTF-8 bytes) and from
/// JSON arrays of byte values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.0)
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BytesVisitor;

        impl<'de> Visitor<'de> for BytesVisitor {
            type Value = Bytes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("bytes, a string or an array of byte values")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Bytes, E> {
                Ok(Bytes(v.as_bytes().to_vec()))
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Bytes, E> {
                Ok(Bytes(v.to_vec()))
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Bytes, E> {
                Ok(Bytes(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Bytes, A::Error> {
                let mut out = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(b) = seq.next_element::<u8>()? {
                    out.push(b);
                }
                Ok(Bytes(out))
            }
        }

        deserializer.deserialize_any(BytesVisitor)
    }
}
