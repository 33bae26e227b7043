use anyhow::{anyhow, Context};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Bound arguments for one handler call, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: Vec<(Arc<str>, Value)>,
}

impl Args {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<Arc<str>>, value: Value) {
        let name = name.into();
        match self.values.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((name, value)),
        }
    }

    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v)
    }

    /// Deserialize the named argument into `T`.
    ///
    /// # Errors
    ///
    /// Fails when the argument was not bound or does not fit `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let value = self
            .get_value(name)
            .ok_or_else(|| anyhow!("argument '{name}' was not bound"))?;
        T::deserialize(value).with_context(|| format!("argument '{name}' has an unexpected shape"))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_ref(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
