//! Initial state construction.

use crate::field::{Field, RawValue};

/// Frozen, ordered mapping of field names to fields.
///
/// The key order here becomes the model's permanent key order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitialState {
    fields: Vec<(String, Field)>,
}

impl InitialState {
    /// Wrap already-built fields. Duplicate names are rejected later by the model.
    pub fn from_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Field)>,
        K: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, f)| (k.into(), f)).collect(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, f)| f)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn into_fields(self) -> Vec<(String, Field)> {
        self.fields
    }
}

/// Accumulates raw name/value pairs for a model.
///
/// # Example
///
/// ```ignore
/// let initial = InitialStateBuilder::new()
///     .with("query", "")
///     .with("regions", vec!["north_1", "south"])
///     .build();
/// let model = Model::new(initial)?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct InitialStateBuilder {
    entries: Vec<(String, RawValue)>,
}

impl InitialStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw value. Overwriting keeps the original position and logs a warning.
    pub fn set(&mut self, name: impl Into<String>, raw: impl Into<RawValue>) -> &mut Self {
        let name = name.into();
        let raw = raw.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => {
                tracing::warn!(field = %name, "overwriting initial value");
                entry.1 = raw;
            }
            None => self.entries.push((name, raw)),
        }
        self
    }

    /// Chaining form of [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, raw: impl Into<RawValue>) -> Self {
        self.set(name, raw);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn build(&self) -> InitialState {
        InitialState {
            fields: self
                .entries
                .iter()
                .map(|(k, raw)| (k.clone(), Field::create(raw.clone())))
                .collect(),
        }
    }
}
