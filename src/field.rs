//! Field values: scalars and hierarchical code sets.
//!
//! A [`Field`] never changes in place. Every mutation helper returns a new
//! field that the owning model swaps in.

use crate::code::{Code, Delimiter};
use crate::error::{Result, StateError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when a code set is rendered as a single string.
///
/// Codes are not escaped, so a code containing `","` makes the joined string
/// ambiguous (`["a,b"]` and `["a", "b"]` both render as `a,b`). Hosts that need
/// to recover the list should read the snapshot instead of splitting the export.
pub const EXPORT_SEPARATOR: &str = ",";

/// Raw input for a field, before classification.
///
/// `None` list entries stand for missing values and are dropped on creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    List(Vec<Option<String>>),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(items: Vec<&str>) -> Self {
        RawValue::List(items.into_iter().map(|s| Some(s.to_string())).collect())
    }
}

impl From<Vec<String>> for RawValue {
    fn from(items: Vec<String>) -> Self {
        RawValue::List(items.into_iter().map(Some).collect())
    }
}

impl From<Vec<Option<&str>>> for RawValue {
    fn from(items: Vec<Option<&str>>) -> Self {
        RawValue::List(items.into_iter().map(|s| s.map(str::to_string)).collect())
    }
}

impl TryFrom<&serde_json::Value> for RawValue {
    type Error = StateError;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(RawValue::Text(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => Ok(Some(s.clone())),
                    serde_json::Value::Null => Ok(None),
                    other => Err(StateError::InvalidInitialState(format!(
                        "unsupported list entry: {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(RawValue::List),
            other => Err(StateError::InvalidInitialState(format!(
                "unsupported field value: {}",
                other
            ))),
        }
    }
}

/// Kind of a field, fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Scalar,
    CodeSet,
}

/// Ordered, duplicate-free list of non-empty codes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeSet(Vec<String>);

impl CodeSet {
    /// Build from raw entries, dropping missing and empty ones and keeping the
    /// first occurrence of any duplicate.
    fn from_entries(entries: impl IntoIterator<Item = Option<String>>) -> Self {
        let mut codes: Vec<String> = Vec::new();
        for code in entries.into_iter().flatten() {
            if !code.is_empty() && !codes.contains(&code) {
                codes.push(code);
            }
        }
        CodeSet(codes)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.iter().any(|c| c == code)
    }

    /// Insert a code, enforcing parent/child exclusivity.
    ///
    /// A qualified code evicts every bare entry for its parent (`"a"` and
    /// `"a_"` alike); a bare code evicts every qualified code under it. The new code always lands last.
    fn with_code(&self, raw: &str, delimiter: &Delimiter) -> CodeSet {
        if raw.is_empty() || self.contains(raw) {
            return self.clone();
        }

        let code = Code::parse(raw, delimiter);
        let mut codes: Vec<String> = if code.is_qualified() {
            self.0
                .iter()
                .filter(|existing| {
                    let existing = Code::parse(existing, delimiter);
                    existing.is_qualified() || existing.parent() != code.parent()
                })
                .cloned()
                .collect()
        } else {
            let prefix = code.child_prefix(delimiter);
            self.0
                .iter()
                .filter(|existing| !existing.starts_with(&prefix))
                .cloned()
                .collect()
        };
        codes.push(code.raw().to_string());
        CodeSet(codes)
    }

    fn without_code(&self, raw: &str) -> CodeSet {
        CodeSet(self.0.iter().filter(|c| c.as_str() != raw).cloned().collect())
    }
}

impl<'a> IntoIterator for &'a CodeSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One named unit of model state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    /// Single string with replace-on-append semantics.
    Scalar(String),
    /// Ordered unique codes with parent/child exclusivity.
    CodeSet(CodeSet),
}

impl Field {
    /// Classify a raw value. Lists become code sets, anything else a scalar.
    pub fn create(raw: impl Into<RawValue>) -> Self {
        match raw.into() {
            RawValue::Text(s) => Field::Scalar(s),
            RawValue::List(entries) => Field::CodeSet(CodeSet::from_entries(entries)),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Scalar(_) => FieldKind::Scalar,
            Field::CodeSet(_) => FieldKind::CodeSet,
        }
    }

    /// Owned copy of the current value. Mutating it never reaches the field.
    pub fn value(&self) -> FieldValue {
        match self {
            Field::Scalar(s) => FieldValue::Scalar(s.clone()),
            Field::CodeSet(codes) => FieldValue::CodeSet(codes.0.clone()),
        }
    }

    /// Borrowed view of the codes, `None` for scalars.
    pub fn codes(&self) -> Option<&[String]> {
        match self {
            Field::Scalar(_) => None,
            Field::CodeSet(codes) => Some(codes.as_slice()),
        }
    }

    /// Field after appending `code`. Scalars are replaced wholesale.
    pub fn with_code(&self, code: &str, delimiter: &Delimiter) -> Field {
        match self {
            Field::Scalar(_) => Field::Scalar(code.to_string()),
            Field::CodeSet(codes) => Field::CodeSet(codes.with_code(code, delimiter)),
        }
    }

    /// Field after removing `code`. A scalar has a single slot, so it is
    /// cleared whatever `code` is.
    pub fn without_code(&self, code: &str) -> Field {
        match self {
            Field::Scalar(_) => Field::Scalar(String::new()),
            Field::CodeSet(codes) => Field::CodeSet(codes.without_code(code)),
        }
    }

    /// Empty field of the same kind.
    pub fn cleared(&self) -> Field {
        match self {
            Field::Scalar(_) => Field::Scalar(String::new()),
            Field::CodeSet(_) => Field::CodeSet(CodeSet::default()),
        }
    }
}

/// Read-side copy of a field's value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Scalar(String),
    CodeSet(Vec<String>),
}

impl FieldValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::Scalar(s) => Some(s.as_str()),
            FieldValue::CodeSet(_) => None,
        }
    }

    pub fn as_codes(&self) -> Option<&[String]> {
        match self {
            FieldValue::Scalar(_) => None,
            FieldValue::CodeSet(codes) => Some(codes.as_slice()),
        }
    }
}

/// Export form: scalars as-is, code sets joined with [`EXPORT_SEPARATOR`].
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(s) => f.write_str(s),
            FieldValue::CodeSet(codes) => f.write_str(&codes.join(EXPORT_SEPARATOR)),
        }
    }
}
