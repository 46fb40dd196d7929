//! Hierarchical code parsing.
//!
//! A code-set entry is either a bare parent code (`"region"`) or a qualified
//! code made of a parent and a child joined by the delimiter
//! (`"region_north"`). Only the first delimiter is significant.

use crate::error::{Result, StateError};
use std::fmt;

/// Default separator between a parent code and its child.
pub const DEFAULT_DELIMITER: &str = "_";

/// Non-empty separator used to split qualified codes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Delimiter(String);

impl Delimiter {
    /// Create a delimiter. An empty separator would match everywhere and is rejected.
    pub fn new(sep: impl Into<String>) -> Result<Self> {
        let sep = sep.into();
        if sep.is_empty() {
            return Err(StateError::InvalidInitialState(
                "delimiter must not be empty".to_string(),
            ));
        }
        Ok(Delimiter(sep))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Delimiter(DEFAULT_DELIMITER.to_string())
    }
}

impl fmt::Debug for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Delimiter({:?})", self.0)
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A code split into its parent and optional child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Code<'a> {
    raw: &'a str,
    parent: &'a str,
    child: Option<&'a str>,
}

impl<'a> Code<'a> {
    /// Split `raw` on the first occurrence of the delimiter.
    ///
    /// A trailing delimiter leaves the child empty, which counts as bare:
    /// `"a_"` parses to parent `"a"` with no child.
    pub fn parse(raw: &'a str, delimiter: &Delimiter) -> Self {
        match raw.split_once(delimiter.as_str()) {
            Some((parent, child)) if !child.is_empty() => Code {
                raw,
                parent,
                child: Some(child),
            },
            Some((parent, _)) => Code {
                raw,
                parent,
                child: None,
            },
            None => Code {
                raw,
                parent: raw,
                child: None,
            },
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn parent(&self) -> &'a str {
        self.parent
    }

    pub fn child(&self) -> Option<&'a str> {
        self.child
    }

    /// True if the code names a child of its parent.
    pub fn is_qualified(&self) -> bool {
        self.child.is_some()
    }

    /// Prefix shared by every qualified code under this code's parent.
    pub fn child_prefix(&self, delimiter: &Delimiter) -> String {
        format!("{}{}", self.parent, delimiter.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_code() {
        let delim = Delimiter::default();
        let code = Code::parse("region", &delim);
        assert_eq!(code.parent(), "region");
        assert_eq!(code.child(), None);
        assert!(!code.is_qualified());
    }

    #[test]
    fn test_qualified_code_splits_once() {
        let delim = Delimiter::default();
        let code = Code::parse("region_north_east", &delim);
        assert_eq!(code.parent(), "region");
        assert_eq!(code.child(), Some("north_east"));
        assert!(code.is_qualified());
        assert_eq!(code.child_prefix(&delim), "region_");
    }

    #[test]
    fn test_trailing_delimiter_is_bare() {
        let delim = Delimiter::default();
        let code = Code::parse("a_", &delim);
        assert_eq!(code.parent(), "a");
        assert!(!code.is_qualified());
        assert_eq!(code.raw(), "a_");
    }

    #[test]
    fn test_multi_char_delimiter() {
        let delim = Delimiter::new("::").unwrap();
        let code = Code::parse("pkg::mod", &delim);
        assert_eq!(code.parent(), "pkg");
        assert_eq!(code.child(), Some("mod"));
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        assert!(Delimiter::new("").is_err());
    }
}
