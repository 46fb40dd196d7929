//! Form export.
//!
//! A model is submitted as one hidden input per field. Values are rendered
//! with [`FieldValue`]'s `Display`: scalars verbatim, code sets joined with
//! `","`. Building actual document nodes is left to a [`FormSink`].

use crate::error::Result;
use crate::field::Field;
use serde::{Deserialize, Serialize};

/// One `(name, value)` pair of an exported form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenInput {
    pub name: String,
    pub value: String,
}

/// Receives hidden inputs in key order.
pub trait FormSink {
    fn hidden_input(&mut self, name: &str, value: &str);
}

/// Exported form contents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormExport {
    pub inputs: Vec<HiddenInput>,
}

impl FormExport {
    pub(crate) fn from_fields<'a>(fields: impl Iterator<Item = (&'a str, &'a Field)>) -> Self {
        Self {
            inputs: fields
                .map(|(name, field)| HiddenInput {
                    name: name.to_string(),
                    value: field.value().to_string(),
                })
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inputs
            .iter()
            .find(|input| input.name == name)
            .map(|input| input.value.as_str())
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.inputs
            .iter()
            .map(|input| (input.name.clone(), input.value.clone()))
            .collect()
    }

    pub fn write_to<S: FormSink + ?Sized>(&self, sink: &mut S) {
        for input in &self.inputs {
            sink.hidden_input(&input.name, &input.value);
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Renders hidden inputs as HTML markup, one element per line.
#[derive(Clone, Debug, Default)]
pub struct HtmlFormSink {
    html: String,
}

impl HtmlFormSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }
}

impl FormSink for HtmlFormSink {
    fn hidden_input(&mut self, name: &str, value: &str) {
        self.html.push_str("<input type=\"hidden\" name=\"");
        escape_attr(name, &mut self.html);
        self.html.push_str("\" value=\"");
        escape_attr(value, &mut self.html);
        self.html.push_str("\">\n");
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
