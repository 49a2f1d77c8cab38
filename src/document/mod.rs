//! Recorded API documentation
//!
//! A [`Document`] collects one [`Entry`] per recorded exchange, in arrival
//! order, and renders them through a template once the tests are done.

mod render;

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::multimap::OrderedMultimap;
use crate::validate::TestCase;
use crate::Result;

pub use render::{generation_enabled, DEFAULT_TEMPLATE, ENV_HTTPDOC};

/// A named, described value destined for the document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Data {
    /// Header, parameter or field name
    pub name: String,
    /// Value observed, or expected by an assertion
    pub value: Value,
    /// Description supplied through a validator, empty for raw values
    pub description: String,
}

impl Data {
    /// Create a data record
    pub fn new(
        name: impl Into<String>,
        value: impl Into<Value>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: description.into(),
        }
    }

    /// Data declared by an assertion
    pub(crate) fn declared(case: &TestCase) -> Self {
        Self::new(case.target.clone(), case.expected.clone(), case.description.clone())
    }

    /// Undescribed data for each name in `values`, taking the first value
    pub(crate) fn raw(values: &OrderedMultimap) -> Vec<Self> {
        values
            .iter()
            .filter_map(|(name, all)| all.first().map(|first| Self::new(name, first.as_str(), "")))
            .collect()
    }
}

/// One documented exchange
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entry {
    /// Endpoint description
    pub description: String,
    /// HTTP method
    pub method: String,
    /// Request path
    pub path: String,

    /// Query parameters, sorted by name
    pub request_params: Vec<Data>,
    /// Request headers, sorted by name
    pub request_headers: Vec<Data>,
    /// Request body fields in assertion order
    pub request_fields: Vec<Data>,
    /// Request body example. Binary bodies are shown as indented JSON.
    pub request_example: String,

    /// Response status code
    pub response_status_code: u16,
    /// Response headers
    pub response_headers: Vec<Data>,
    /// Response body fields in assertion order
    pub response_fields: Vec<Data>,
    /// Response body example. Binary bodies are shown as indented JSON.
    pub response_example: String,
}

impl Entry {
    /// Sort request headers and params by name so output is stable across runs
    pub fn format(&mut self) {
        self.request_headers.sort_by(|a, b| a.name.cmp(&b.name));
        self.request_params.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

/// Merge two data lists without duplicate names.
///
/// The first occurrence of a name wins, declared entries before raw ones, so
/// a name asserted twice keeps its first description and undeclared names
/// from `raw` are appended in order.
#[must_use]
pub fn merge_data(declared: Vec<Data>, raw: Vec<Data>) -> Vec<Data> {
    let mut merged: Vec<Data> = Vec::with_capacity(declared.len() + raw.len());
    for data in declared.into_iter().chain(raw) {
        if !merged.iter().any(|d| d.name == data.name) {
            merged.push(data);
        }
    }
    merged
}

/// Drop every entry whose name is in `excludes`. Matching is case-sensitive.
#[must_use]
pub fn exclude_data(target: Vec<Data>, excludes: &[&str]) -> Vec<Data> {
    target
        .into_iter()
        .filter(|d| !excludes.contains(&d.name.as_str()))
        .collect()
}

/// Recorded results for one API.
///
/// Shared between the recording middleware instances of a test file, usually
/// behind an `Arc`. Appending is the only mutation and is serialized.
#[derive(Debug, Default)]
pub struct Document {
    name: String,
    exclude_headers: Vec<String>,
    template: Option<String>,
    entries: Mutex<Vec<Entry>>,
}

impl Document {
    /// Create an empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a document from configuration, reading the custom template
    /// file if one is configured
    ///
    /// # Errors
    ///
    /// Returns error if the template file cannot be read
    pub fn from_config(config: &Config) -> Result<Self> {
        let template = config
            .template
            .as_ref()
            .map(std::fs::read_to_string)
            .transpose()?;

        Ok(Self {
            name: config.name.clone(),
            exclude_headers: config.exclude_headers.clone(),
            template,
            entries: Mutex::default(),
        })
    }

    /// Exclude headers from every entry of this document
    #[must_use]
    pub fn exclude_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_headers.extend(headers.into_iter().map(Into::into));
        self
    }

    /// Render with `template` instead of the built-in Markdown template
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Document name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Headers excluded from every entry
    #[must_use]
    pub fn excluded_headers(&self) -> &[String] {
        &self.exclude_headers
    }

    /// Append a finished entry
    pub fn append(&self, entry: Entry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Snapshot of the entries recorded so far, in arrival order
    #[must_use]
    pub fn entries(&self) -> Vec<Entry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of entries recorded so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn template_source(&self) -> &str {
        self.template.as_deref().unwrap_or(DEFAULT_TEMPLATE)
    }

    /// Resolve `path` against the current directory
    fn output_path(path: &std::path::Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(std::env::current_dir()?.join(path))
        }
    }
}
