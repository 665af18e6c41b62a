//! Pipeline layout - the ordered property specifiers chains are built from

use crate::core::resource::Scope;
use std::fmt;
use thiserror::Error;

/// Errors raised while editing a layout
///
/// Each failure is fatal to the single edit call and leaves the layout
/// untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Cannot insert step {step} after non-existent step {anchor}")]
    MissingAnchorAfter { step: String, anchor: String },

    #[error("Cannot insert step {step} before non-existent step {anchor}")]
    MissingAnchorBefore { step: String, anchor: String },

    #[error("The step {step} is already present in the layout")]
    Duplicate { step: String },
}

/// A scope-qualified property specifier, e.g. `resource.middleware`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    pub scope: Scope,
    pub property: String,
}

impl PropertySpec {
    /// Parse `"<scope>.<property>"`; a missing or unrecognized scope prefix
    /// defaults to the service scope.
    pub fn parse(spec: &str) -> Self {
        match spec.split_once('.') {
            Some((prefix, property)) => Self {
                scope: Scope::parse(prefix),
                property: property.to_string(),
            },
            None => Self {
                scope: Scope::Service,
                property: spec.to_string(),
            },
        }
    }
}

impl fmt::Display for PropertySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.scope.as_str(), self.property)
    }
}

/// Ordered list of property specifiers
///
/// The layout determines which configuration surfaces contribute steps to
/// every compiled pipeline, and in what order. It is edited once, during
/// single-threaded setup, before compilation; compiled pipelines never see
/// later edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineLayout {
    entries: Vec<PropertySpec>,
}

impl PipelineLayout {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a layout from specifier strings, ignoring duplicate entries
    pub fn from_specs<'a, I: IntoIterator<Item = &'a str>>(specs: I) -> Self {
        let mut layout = Self::new();
        for spec in specs {
            let _ = layout.append(spec);
        }
        layout
    }

    /// The default handler layout
    pub fn default_handler() -> Self {
        Self::from_specs([
            "service.middleware",
            "resource.middleware",
            "action.middleware",
            "action.handle",
        ])
    }

    /// The default transform layout
    pub fn default_transform() -> Self {
        Self::from_specs([
            "service.transform",
            "resource.transform",
            "action.transform",
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertySpec> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, spec: &str) -> bool {
        self.position(&PropertySpec::parse(spec)).is_some()
    }

    /// Append a specifier to the end of the layout
    pub fn append(&mut self, spec: &str) -> Result<(), LayoutError> {
        let entry = self.parse_new(spec)?;
        self.entries.push(entry);
        Ok(())
    }

    /// Prepend a specifier to the start of the layout
    pub fn prepend(&mut self, spec: &str) -> Result<(), LayoutError> {
        let entry = self.parse_new(spec)?;
        self.entries.insert(0, entry);
        Ok(())
    }

    /// Insert a specifier immediately after the anchor
    pub fn insert_after(&mut self, anchor: &str, spec: &str) -> Result<(), LayoutError> {
        let entry = self.parse_new(spec)?;
        match self.position(&PropertySpec::parse(anchor)) {
            Some(index) => {
                self.entries.insert(index + 1, entry);
                Ok(())
            }
            None => Err(LayoutError::MissingAnchorAfter {
                step: spec.to_string(),
                anchor: anchor.to_string(),
            }),
        }
    }

    /// Insert a specifier immediately before the anchor
    pub fn insert_before(&mut self, anchor: &str, spec: &str) -> Result<(), LayoutError> {
        let entry = self.parse_new(spec)?;
        match self.position(&PropertySpec::parse(anchor)) {
            Some(index) => {
                self.entries.insert(index, entry);
                Ok(())
            }
            None => Err(LayoutError::MissingAnchorBefore {
                step: spec.to_string(),
                anchor: anchor.to_string(),
            }),
        }
    }

    fn parse_new(&self, spec: &str) -> Result<PropertySpec, LayoutError> {
        let entry = PropertySpec::parse(spec);
        if self.position(&entry).is_some() {
            return Err(LayoutError::Duplicate {
                step: spec.to_string(),
            });
        }
        Ok(entry)
    }

    fn position(&self, entry: &PropertySpec) -> Option<usize> {
        self.entries.iter().position(|e| e == entry)
    }
}

impl Default for PipelineLayout {
    fn default() -> Self {
        Self::new()
    }
}
