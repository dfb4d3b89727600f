//! Render designs
//!
//! A render design attaches export metadata to a report definition: which
//! renderer produces the output, which template resource it fills, and
//! renderer-specific properties such as the repeating-section marker.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Output renderer family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RendererKind {
    /// Spreadsheet template renderer
    ExcelTemplate,
    /// Plain CSV renderer
    Csv,
}

/// Export metadata attached to a report definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDesign {
    /// Design name, the host engine's lookup key
    pub name: String,
    /// Name of the report definition this design renders
    pub report_name: String,
    /// Renderer producing the output
    pub renderer: RendererKind,
    /// Template resource the renderer fills, if any
    pub resource_name: Option<String>,
    /// Renderer-specific properties, in declaration order
    pub properties: IndexMap<String, String>,
}

impl ReportDesign {
    /// Create a spreadsheet-template design for a report
    pub fn excel_template(
        name: impl Into<String>,
        report_name: impl Into<String>,
        resource_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            report_name: report_name.into(),
            renderer: RendererKind::ExcelTemplate,
            resource_name: Some(resource_name.into()),
            properties: IndexMap::new(),
        }
    }

    /// Create a CSV design for a report
    pub fn csv(name: impl Into<String>, report_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            report_name: report_name.into(),
            renderer: RendererKind::Csv,
            resource_name: None,
            properties: IndexMap::new(),
        }
    }

    /// Set a renderer property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Look up a renderer property
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}
