//! Resource identifiers and the template-set naming convention.
//!
//! A template set for a model named `Invoice` consists of:
//!
//! - `Templates.InvoiceHeader.html` (header resource)
//! - `/Templates/Invoice.hbs` (body template)
//! - `Templates.InvoiceFooter.html` (footer resource)

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{TemplateError, TemplateResult};

/// Folder holding every template set.
pub const TEMPLATE_FOLDER: &str = "Templates";

/// Extension of executable body templates.
pub const TEMPLATE_EXTENSION: &str = "hbs";

/// Extension of header and footer resources.
pub const RESOURCE_EXTENSION: &str = "html";

static MODEL_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("model name pattern is valid")
});

/// Role a resource plays in a template set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceRole {
    Header,
    Footer,
    Body,
}

impl ResourceRole {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Header => "Header",
            Self::Footer => "Footer",
            Self::Body => "Body",
        }
    }
}

impl fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key naming a header, footer or body template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceIdentifier(String);

impl ResourceIdentifier {
    /// Wrap an identifier that is already in its final form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the identifier for `role` of the template set named `prefix`.
    pub fn compose(folder: &str, prefix: &str, role: ResourceRole) -> Self {
        match role {
            ResourceRole::Body => Self(format!("/{folder}/{prefix}.{TEMPLATE_EXTENSION}")),
            ResourceRole::Header | ResourceRole::Footer => Self(format!(
                "{folder}.{prefix}{}.{RESOURCE_EXTENSION}",
                role.name()
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceIdentifier {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ResourceIdentifier {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Reject model names that could produce ambiguous identifiers.
pub fn validate_model_name(model_name: &str) -> TemplateResult<()> {
    if model_name.is_empty() {
        return Err(TemplateError::InvalidModel(
            "model name must not be empty".to_string(),
        ));
    }
    if !MODEL_NAME_PATTERN.is_match(model_name) {
        return Err(TemplateError::InvalidModel(format!(
            "model name '{model_name}' must be an identifier ([A-Za-z_][A-Za-z0-9_]*)"
        )));
    }
    Ok(())
}
