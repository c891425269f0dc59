//! Registry of precompiled body templates.

use std::collections::HashMap;

use handlebars::Template;
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::identifier::ResourceIdentifier;

/// A compiled body template and the identifier it declares for itself.
#[derive(Debug, Clone)]
pub struct TemplateArtifact {
    id: ResourceIdentifier,
    template: Template,
}

impl TemplateArtifact {
    pub fn new(id: impl Into<ResourceIdentifier>, template: Template) -> Self {
        Self {
            id: id.into(),
            template,
        }
    }

    /// Compile `source` into an artifact identified by `id`.
    pub fn compile(id: impl Into<ResourceIdentifier>, source: &str) -> TemplateResult<Self> {
        let id = id.into();
        let template = Template::compile(source).map_err(|e| TemplateError::Compile {
            template: id.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { id, template })
    }

    pub fn id(&self) -> &ResourceIdentifier {
        &self.id
    }

    pub fn template(&self) -> &Template {
        &self.template
    }
}

/// Immutable index of template artifacts by identifier.
#[derive(Default)]
pub struct TemplateRegistry {
    artifacts: HashMap<ResourceIdentifier, TemplateArtifact>,
}

impl TemplateRegistry {
    pub fn builder() -> TemplateRegistryBuilder {
        TemplateRegistryBuilder::default()
    }

    pub fn lookup(&self, id: &ResourceIdentifier) -> TemplateResult<&TemplateArtifact> {
        self.artifacts
            .get(id)
            .ok_or_else(|| TemplateError::ResourceNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &ResourceIdentifier) -> bool {
        self.artifacts.contains_key(id)
    }

    /// All identifiers, sorted.
    pub fn ids(&self) -> Vec<&ResourceIdentifier> {
        let mut ids: Vec<_> = self.artifacts.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("artifacts", &self.ids())
            .finish()
    }
}

/// Collects artifacts at startup; duplicates are rejected, never replaced.
#[derive(Default)]
pub struct TemplateRegistryBuilder {
    artifacts: HashMap<ResourceIdentifier, TemplateArtifact>,
}

impl TemplateRegistryBuilder {
    pub fn add(&mut self, artifact: TemplateArtifact) -> TemplateResult<&mut Self> {
        if self.artifacts.contains_key(artifact.id()) {
            return Err(TemplateError::DuplicateTemplate(artifact.id().to_string()));
        }
        debug!("Registering template artifact: {}", artifact.id());
        self.artifacts.insert(artifact.id().clone(), artifact);
        Ok(self)
    }

    pub fn build(self) -> TemplateRegistry {
        TemplateRegistry {
            artifacts: self.artifacts,
        }
    }
}
