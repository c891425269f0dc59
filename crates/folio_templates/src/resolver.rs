//! Template set resolution.
//!
//! Before anything is rendered the resolver checks that the header, body and
//! footer of a template set all exist. Every missing piece is collected so a
//! single error reports the whole gap.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{TemplateError, TemplateResult};
use crate::identifier::{validate_model_name, ResourceIdentifier, ResourceRole, TEMPLATE_FOLDER};
use crate::registry::TemplateRegistry;
use crate::store::ResourceStore;

/// One checked member of a template set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionEntry {
    pub id: ResourceIdentifier,
    pub role: ResourceRole,
    pub found: bool,
}

impl ResolutionEntry {
    fn message(&self) -> String {
        match self.role {
            ResourceRole::Body => format!("The template file: {}, was not found.", self.id),
            ResourceRole::Header | ResourceRole::Footer => {
                format!("The resource file: {}, was not found.", self.id)
            }
        }
    }
}

/// Found/not-found status of every member of a template set.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub model: String,
    pub entries: Vec<ResolutionEntry>,
}

impl ResolutionReport {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            entries: Vec::with_capacity(3),
        }
    }

    pub fn record(&mut self, id: ResourceIdentifier, role: ResourceRole, found: bool) {
        debug!("Resolution of {} ({}): found={}", id, role, found);
        self.entries.push(ResolutionEntry { id, role, found });
    }

    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|e| e.found)
    }

    /// Messages for the missing members, in check order.
    pub fn missing_messages(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.found)
            .map(ResolutionEntry::message)
            .collect()
    }

    fn identifier(&self, role: ResourceRole) -> Option<&ResourceIdentifier> {
        self.entries.iter().find(|e| e.role == role).map(|e| &e.id)
    }

    /// Turn the report into the identifiers to compose, or the aggregated error.
    pub fn into_result(self) -> TemplateResult<ResolvedTemplateSet> {
        if !self.is_complete() {
            return Err(TemplateError::Resolution {
                messages: self.missing_messages(),
                model: self.model,
            });
        }

        let missing = |role: ResourceRole| {
            TemplateError::ResourceNotFound(format!("{role} of {} was never checked", self.model))
        };
        Ok(ResolvedTemplateSet {
            header: self.identifier(ResourceRole::Header).cloned().ok_or_else(|| missing(ResourceRole::Header))?,
            body: self.identifier(ResourceRole::Body).cloned().ok_or_else(|| missing(ResourceRole::Body))?,
            footer: self.identifier(ResourceRole::Footer).cloned().ok_or_else(|| missing(ResourceRole::Footer))?,
            model: self.model,
        })
    }
}

/// Identifiers of a template set that passed resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplateSet {
    pub model: String,
    pub header: ResourceIdentifier,
    pub body: ResourceIdentifier,
    pub footer: ResourceIdentifier,
}

/// Validates template sets against the resource store and template registry.
#[derive(Clone)]
pub struct TemplateResolver {
    store: Arc<dyn ResourceStore>,
    registry: Arc<TemplateRegistry>,
}

impl TemplateResolver {
    pub fn new(store: Arc<dyn ResourceStore>, registry: Arc<TemplateRegistry>) -> Self {
        Self { store, registry }
    }

    /// Check every member of the template set named `model_name`.
    pub async fn report(&self, model_name: &str) -> TemplateResult<ResolutionReport> {
        validate_model_name(model_name)?;

        let mut report = ResolutionReport::new(model_name);

        let body = ResourceIdentifier::compose(TEMPLATE_FOLDER, model_name, ResourceRole::Body);
        let found = self.registry.contains(&body);
        report.record(body, ResourceRole::Body, found);

        for role in [ResourceRole::Header, ResourceRole::Footer] {
            let id = ResourceIdentifier::compose(TEMPLATE_FOLDER, model_name, role);
            // Opened and dropped straight away; only existence matters here.
            let found = match self.store.open(&id).await {
                Ok(_stream) => true,
                Err(e) if e.is_not_found() => false,
                Err(e) => return Err(e),
            };
            report.record(id, role, found);
        }

        Ok(report)
    }

    /// Resolve the template set for `model_name`, failing with every missing piece.
    pub async fn resolve(&self, model_name: &str) -> TemplateResult<ResolvedTemplateSet> {
        let report = self.report(model_name).await?;
        if report.is_complete() {
            debug!("Template set '{}' resolved", model_name);
        } else {
            info!(
                "Template set '{}' is incomplete ({} missing)",
                model_name,
                report.entries.iter().filter(|e| !e.found).count()
            );
        }
        report.into_result()
    }
}

impl std::fmt::Debug for TemplateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateResolver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
