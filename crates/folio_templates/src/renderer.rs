//! Body template execution.
//!
//! The compositor only sees [`TemplateExecutor`]; any rendering technology
//! able to evaluate a [`TemplateArtifact`] against a JSON model can sit
//! behind it. [`HandlebarsExecutor`] is the default one.

use std::io;

use async_trait::async_trait;
use handlebars::{Context, Handlebars, Output, RenderContext, Renderable};
use serde_json::Value;
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::registry::TemplateArtifact;

/// Executes a precompiled template against a model, writing into `out`.
#[async_trait]
pub trait TemplateExecutor: Send + Sync {
    async fn execute(
        &self,
        artifact: &TemplateArtifact,
        model: &Value,
        out: &mut String,
    ) -> TemplateResult<()>;
}

/// Adapts a `String` sink to the Handlebars output interface.
struct StringSink<'a>(&'a mut String);

impl Output for StringSink<'_> {
    fn write(&mut self, seg: &str) -> Result<(), io::Error> {
        self.0.push_str(seg);
        Ok(())
    }
}

/// Renders artifacts with a Handlebars registry.
pub struct HandlebarsExecutor {
    hbs: Handlebars<'static>,
}

impl Default for HandlebarsExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlebarsExecutor {
    pub fn new() -> Self {
        Self {
            hbs: Handlebars::new(),
        }
    }

    /// Fail on references to fields the model does not have.
    pub fn strict(mut self, strict: bool) -> Self {
        self.hbs.set_strict_mode(strict);
        self
    }

    fn render(&self, artifact: &TemplateArtifact, model: &Value, out: &mut String) -> TemplateResult<()> {
        let render_error = |message: String| TemplateError::Render {
            template: artifact.id().to_string(),
            message,
        };

        let ctx = Context::wraps(model).map_err(|e| render_error(e.to_string()))?;
        let mut rc = RenderContext::new(None);
        let mut sink = StringSink(out);
        artifact
            .template()
            .render(&self.hbs, &ctx, &mut rc, &mut sink)
            .map_err(|e| render_error(e.to_string()))
    }
}

#[async_trait]
impl TemplateExecutor for HandlebarsExecutor {
    async fn execute(
        &self,
        artifact: &TemplateArtifact,
        model: &Value,
        out: &mut String,
    ) -> TemplateResult<()> {
        debug!("Executing template {}", artifact.id());
        self.render(artifact, model, out)
    }
}
