//! # folio_templates
//!
//! Template set resolution, validation and composition for folio.
//!
//! A template set is the header, body and footer belonging to one model
//! name. This crate:
//!
//! - Indexes header/footer resources and precompiled body templates
//! - Checks that a whole template set exists, reporting every missing piece
//! - Renders the body against a model and joins header + body + footer
//!
//! ## Example
//!
//! ```rust,no_run
//! use folio_templates::{ComposerConfig, TemplateModel, TemplatePackage};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Invoice {
//!     total: u32,
//! }
//!
//! impl TemplateModel for Invoice {
//!     fn template_name(&self) -> &str {
//!         "Invoice"
//!     }
//! }
//!
//! # async fn run() -> folio_templates::TemplateResult<()> {
//! let compositor = TemplatePackage::open(&ComposerConfig::new("site"))?;
//! let html = compositor.compose(&Invoice { total: 42 }).await?;
//! # Ok(())
//! # }
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod identifier;
pub mod package;
pub mod registry;
pub mod renderer;
pub mod resolver;
pub mod store;

pub use compositor::{Compositor, TemplateModel};
pub use config::{ComposerConfig, DEFAULT_CHUNK_SIZE};
pub use error::{TemplateError, TemplateResult};
pub use identifier::{ResourceIdentifier, ResourceRole, TEMPLATE_FOLDER};
pub use package::{DeclaredTemplate, PackageManifest, TemplatePackage};
pub use registry::{TemplateArtifact, TemplateRegistry, TemplateRegistryBuilder};
pub use renderer::{HandlebarsExecutor, TemplateExecutor};
pub use resolver::{ResolutionEntry, ResolutionReport, ResolvedTemplateSet, TemplateResolver};
pub use store::{DirectoryResourceStore, EmbeddedResourceStore, ResourceStore, ResourceStream};
