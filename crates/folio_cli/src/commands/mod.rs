//! CLI command definitions.
//!
//! Each subcommand loads a template package and either composes a document
//! or checks that template sets are complete.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use folio_templates::ComposerConfig;

pub mod check;
pub mod compose;

/// folio - compose documents from header, body and footer templates
#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "folio - compose documents from header, body and footer templates")]
#[command(long_about = r#"
folio composes documents from template sets. A template set for a model
named Invoice lives in a package directory as:

  Templates/InvoiceHeader.html   header resource
  Templates/Invoice.hbs          body template (Handlebars)
  Templates/InvoiceFooter.html   footer resource

COMMANDS:
  compose  → Render a model and join header + body + footer
  check    → Verify template sets are complete

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  4 - Template error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compose a document for a model
    Compose(compose::ComposeArgs),

    /// Check that template sets are complete
    Check(check::CheckArgs),
}

/// Options shared by every command that loads a package.
#[derive(Args, Debug, Clone)]
pub struct PackageArgs {
    /// Package directory containing the Templates folder
    #[arg(short, long, env = "FOLIO_PACKAGE")]
    pub package: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Block size used when streaming headers and footers
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Fail when a template references a field the model lacks
    #[arg(long)]
    pub strict: bool,
}

impl PackageArgs {
    /// Build the effective configuration; flags override the config file.
    pub fn to_config(&self) -> Result<ComposerConfig> {
        let mut config = match &self.config {
            Some(path) => ComposerConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ComposerConfig::default(),
        };

        if let Some(package) = &self.package {
            config = config.package_root(package);
        }
        if let Some(chunk_size) = self.chunk_size {
            config = config.chunk_size(chunk_size);
        }
        if self.strict {
            config = config.strict_models(true);
        }

        config.validate()?;
        Ok(config)
    }
}
