//! Compose command - Render a model through its template set.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use tracing::info;

use folio_templates::TemplatePackage;

use super::PackageArgs;

#[derive(Args)]
pub struct ComposeArgs {
    /// Model name selecting the template set (e.g. Invoice)
    #[arg(short, long)]
    model: String,

    /// Model data as a JSON or YAML file
    #[arg(short, long)]
    data: PathBuf,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    package: PackageArgs,
}

pub async fn execute(args: ComposeArgs) -> Result<()> {
    let config = args.package.to_config()?;
    info!("Composing '{}' from {:?}", args.model, config.package_root);

    let model = read_model(&args.data)?;
    let compositor = TemplatePackage::open(&config).context("Failed to load template package")?;
    let document = compositor.compose_value(&args.model, model).await?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &document)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} bytes to {:?}", document.len(), path);
        }
        None => print!("{document}"),
    }

    Ok(())
}

/// Parse model data, choosing YAML or JSON by file extension.
fn read_model(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read model data {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let value = if is_yaml {
        serde_yaml::from_str(&content).context("Invalid YAML model data")?
    } else {
        serde_json::from_str(&content).context("Invalid JSON model data")?
    };
    Ok(value)
}
