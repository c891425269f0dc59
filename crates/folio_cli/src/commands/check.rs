//! Check command - Verify that template sets are complete.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use folio_templates::{ComposerConfig, ResolutionReport, TemplatePackage};

use super::PackageArgs;

#[derive(Args)]
pub struct CheckArgs {
    /// Specific model to check (checks every template set if not specified)
    #[arg(short, long)]
    model: Option<String>,

    #[command(flatten)]
    package: PackageArgs,
}

pub async fn execute(args: CheckArgs) -> Result<()> {
    let config = args.package.to_config()?;
    info!("Checking template sets in {:?}", config.package_root);

    let reports = check_package(&config, args.model.as_deref()).await?;

    if reports.is_empty() {
        println!("⚠️  No template sets found to check");
        return Ok(());
    }

    println!("🧪 Checking {} template set(s)...\n", reports.len());

    let mut failed = 0;
    for report in &reports {
        if report.is_complete() {
            println!("{}... ✅", report.model);
        } else {
            println!("{}... ❌", report.model);
            failed += 1;
            for message in report.missing_messages() {
                println!("   - {}", message);
            }
        }
    }

    println!();
    println!(
        "Results: {} passed, {} failed",
        reports.len() - failed,
        failed
    );

    if failed > 0 {
        anyhow::bail!("Template validation failed for {} template set(s)", failed);
    }

    Ok(())
}

/// Resolve one model, or every model that has a body template.
async fn check_package(config: &ComposerConfig, model: Option<&str>) -> Result<Vec<ResolutionReport>> {
    let package =
        TemplatePackage::load(&config.package_root).context("Failed to load template package")?;
    let models = match model {
        Some(name) => vec![name.to_string()],
        None => package.model_names(),
    };

    let compositor = package.into_compositor(config);
    let mut reports = Vec::with_capacity(models.len());
    for name in &models {
        reports.push(compositor.validate(name).await?);
    }
    Ok(reports)
}
