//! folio CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure
//! - 4: Template error

use std::process::ExitCode;

use clap::Parser;
use folio_templates::TemplateError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    let mut filter = EnvFilter::from_default_env().add_directive("warn".parse().unwrap());
    for target in ["folio", "folio_templates"] {
        if let Ok(directive) = format!("{target}={level}").parse() {
            filter = filter.add_directive(directive);
        }
    }

    // A subscriber may already be installed.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let result = match cli.command {
        Commands::Compose(args) => commands::compose::execute(args).await,
        Commands::Check(args) => commands::check::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(template_error) = e.downcast_ref::<TemplateError>() {
        return match template_error {
            TemplateError::Resolution { .. } => ExitCodes::VALIDATION_FAILURE,
            TemplateError::InvalidModel(_) | TemplateError::InvalidConfig(_) => {
                ExitCodes::INVALID_ARGS
            }
            TemplateError::Io(_) => ExitCodes::GENERAL_ERROR,
            _ => ExitCodes::TEMPLATE_ERROR,
        };
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("validation") {
        ExitCodes::VALIDATION_FAILURE
    } else if msg.contains("template") {
        ExitCodes::TEMPLATE_ERROR
    } else if msg.contains("argument") || msg.contains("not found") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
