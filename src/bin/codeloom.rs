//! Thin CLI front-end for `codeloom`.
//!
//! Rendering, report formats, and IDE/CI integration are explicitly out of
//! scope for this crate (§1 Non-goals); this binary exists only to drive
//! [`codeloom::analyze`] from a path and dump the result as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use codeloom::core::settings::Settings;

/// Run codeloom's static-analysis pipeline over a repository and print the
/// resulting findings and signal-field snapshot as JSON.
#[derive(Debug, Parser)]
#[command(name = "codeloom", version, about)]
struct Cli {
    /// Root directory of the repository to analyze.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Path to a settings file (YAML or JSON, per `Settings`'s serde
    /// derive). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of findings to emit; overrides the config/default.
    #[arg(long)]
    max_findings: Option<usize>,

    /// Increase log verbosity (info -> debug).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).with_target(false).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "analysis failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                serde_json::from_str(&text)?
            } else {
                serde_yaml::from_str(&text)?
            }
        }
        None => Settings::default(),
    };

    if let Some(max) = cli.max_findings {
        settings.max_findings = max;
    }

    let output = codeloom::analyze(&cli.root, &settings)?;
    let rendered = serde_json::to_string_pretty(&ReportView {
        findings: &output.findings,
        file_count: output.snapshot.file_count,
        temporal_available: output.snapshot.temporal_available,
        diagnostics: &output.snapshot.diagnostics,
    })?;
    println!("{rendered}");
    Ok(())
}

#[derive(serde::Serialize)]
struct ReportView<'a> {
    findings: &'a [codeloom::Finding],
    file_count: usize,
    temporal_available: bool,
    diagnostics: &'a codeloom::core::diagnostics::Diagnostics,
}
