//! CLI tool for extracting document outlines
//!
//! With a directory argument every `.pdf` / `.txt` inside it is processed
//! and written as JSON to the output directory. With a single file the
//! outline is printed to stdout.

use clap::{Parser, ValueEnum};
use pdf_outline::{
    extract_outline_with_config, run_batch, DedupKey, FileStatus, JsonStyle, OutlineConfig,
    OutlineError,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "pdf-outline")]
#[command(version)]
#[command(about = "Extract a title and H1-H4 outline from PDF documents", long_about = None)]
struct Cli {
    /// Input directory, or a single PDF / text file
    #[arg(value_name = "INPUT", default_value = "input")]
    input: PathBuf,

    /// Output directory for batch mode
    #[arg(value_name = "OUTPUT", default_value = "output")]
    output: PathBuf,

    /// JSON configuration file with tuning overrides
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fraction of pages above which a repeated heading is treated as a running header
    #[arg(long, value_name = "FRACTION")]
    boilerplate_fraction: Option<f32>,

    /// Key used to drop duplicate headings
    #[arg(long, value_enum)]
    dedup: Option<DedupMode>,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum DedupMode {
    TextPage,
    TextLevel,
}

impl From<DedupMode> for DedupKey {
    fn from(mode: DedupMode) -> Self {
        match mode {
            DedupMode::TextPage => DedupKey::TextPage,
            DedupMode::TextLevel => DedupKey::TextLevel,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> Result<OutlineConfig, OutlineError> {
    let mut config = match &cli.config {
        Some(path) => OutlineConfig::from_json_file(path)?,
        None => OutlineConfig::default(),
    };
    if let Some(fraction) = cli.boilerplate_fraction {
        config.boilerplate_page_fraction = fraction;
    }
    if let Some(mode) = cli.dedup {
        config.dedup_key = mode.into();
    }
    config.validate()?;
    Ok(config)
}

/// Returns `Ok(false)` when at least one document failed
fn run(cli: &Cli) -> Result<bool, OutlineError> {
    let config = load_config(cli)?;
    let style = if cli.compact {
        JsonStyle::Compact
    } else {
        JsonStyle::Pretty
    };

    if cli.input.is_file() {
        let outline = extract_outline_with_config(&cli.input, &config)?;
        let json = match style {
            JsonStyle::Pretty => outline.to_json_pretty()?,
            JsonStyle::Compact => outline.to_json()?,
        };
        println!("{}", json);
        return Ok(true);
    }

    let report = run_batch(&cli.input, &cli.output, &config, style)?;
    for outcome in &report.outcomes {
        if let FileStatus::Failed(reason) = &outcome.status {
            eprintln!("Failed: {} ({})", outcome.input.display(), reason);
        }
    }
    log::info!(
        "Done: {} processed, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(report.is_success())
}
