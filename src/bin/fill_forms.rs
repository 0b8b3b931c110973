//! CLI tool for batch-filling a PDF form template from CSV rows

use antenna_forms::run_batch;
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE: &str = "main.log";

/// Fills a PDF template with detectable form fields once per row of a CSV
/// file. The generated documents can still be edited before printing.
///
/// A main.log file is written in the working directory alongside the
/// console output.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path of the PDF form template to use.
    #[arg(long = "pdf_template", value_name = "FILE", value_parser = existing_file)]
    pdf_template: PathBuf,

    /// Path of the semicolon-delimited CSV file, one row per document.
    #[arg(long = "csv_file", value_name = "FILE", value_parser = existing_file)]
    csv_file: PathBuf,

    /// Directory where the generated documents are stored.
    #[arg(long = "pdf_output_dir", value_name = "DIR", default_value = "results2")]
    pdf_output_dir: PathBuf,
}

fn existing_file(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("no such file: {raw}"))
    }
}

/// Logs to stdout and to `main.log`.
fn init_logging() -> std::io::Result<()> {
    let log_file = OpenOptions::new().create(true).append(true).open(LOG_FILE)?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(Arc::new(log_file)))
        .init();
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging() {
        eprintln!("could not open {LOG_FILE}: {e}");
        process::exit(1);
    }

    info!("starting batch run");
    match run_batch(&args.pdf_template, &args.csv_file, &args.pdf_output_dir) {
        Ok(outcome) => {
            info!(
                "run ended: {} generated, {} failed",
                outcome.generated, outcome.failed
            );
        }
        Err(e) => {
            error!("run aborted: {e}");
            process::exit(1);
        }
    }
}
