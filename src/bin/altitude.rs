//! CLI tool for adding an altitude column to a coordinate table

use antenna_forms::altitude::{enrich_csv, AltitudeClient};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Looks up each coordinate pair of a CSV file with a reverse-geocoding
/// service and writes the table back out with an extra altitude column.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Semicolon-delimited input CSV with latitud and longitud columns.
    #[arg(long, value_name = "FILE", default_value = "coordenadas.csv")]
    input: PathBuf,

    /// Where the enriched table is written.
    #[arg(long, value_name = "FILE", default_value = "coordenadas_con_altitud.csv")]
    output: PathBuf,
}

fn main() {
    let args = Args::parse();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client = match AltitudeClient::new() {
        Ok(client) => client,
        Err(e) => {
            error!("could not build HTTP client: {e}");
            process::exit(1);
        }
    };

    info!("reading coordinates from {}", args.input.display());
    match enrich_csv(&args.input, &args.output, &client) {
        Ok(rows) => info!("done, {rows} rows enriched"),
        Err(e) => {
            error!("run aborted: {e}");
            process::exit(1);
        }
    }
}
