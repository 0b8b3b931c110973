//! Per-row batch loop: one filled PDF per CSV row
//!
//! A failing row is logged and skipped; the batch keeps going. Only input
//! problems that make the remaining rows meaningless (unreadable CSV, short
//! rows, non-numeric row numbers or selector codes) abort the run.

use crate::fields::row_fields;
use crate::filler::fill_form;
use crate::FormError;
use std::fs;
use std::path::Path;
use tracing::{error, info};

/// Counts for one completed batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Rows that produced an output PDF.
    pub generated: u32,
    /// Rows whose PDF generation failed and was skipped.
    pub failed: u32,
}

/// Fills `template` once per row of `csv_file`, writing `output_NNNN.pdf`
/// files into `output_dir`.
///
/// The output directory is created if absent; existing files are
/// overwritten.
pub fn run_batch(
    template: &Path,
    csv_file: &Path,
    output_dir: &Path,
) -> Result<BatchOutcome, FormError> {
    if output_dir.exists() {
        info!(
            "output directory {} already exists, files will be overwritten",
            output_dir.display()
        );
    } else {
        info!("creating output directory {}", output_dir.display());
        fs::create_dir_all(output_dir)?;
    }

    info!("reading rows from {}", csv_file.display());
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_path(csv_file)?;

    let mut outcome = BatchOutcome {
        generated: 0,
        failed: 0,
    };

    for record in reader.records() {
        let row = row_fields(&record?)?;
        let output = output_dir.join(format!("output_{:04}.pdf", row.number));

        match fill_form(template, &output, &row.values) {
            Ok(filled) => {
                info!("file {:04}: OK ({filled} fields)", row.number);
                outcome.generated += 1;
            }
            Err(e) => {
                error!("PDF generation failed for file {:04}: {e}", row.number);
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}
