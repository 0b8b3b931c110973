//! Batch generation of antenna registration PDFs using lopdf
//!
//! This crate provides:
//! - Per-row filling of a PDF form template from semicolon-delimited CSV data
//! - Degrees/minutes/seconds coordinate splitting into the template's fields
//! - Altitude enrichment of coordinate tables via reverse geocoding

pub mod altitude;
pub mod batch;
pub mod coords;
pub mod fields;
pub mod filler;

pub use batch::{run_batch, BatchOutcome};
pub use coords::{coord_components, coord_fields, CoordTarget};
pub use fields::{antenna_checkbox, band_checkbox, row_fields, FieldValues, FormRow};
pub use filler::{fill_form, list_form_fields, FieldKind, FormField};

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("row is missing column {index}")]
    MissingColumn { index: usize },
    #[error("column {column} is not a number: {value:?}")]
    InvalidNumber { column: usize, value: String },
    #[error("PDF has no fillable form fields")]
    MissingForm,
}

impl From<lopdf::Error> for FormError {
    fn from(e: lopdf::Error) -> Self {
        FormError::Pdf(e.to_string())
    }
}
