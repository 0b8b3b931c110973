//! Altitude enrichment of coordinate tables
//!
//! Reads a semicolon-delimited CSV with `latitud` and `longitud` header
//! columns, asks the Nominatim reverse-geocoding endpoint for each point
//! and appends an `altitud` column with whatever the response carried
//! (usually nothing; the column is then left empty).
//!
//! Requests are issued one per row, synchronously, with no retry, rate
//! limiting or timeout handling. The public Nominatim instance allows at
//! most one request per second; batches are expected to be small.

use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Default Nominatim instance.
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Errors from the altitude enrichment run.
#[derive(Debug, thiserror::Error)]
pub enum AltitudeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("input CSV has no {name:?} column")]
    MissingColumn { name: &'static str },
    #[error("row {row}: coordinate is not a number: {value:?}")]
    InvalidCoordinate { row: u64, value: String },
}

/// Blocking client for the Nominatim `/reverse` endpoint.
pub struct AltitudeClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl AltitudeClient {
    pub fn new() -> Result<Self, AltitudeError> {
        Self::with_base_url(NOMINATIM_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, AltitudeError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent("altitud_calculator")
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Reverse-geocodes one point and returns its altitude, when the
    /// response address carries one.
    pub fn lookup(&self, latitude: f64, longitude: f64) -> Result<Option<String>, AltitudeError> {
        let query = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("format", "jsonv2".to_string()),
            ("accept-language", "es".to_string()),
        ];
        let body: Value = self
            .http
            .get(format!("{}/reverse", self.base_url))
            .query(&query)
            .send()?
            .json()?;
        Ok(parse_altitude(&body))
    }
}

/// Pulls `address.altitude` out of a Nominatim reverse response.
///
/// The member is absent for virtually every location; a missing address
/// dictionary or altitude member is an empty result, not an error.
pub fn parse_altitude(body: &Value) -> Option<String> {
    match body.get("address")?.get("altitude")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads `input`, appends an `altitud` column and writes the enriched table
/// to `output`. Returns the number of data rows written.
///
/// Row order and all original columns are preserved unchanged. The input is
/// semicolon-delimited; the output is written comma-delimited.
pub fn enrich_csv(
    input: &Path,
    output: &Path,
    client: &AltitudeClient,
) -> Result<u64, AltitudeError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_path(input)?;

    let headers = reader.headers()?.clone();
    let lat_index = find_column(&headers, "latitud")?;
    let lon_index = find_column(&headers, "longitud")?;

    let mut writer = csv::WriterBuilder::new().from_path(output)?;
    writer.write_record(headers.iter().chain(std::iter::once("altitud")))?;

    let mut rows = 0u64;
    for record in reader.records() {
        let record = record?;
        let latitude = parse_coordinate(&record, lat_index, rows)?;
        let longitude = parse_coordinate(&record, lon_index, rows)?;

        let altitude = client.lookup(latitude, longitude)?.unwrap_or_default();
        debug!("row {rows}: ({latitude}, {longitude}) -> {altitude:?}");

        writer.write_record(record.iter().chain(std::iter::once(altitude.as_str())))?;
        rows += 1;
    }
    writer.flush()?;

    info!("wrote {rows} rows to {}", output.display());
    Ok(rows)
}

fn find_column(headers: &csv::StringRecord, name: &'static str) -> Result<usize, AltitudeError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or(AltitudeError::MissingColumn { name })
}

fn parse_coordinate(
    record: &csv::StringRecord,
    index: usize,
    row: u64,
) -> Result<f64, AltitudeError> {
    let raw = record.get(index).unwrap_or("");
    raw.trim()
        .parse()
        .map_err(|_| AltitudeError::InvalidCoordinate {
            row,
            value: raw.to_string(),
        })
}
