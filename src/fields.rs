//! Form field mapping for the antenna registration template
//!
//! The template addresses its text fields as `TextoNN` and its checkboxes
//! as "Casilla de verificación N". The checkbox names carry an embedded
//! UTF-16BE byte-order mark from the template's internal encoding; the
//! constants below reproduce those names verbatim, because the fill
//! operation matches on them byte for byte.
//!
//! Input rows follow a fixed 23-column order specific to this template.
//! Columns are accessed positionally; there is no header row.

use crate::coords::{coord_fields, CoordTarget};
use crate::FormError;
use csv::StringRecord;
use tracing::error;

/// Band 5.150–5.250 GHz (selector code 2)
pub const CASILLA_6: &str = "þÿ\u{0}C\u{0}a\u{0}s\u{0}i\u{0}l\u{0}l\u{0}a\u{0} \u{0}d\u{0}e\u{0} \u{0}v\u{0}e\u{0}r\u{0}i\u{0}f\u{0}i\u{0}c\u{0}a\u{0}c\u{0}i\u{0}ó\u{0}n\u{0}6";
/// Band 5.250–5.350 GHz (selector code 3)
pub const CASILLA_7: &str = "þÿ\u{0}C\u{0}a\u{0}s\u{0}i\u{0}l\u{0}l\u{0}a\u{0} \u{0}d\u{0}e\u{0} \u{0}v\u{0}e\u{0}r\u{0}i\u{0}f\u{0}i\u{0}c\u{0}a\u{0}c\u{0}i\u{0}ó\u{0}n\u{0}7";
/// Band 5.470–5.725 GHz (selector code 4)
pub const CASILLA_5: &str = "þÿ\u{0}C\u{0}a\u{0}s\u{0}i\u{0}l\u{0}l\u{0}a\u{0} \u{0}d\u{0}e\u{0} \u{0}v\u{0}e\u{0}r\u{0}i\u{0}f\u{0}i\u{0}c\u{0}a\u{0}c\u{0}i\u{0}ó\u{0}n\u{0}5";
/// Band 5.725–5.850 GHz (selector code 5)
pub const CASILLA_8: &str = "þÿ\u{0}C\u{0}a\u{0}s\u{0}i\u{0}l\u{0}l\u{0}a\u{0} \u{0}d\u{0}e\u{0} \u{0}v\u{0}e\u{0}r\u{0}i\u{0}f\u{0}i\u{0}c\u{0}a\u{0}c\u{0}i\u{0}ó\u{0}n\u{0}8";
/// Antenna type code 3
pub const CASILLA_12: &str = "þÿ\u{0}C\u{0}a\u{0}s\u{0}i\u{0}l\u{0}l\u{0}a\u{0} \u{0}d\u{0}e\u{0} \u{0}v\u{0}e\u{0}r\u{0}i\u{0}f\u{0}i\u{0}c\u{0}a\u{0}c\u{0}i\u{0}ó\u{0}n\u{0}1\u{0}2";
/// Antenna type code 2
pub const CASILLA_13: &str = "þÿ\u{0}C\u{0}a\u{0}s\u{0}i\u{0}l\u{0}l\u{0}a\u{0} \u{0}d\u{0}e\u{0} \u{0}v\u{0}e\u{0}r\u{0}i\u{0}f\u{0}i\u{0}c\u{0}a\u{0}c\u{0}i\u{0}ó\u{0}n\u{0}1\u{0}3";

/// Value a checkbox field is set to when selected.
pub const CHECKED: &str = "Yes";

/// An ordered form-field-name → value mapping, built per row and passed
/// wholesale to the fill operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    entries: Vec<(String, String)>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field value, replacing any earlier value for the same name.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Merges another mapping into this one, in order.
    pub fn extend(&mut self, other: FieldValues) {
        for (name, value) in other.entries {
            self.set(&name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Selects the frequency-band checkbox for a selector code.
///
/// Codes outside {2, 3, 4, 5} yield an empty mapping.
pub fn band_checkbox(code: i64) -> FieldValues {
    let mut values = FieldValues::new();
    match code {
        2 => values.set(CASILLA_6, CHECKED),
        3 => values.set(CASILLA_7, CHECKED),
        4 => values.set(CASILLA_5, CHECKED),
        5 => values.set(CASILLA_8, CHECKED),
        _ => {}
    }
    values
}

/// Selects the antenna-type checkbox for a selector code.
///
/// Code 3 additionally fills the aperture-angle field (`Texto43`) when the
/// aperture string is non-empty after trimming. Codes outside {2, 3} yield
/// an empty mapping.
pub fn antenna_checkbox(code: i64, aperture: &str) -> FieldValues {
    let mut values = FieldValues::new();
    match code {
        2 => values.set(CASILLA_13, CHECKED),
        3 => {
            values.set(CASILLA_12, CHECKED);
            let aperture = aperture.trim();
            if !aperture.is_empty() {
                values.set("Texto43", aperture);
            }
        }
        _ => {}
    }
    values
}

/// One assembled input row: the output file number plus the field mapping.
#[derive(Debug, Clone)]
pub struct FormRow {
    /// Row number from column 0; names the output file.
    pub number: u32,
    pub values: FieldValues,
}

/// Assembles the field mapping for one CSV row.
///
/// A coordinate that did not yield exactly three components is logged and
/// left partially filled; the row is still produced. A short row or a
/// non-numeric row number / selector code is a hard error.
pub fn row_fields(record: &StringRecord) -> Result<FormRow, FormError> {
    let number = parse_u32(record, 0)?;

    let mut values = FieldValues::new();
    values.set("Texto18", column(record, 1)?.trim());
    values.set("Texto36", column(record, 2)?.trim());

    for (target, col, label) in [
        (CoordTarget::OriginLat, 4, "origin latitude"),
        (CoordTarget::OriginLon, 3, "origin longitude"),
        (CoordTarget::DestLat, 6, "destination latitude"),
        (CoordTarget::DestLon, 5, "destination longitude"),
    ] {
        let coord = coord_fields(column(record, col)?, target);
        if coord.len() != 3 {
            error!("file {number:04}: {label} is incomplete");
        }
        values.extend(coord);
    }

    let code = parse_i64(record, 22)?;
    values.extend(band_checkbox(code));
    values.extend(antenna_checkbox(code, column(record, 12)?));

    values.set("Texto26", column(record, 11)?.trim()); // height above sea level, origin
    values.set("Texto27", column(record, 8)?.trim()); // origin site address
    values.set("Texto28", column(record, 11)?.trim()); // height above sea level, destination
    values.set("Texto37", column(record, 9)?); // destination site address
    values.set("Texto39", column(record, 13)?.trim()); // equipment brand
    values.set("Texto40", column(record, 10)?.trim()); // equipment model

    Ok(FormRow { number, values })
}

fn column<'a>(record: &'a StringRecord, index: usize) -> Result<&'a str, FormError> {
    record.get(index).ok_or(FormError::MissingColumn { index })
}

fn parse_u32(record: &StringRecord, index: usize) -> Result<u32, FormError> {
    let raw = column(record, index)?;
    raw.trim().parse().map_err(|_| FormError::InvalidNumber {
        column: index,
        value: raw.to_string(),
    })
}

fn parse_i64(record: &StringRecord, index: usize) -> Result<i64, FormError> {
    let raw = column(record, index)?;
    raw.trim().parse().map_err(|_| FormError::InvalidNumber {
        column: index,
        value: raw.to_string(),
    })
}
