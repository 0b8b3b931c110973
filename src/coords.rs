//! Degrees/minutes/seconds coordinate splitting
//!
//! The form template stores each coordinate as three separate text fields
//! (degrees, minutes, seconds). Input coordinates arrive as human-readable
//! strings such as `85°53'48"O`; this module pulls out the numeric
//! magnitudes in order and pairs them with the right field names.

use crate::fields::FieldValues;
use once_cell::sync::Lazy;
use regex::Regex;

/// Which coordinate slot of the form a value belongs to.
///
/// The template has four slots, one per link endpoint and axis. Note that
/// the destination slots number their fields right-to-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordTarget {
    /// Latitude of the origin point
    OriginLat,
    /// Longitude of the origin point
    OriginLon,
    /// Latitude of the destination point
    DestLat,
    /// Longitude of the destination point
    DestLon,
}

impl CoordTarget {
    /// Field names receiving degrees, minutes and seconds, in that order.
    pub fn field_names(self) -> [&'static str; 3] {
        match self {
            CoordTarget::OriginLat => ["Texto19", "Texto20", "Texto21"],
            CoordTarget::OriginLon => ["Texto22", "Texto23", "Texto24"],
            CoordTarget::DestLat => ["Texto35", "Texto34", "Texto33"],
            CoordTarget::DestLon => ["Texto32", "Texto31", "Texto30"],
        }
    }
}

/// Extracts the numeric components of a coordinate string, in order.
///
/// Hemisphere letters and the degree/minute/second symbols are discarded;
/// decimal components are kept whole. No count validation happens here;
/// callers check the component count after the fact.
///
/// ```
/// use antenna_forms::coord_components;
/// assert_eq!(coord_components("85°53'48\"O"), vec!["85", "53", "48"]);
/// ```
pub fn coord_components(raw: &str) -> Vec<String> {
    static COMPONENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

    COMPONENT_RE
        .find_iter(raw.trim())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Builds the field mapping for one coordinate.
///
/// Components are paired with the target's field names in order. A
/// coordinate that yielded fewer than three components produces a partial
/// mapping; the caller decides whether to diagnose that.
pub fn coord_fields(raw: &str, target: CoordTarget) -> FieldValues {
    let mut values = FieldValues::new();
    for (name, component) in target.field_names().iter().zip(coord_components(raw)) {
        values.set(name, component);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_well_formed() {
        assert_eq!(coord_components("85°53'48\"O"), vec!["85", "53", "48"]);
        assert_eq!(coord_components("  9°56'7\"N  "), vec!["9", "56", "7"]);
    }

    #[test]
    fn test_components_decimal_seconds() {
        assert_eq!(
            coord_components("85°53'48.25\"O"),
            vec!["85", "53", "48.25"]
        );
    }

    #[test]
    fn test_components_garbage() {
        assert!(coord_components("").is_empty());
        assert!(coord_components("N/A").is_empty());
        assert_eq!(coord_components("85°53'"), vec!["85", "53"]);
    }

    #[test]
    fn test_origin_longitude_field_order() {
        let values = coord_fields("85°53'48\"O", CoordTarget::OriginLon);
        assert_eq!(
            values.iter().collect::<Vec<_>>(),
            vec![("Texto22", "85"), ("Texto23", "53"), ("Texto24", "48")]
        );
    }

    #[test]
    fn test_origin_latitude_fields() {
        let values = coord_fields("9°56'7\"N", CoordTarget::OriginLat);
        assert_eq!(values.get("Texto19"), Some("9"));
        assert_eq!(values.get("Texto20"), Some("56"));
        assert_eq!(values.get("Texto21"), Some("7"));
    }

    #[test]
    fn test_destination_fields_count_down() {
        // Destination slots assign degrees to the highest-numbered field.
        let values = coord_fields("10°1'2\"N", CoordTarget::DestLat);
        assert_eq!(values.get("Texto35"), Some("10"));
        assert_eq!(values.get("Texto34"), Some("1"));
        assert_eq!(values.get("Texto33"), Some("2"));

        let values = coord_fields("84°5'6\"O", CoordTarget::DestLon);
        assert_eq!(values.get("Texto32"), Some("84"));
        assert_eq!(values.get("Texto31"), Some("5"));
        assert_eq!(values.get("Texto30"), Some("6"));
    }

    #[test]
    fn test_partial_coordinate_keeps_leading_fields() {
        let values = coord_fields("85°53'", CoordTarget::OriginLon);
        assert_eq!(values.len(), 2);
        assert_eq!(values.get("Texto22"), Some("85"));
        assert_eq!(values.get("Texto23"), Some("53"));
        assert_eq!(values.get("Texto24"), None);
    }
}
