//! Locale-independent text formatting shared by every presentation collaborator.

use chrono::NaiveDateTime;
use serde::Serializer;

/// Marker written wherever a level is negative infinity.
pub const UNDEFINED_MARKER: &str = "undefined";
/// Placeholder for metadata that is absent or unreadable.
pub const NOT_AVAILABLE: &str = "N/A";

const INSTRUMENT_TIMESTAMP: &str = "%A, %d %B %Y %H:%M:%S";
const DISPLAY_TIMESTAMP: &str = "%d/%m/%Y %H:%M:%S";

/// Fixed-point text with a decimal comma; non-finite values become [`UNDEFINED_MARKER`].
pub fn decimal_comma(value: f64, places: usize) -> String {
    if !value.is_finite() {
        return UNDEFINED_MARKER.to_string();
    }
    format!("{:.*}", places, value).replace('.', ",")
}

/// Displayed frequencies are shown as whole megahertz.
pub fn whole_mhz(frequency_mhz: f64) -> String {
    format!("{}", frequency_mhz.round() as i64)
}

/// Reformats an instrument timestamp ("Monday, 02 June 2025 14:03:07") as
/// "02/06/2025 14:03:07".
pub fn format_timestamp(raw: Option<&str>) -> String {
    raw.and_then(|value| NaiveDateTime::parse_from_str(value.trim(), INSTRUMENT_TIMESTAMP).ok())
        .map(|parsed| parsed.format(DISPLAY_TIMESTAMP).to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// File-name friendly form of an equipment name.
pub fn file_slug(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}

/// Serializes finite levels as numbers and negative infinity as [`UNDEFINED_MARKER`].
pub fn serialize_level<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_str(UNDEFINED_MARKER)
    }
}
