//! Centralized number and duration formatting.
//!
//! Stat cells are formatted by truncation rather than rounding so a 1.99
//! FKDR never displays as the 2.00 the player has not earned yet. All
//! display formatting goes through this module so the table and any
//! future front-end agree.

/// Format `number` with `precision` decimals, rounding towards zero.
///
/// Formats with ten extra digits and cuts them off, which truncates the
/// printed value instead of rounding it. Non-finite values format as-is.
///
/// # Examples
/// ```
/// use spyglass_types::formatting::truncate_float;
/// assert_eq!(truncate_float(1.999, 2), "1.99");
/// assert_eq!(truncate_float(27.0, 1), "27.0");
/// assert_eq!(truncate_float(3.25, 0), "3");
/// ```
pub fn truncate_float(number: f64, precision: usize) -> String {
    if !number.is_finite() {
        return number.to_string();
    }
    if precision == 0 {
        return format!("{}", number.trunc() as i64);
    }
    let padded = format!("{:.*}", precision + 10, number);
    padded[..padded.len() - 10].to_string()
}

/// A numeric cell value: raw counts stay integers, ratios are floats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    Int(i64),
    Float(f64),
}

/// Format a stat cell value: integers as-is, floats truncated.
///
/// # Examples
/// ```
/// use spyglass_types::formatting::{truncate_float_or_int, CellValue};
/// assert_eq!(truncate_float_or_int(CellValue::Int(123), 2), "123");
/// assert_eq!(truncate_float_or_int(CellValue::Float(1.999), 2), "1.99");
/// ```
pub fn truncate_float_or_int(value: CellValue, decimals: usize) -> String {
    match value {
        CellValue::Int(n) => n.to_string(),
        CellValue::Float(f) => truncate_float(f, decimals),
    }
}

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const YEAR: f64 = 12.0 * 30.0 * DAY;

/// Format an elapsed time compactly with a single-letter unit.
///
/// Durations under a minute all display as `<1m`; anything longer picks
/// the largest fitting unit out of minutes, hours, days and years.
///
/// # Examples
/// ```
/// use spyglass_types::formatting::format_seconds_short;
/// assert_eq!(format_seconds_short(59.0, 0), "<1m");
/// assert_eq!(format_seconds_short(150.0, 0), "2m");
/// assert_eq!(format_seconds_short(5400.0, 1), "1.5h");
/// assert_eq!(format_seconds_short(200_000.0, 0), "2d");
/// ```
pub fn format_seconds_short(seconds: f64, decimals: usize) -> String {
    if seconds < MINUTE {
        return "<1m".to_string();
    }

    let (denomination, abbreviation) = [(YEAR, "y"), (DAY, "d"), (HOUR, "h")]
        .into_iter()
        .find(|(denomination, _)| seconds / denomination >= 1.0)
        .unwrap_or((MINUTE, "m"));

    format!(
        "{}{}",
        truncate_float(seconds / denomination, decimals),
        abbreviation
    )
}
