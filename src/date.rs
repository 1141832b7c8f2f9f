//! Spreadsheet date serials.
//!
//! Serials count days since 1899-12-30. Conversion goes through the Unix
//! epoch (serial 25569) and keeps only the whole day, so a serial always
//! lands on UTC midnight.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{InventoryError, Result};

/// Days between the spreadsheet epoch and 1970-01-01.
pub const UNIX_EPOCH_SERIAL: f64 = 25569.0;

const SECONDS_PER_DAY: i64 = 86_400;
const MILLIS_PER_DAY: i64 = SECONDS_PER_DAY * 1000;

/// Convert a spreadsheet date serial to a UTC calendar instant.
///
/// Fractional serials are floored (time of day is dropped). Serials at or
/// below zero are accepted and give pre-epoch dates. Non-finite serials and
/// serials outside chrono's range fail with `InvalidDateInput`.
pub fn to_calendar_date(serial: f64) -> Result<DateTime<Utc>> {
    if !serial.is_finite() {
        return Err(InventoryError::InvalidDateInput(format!(
            "serial {serial} is not a finite number"
        )));
    }

    let days = (serial - UNIX_EPOCH_SERIAL).floor();
    if days.abs() > (i64::MAX / SECONDS_PER_DAY) as f64 {
        return Err(out_of_range(serial));
    }

    (days as i64)
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| out_of_range(serial))
}

/// Parse raw cell text into a serial. Blank or non-numeric text is rejected.
pub fn parse_serial(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let serial: f64 = trimmed.parse().map_err(|_| {
        InventoryError::InvalidDateInput(format!("'{trimmed}' is not a date serial"))
    })?;
    if !serial.is_finite() {
        return Err(InventoryError::InvalidDateInput(format!(
            "'{trimmed}' is not a finite date serial"
        )));
    }
    Ok(serial)
}

/// Whole days from `from` to `to`, rounded toward negative infinity.
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Calendar day of a serial, for date-range comparisons and display.
pub fn to_naive_date(serial: f64) -> Result<NaiveDate> {
    Ok(to_calendar_date(serial)?.date_naive())
}

fn out_of_range(serial: f64) -> InventoryError {
    InventoryError::InvalidDateInput(format!("serial {serial} is outside the calendar range"))
}
