//! Wire-format timestamps.
//!
//! The service speaks `YYYYMMDDhhmmss` in civil JST everywhere: program
//! schedules, timeshift query parameters, web URLs.

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Asia::Tokyo;
use chrono_tz::Tz;

use crate::error::Error;

pub const DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Format an instant as a wire timestamp, in JST.
pub fn datetime_string(at: DateTime<Tz>) -> String {
    at.with_timezone(&Tokyo).format(DATETIME_FORMAT).to_string()
}

/// Parse a wire timestamp as a JST instant.
pub fn parse_datetime(value: &str) -> Result<DateTime<Tz>, Error> {
    let naive = NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|_| Error::InvalidDatetime(value.to_owned()))?;
    // JST has no DST, so a civil timestamp always maps to exactly one
    // instant.
    Tokyo
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| Error::InvalidDatetime(value.to_owned()))
}
