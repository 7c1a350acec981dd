// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversions between stored UTC instants and department-local time.
//!
//! Instants are stored and exchanged as `time::OffsetDateTime`. The
//! department time zone is a `chrono_tz::Tz`; `chrono` is only used at this
//! boundary to resolve calendar years, local wall-clock input and printed
//! timestamps.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::DomainError;

/// Wall-clock formats accepted in addition to RFC 3339.
///
/// These match what HTML `datetime-local` inputs submit.
const LOCAL_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Resolves a time zone by its IANA name.
///
/// # Errors
///
/// Returns an error if the name is not a known time zone.
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|_| DomainError::UnknownTimezone(name.to_string()))
}

fn to_chrono(instant: OffsetDateTime) -> Result<DateTime<Utc>, DomainError> {
    DateTime::<Utc>::from_timestamp(instant.unix_timestamp(), instant.nanosecond()).ok_or_else(
        || DomainError::InvalidTimestamp(format!("{instant} is outside the supported range")),
    )
}

/// Returns the calendar year of `instant` in the time zone `tz`.
///
/// # Errors
///
/// Returns an error if the instant cannot be represented or its year does
/// not fit a `u16`.
pub fn local_year(instant: OffsetDateTime, tz: Tz) -> Result<u16, DomainError> {
    let year: i32 = to_chrono(instant)?.with_timezone(&tz).year();
    u16::try_from(year)
        .map_err(|_| DomainError::InvalidTimestamp(format!("year {year} is out of range")))
}

/// Formats `instant` as `dd.mm.yyyy HH:MM` in the time zone `tz`.
#[must_use]
pub fn format_local(instant: OffsetDateTime, tz: Tz) -> String {
    to_chrono(instant).map_or_else(
        |_| instant.to_string(),
        |utc| utc.with_timezone(&tz).format("%d.%m.%Y %H:%M").to_string(),
    )
}

/// Parses a submitted timestamp.
///
/// RFC 3339 input carries its own offset. Input without an offset
/// (`2025-03-01T14:30`) is interpreted as wall-clock time in `tz`; for an
/// ambiguous local time the earlier instant wins.
///
/// # Errors
///
/// Returns an error if the input matches no accepted format or names a
/// local time that does not exist in `tz`.
pub fn parse_timestamp(input: &str, tz: Tz) -> Result<OffsetDateTime, DomainError> {
    let input: &str = input.trim();
    if let Ok(instant) = OffsetDateTime::parse(input, &Rfc3339) {
        return Ok(instant);
    }

    let naive: NaiveDateTime = LOCAL_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .ok_or_else(|| DomainError::InvalidTimestamp(format!("unrecognized format: {input}")))?;

    let local = tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        DomainError::InvalidTimestamp(format!("{input} does not exist in {}", tz.name()))
    })?;

    OffsetDateTime::from_unix_timestamp(local.timestamp())
        .map_err(|e| DomainError::InvalidTimestamp(e.to_string()))
}

/// Formats an instant as RFC 3339 in UTC, the stored representation.
///
/// # Errors
///
/// Returns an error if the instant cannot be formatted.
pub fn to_rfc3339(instant: OffsetDateTime) -> Result<String, DomainError> {
    instant
        .to_offset(time::UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| DomainError::InvalidTimestamp(e.to_string()))
}
