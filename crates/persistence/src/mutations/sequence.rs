// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-year sequence allocation for event numbers.
//!
//! The allocator reads `MAX(seq)` for the event kind and year and hands out
//! the next value. It is only correct while the caller holds the database
//! write lock, i.e. inside `SqliteConnection::immediate_transaction`, and
//! inserts the event row in that same transaction. A competing writer then
//! blocks on `BEGIN IMMEDIATE` until the first transaction ends and observes
//! the committed maximum. A rolled-back transaction leaves a gap; the
//! allocated value is never handed out twice.

use diesel::SqliteConnection;
use diesel::dsl::max;
use diesel::prelude::*;
use eidiv_domain::{EventKind, EventNumber, NumberedEvent, NumberingPolicy};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::diesel_schema::{duties, incidents};
use crate::error::PersistenceError;

/// Returns the highest stored seq of `kind` in `year`, or `None` if the year
/// has no events yet.
///
/// # Errors
///
/// Returns an error if the query fails or a stored seq is negative.
pub fn current_max_seq(
    conn: &mut SqliteConnection,
    kind: EventKind,
    year: u16,
) -> Result<Option<u32>, PersistenceError> {
    let year: i32 = i32::from(year);

    let max_seq: Option<i32> = match kind {
        EventKind::Incident => incidents::table
            .filter(incidents::year.eq(year))
            .select(max(incidents::seq))
            .get_result(conn)?,
        EventKind::Duty => duties::table
            .filter(duties::year.eq(year))
            .select(max(duties::seq))
            .get_result(conn)?,
    };

    max_seq
        .map(|seq| {
            u32::try_from(seq)
                .map_err(|_| PersistenceError::InvalidData(format!("negative sequence {seq}")))
        })
        .transpose()
}

/// Assigns the next free number to `event` unless it already carries one.
///
/// An event that already has a number keeps it unchanged.
///
/// # Arguments
///
/// * `conn` - A connection inside an immediate transaction
/// * `event` - The event to number
/// * `policy` - Determines the numbering year
/// * `now` - Wall-clock time, used when the event has no start time
///
/// # Errors
///
/// Returns an error if the year cannot be determined, the query fails, or
/// the year's sequence is exhausted.
pub fn assign_event_number<E: NumberedEvent>(
    conn: &mut SqliteConnection,
    event: &mut E,
    policy: &NumberingPolicy,
    now: OffsetDateTime,
) -> Result<EventNumber, PersistenceError> {
    if let Some(number) = event.number() {
        debug!("{} already numbered {}, keeping it", E::KIND.as_str(), number);
        return Ok(number);
    }

    let year: u16 = policy.year_for(event.year_basis(), now)?;
    let current: Option<u32> = current_max_seq(conn, E::KIND, year)?;
    let number: EventNumber = EventNumber::following(year, current)?;

    event.assign_number(number);

    info!("Allocated {} number {}", E::KIND.as_str(), number);
    Ok(number)
}

/// Converts a number to its stored `(year, seq)` column values.
///
/// # Errors
///
/// Returns an error if `seq` does not fit the column type.
pub(crate) fn to_columns(number: EventNumber) -> Result<(i32, i32), PersistenceError> {
    let seq: i32 = i32::try_from(number.seq())
        .map_err(|_| PersistenceError::InvalidData(format!("sequence {number} too large")))?;
    Ok((i32::from(number.year()), seq))
}

/// Rebuilds a number from stored column values.
///
/// # Errors
///
/// Returns an error if the stored values are out of range.
pub(crate) fn from_columns(year: i32, seq: i32) -> Result<EventNumber, PersistenceError> {
    let year: u16 = u16::try_from(year)
        .map_err(|_| PersistenceError::InvalidData(format!("stored year {year} out of range")))?;
    let seq: u32 = u32::try_from(seq)
        .map_err(|_| PersistenceError::InvalidData(format!("stored seq {seq} out of range")))?;
    Ok(EventNumber::new(year, seq)?)
}
