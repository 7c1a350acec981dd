// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Event kinds and their per-year reference numbers.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::clock::local_year;
use crate::error::DomainError;

/// The two kinds of numbered events.
///
/// Each kind has its own number range per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Operational response (Einsatz).
    Incident,
    /// Training or duty session (Dienst).
    Duty,
}

impl EventKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Incident => "incident",
            Self::Duty => "duty",
        }
    }

    /// German label used in reports, mails and file names.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Incident => "Einsatz",
            Self::Duty => "Dienst",
        }
    }
}

/// The `(year, seq)` identity of an event.
///
/// `seq` starts at 1 in every year and is formatted as `"{seq:03}/{year}"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EventNumber {
    year: u16,
    seq: u32,
}

impl EventNumber {
    /// Lowest accepted year.
    pub const MIN_YEAR: u16 = 1900;
    /// Highest accepted year.
    pub const MAX_YEAR: u16 = 9999;

    /// Creates an event number.
    ///
    /// # Errors
    ///
    /// Returns an error if `seq` is zero or `year` is outside
    /// `MIN_YEAR..=MAX_YEAR`.
    pub fn new(year: u16, seq: u32) -> Result<Self, DomainError> {
        // Rule: seq is a positive integer
        if seq == 0 {
            return Err(DomainError::InvalidEventNumber(String::from(
                "sequence numbers start at 1",
            )));
        }
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(DomainError::InvalidEventNumber(format!(
                "year {year} is out of range"
            )));
        }
        Ok(Self { year, seq })
    }

    /// Returns the number following `current_max` within `year`.
    ///
    /// `None` means no event of that year exists yet and yields seq 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the year is out of range or the sequence would
    /// overflow.
    pub fn following(year: u16, current_max: Option<u32>) -> Result<Self, DomainError> {
        let seq: u32 = match current_max {
            None => 1,
            Some(max) => max.checked_add(1).ok_or_else(|| {
                DomainError::InvalidEventNumber(format!("sequence for {year} is exhausted"))
            })?,
        };
        Self::new(year, seq)
    }

    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    #[must_use]
    pub const fn seq(&self) -> u32 {
        self.seq
    }

    /// Returns the human-readable reference, e.g. `007/2025`.
    #[must_use]
    pub fn formatted(&self) -> String {
        format!("{:03}/{}", self.seq, self.year)
    }
}

impl std::fmt::Display for EventNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}/{}", self.seq, self.year)
    }
}

/// Which timestamp determines the year of a new event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearBasis {
    /// The event start time, falling back to the submission time.
    #[default]
    Start,
    /// The wall-clock time of the submission.
    Submission,
}

/// Determines the numbering year of new events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingPolicy {
    pub timezone: Tz,
    pub basis: YearBasis,
}

impl NumberingPolicy {
    #[must_use]
    pub const fn new(timezone: Tz, basis: YearBasis) -> Self {
        Self { timezone, basis }
    }

    /// Returns the numbering year for an event.
    ///
    /// # Arguments
    ///
    /// * `start_at` - The event start time, if known
    /// * `now` - The current wall-clock time
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen instant has no representable year.
    pub fn year_for(
        &self,
        start_at: Option<OffsetDateTime>,
        now: OffsetDateTime,
    ) -> Result<u16, DomainError> {
        let basis: OffsetDateTime = match self.basis {
            YearBasis::Start => start_at.unwrap_or(now),
            YearBasis::Submission => now,
        };
        local_year(basis, self.timezone)
    }
}

impl Default for NumberingPolicy {
    fn default() -> Self {
        Self::new(chrono_tz::Europe::Berlin, YearBasis::Start)
    }
}

/// An event that receives a per-year reference number before it is stored.
pub trait NumberedEvent {
    /// The number range this event draws from.
    const KIND: EventKind;

    /// The assigned number, if any.
    fn number(&self) -> Option<EventNumber>;

    /// Stores the allocated number on the event.
    fn assign_number(&mut self, number: EventNumber);

    /// The timestamp the numbering year is derived from, if the event has one.
    fn year_basis(&self) -> Option<OffsetDateTime>;
}
