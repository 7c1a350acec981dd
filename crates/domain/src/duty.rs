// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Training and duty sessions (Dienst) as submitted for recording.

use time::OffsetDateTime;

use crate::event::{EventKind, EventNumber, NumberedEvent};
use crate::incident::{Attendance, ContainerUsage};

#[derive(Debug, Clone, PartialEq)]
pub struct DutyVehicleUsage {
    pub vehicle_id: i64,
    pub kilometers: Option<i32>,
    pub hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DutyTrailerUsage {
    pub trailer_id: i64,
    pub kilometers: Option<i32>,
    pub hours: Option<f64>,
}

/// A duty session awaiting storage.
#[derive(Debug, Clone, PartialEq)]
pub struct DutyDraft {
    pub number: Option<EventNumber>,
    pub title: String,
    pub start_at: OffsetDateTime,
    pub end_at: OffsetDateTime,
    pub description: String,
    pub vehicles: Vec<DutyVehicleUsage>,
    pub containers: Vec<ContainerUsage>,
    pub trailers: Vec<DutyTrailerUsage>,
    pub attendance: Vec<Attendance>,
}

impl DutyDraft {
    /// Creates a draft with only the required fields set.
    #[must_use]
    pub fn new(title: &str, start_at: OffsetDateTime, end_at: OffsetDateTime) -> Self {
        Self {
            number: None,
            title: title.to_string(),
            start_at,
            end_at,
            description: String::new(),
            vehicles: Vec::new(),
            containers: Vec::new(),
            trailers: Vec::new(),
            attendance: Vec::new(),
        }
    }
}

impl NumberedEvent for DutyDraft {
    const KIND: EventKind = EventKind::Duty;

    fn number(&self) -> Option<EventNumber> {
        self.number
    }

    fn assign_number(&mut self, number: EventNumber) {
        self.number = Some(number);
    }

    fn year_basis(&self) -> Option<OffsetDateTime> {
        Some(self.start_at)
    }
}
