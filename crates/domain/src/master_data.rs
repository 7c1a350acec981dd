// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{Container, Keyword, LookupEntry, Member, Trailer, Vehicle};

/// Snapshot of the reference data an event submission is validated against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterData {
    pub members: Vec<Member>,
    pub vehicles: Vec<Vehicle>,
    pub containers: Vec<Container>,
    pub trailers: Vec<Trailer>,
    pub lookups: Vec<LookupEntry>,
    pub keywords: Vec<Keyword>,
}

impl MasterData {
    #[must_use]
    pub fn member(&self, member_id: i64) -> Option<&Member> {
        self.members
            .iter()
            .find(|member| member.member_id == Some(member_id))
    }

    #[must_use]
    pub fn vehicle(&self, vehicle_id: i64) -> Option<&Vehicle> {
        self.vehicles
            .iter()
            .find(|vehicle| vehicle.vehicle_id == Some(vehicle_id))
    }

    #[must_use]
    pub fn container(&self, container_id: i64) -> Option<&Container> {
        self.containers
            .iter()
            .find(|container| container.container_id == Some(container_id))
    }

    #[must_use]
    pub fn trailer(&self, trailer_id: i64) -> Option<&Trailer> {
        self.trailers
            .iter()
            .find(|trailer| trailer.trailer_id == Some(trailer_id))
    }

    #[must_use]
    pub fn lookup(&self, entry_id: i64) -> Option<&LookupEntry> {
        self.lookups
            .iter()
            .find(|entry| entry.entry_id == Some(entry_id))
    }

    #[must_use]
    pub fn keyword(&self, keyword_id: i64) -> Option<&Keyword> {
        self.keywords
            .iter()
            .find(|keyword| keyword.keyword_id == Some(keyword_id))
    }
}
