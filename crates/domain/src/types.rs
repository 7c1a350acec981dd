// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A member of the fire department.
///
/// Members appear on attendance rosters and may lead incidents.
/// `member_id` is `None` until the member has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: Option<i64>,
    pub last_name: String,
    pub first_name: String,
    /// Qualified breathing-apparatus wearer (AGT).
    pub agt_qualified: bool,
    /// Full-time (hauptamtlich) member.
    pub full_time: bool,
    pub commander: bool,
    pub deputy_commander: bool,
}

impl Member {
    /// Creates a new, unpersisted member with all flags cleared.
    #[must_use]
    pub fn new(last_name: &str, first_name: &str) -> Self {
        Self {
            member_id: None,
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            agt_qualified: false,
            full_time: false,
            commander: false,
            deputy_commander: false,
        }
    }

    /// Returns `"Last, First"` as printed on rosters.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// A vehicle of the department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: Option<i64>,
    /// Vehicle type, e.g. `HLF 20`.
    pub vehicle_type: String,
    /// Radio call sign (Funkrufname).
    pub call_sign: String,
    pub registration: String,
}

/// A roll-off container (Abrollbehälter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub container_id: Option<i64>,
    pub container_type: String,
}

/// A trailer (Anhänger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trailer {
    pub trailer_id: Option<i64>,
    pub trailer_type: String,
    pub registration: String,
}

/// The fixed set of simple lookup tables.
///
/// Each kind is a flat list of labels referenced by incidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    /// Zusatzstelle
    AdditionalAgency,
    /// Einsatzmittel
    Resource,
    /// Meldende Stelle
    ReportingAgency,
    /// Brandumfang
    FireExtent,
    /// Brandausbreitung
    FireSpread,
    /// Brandgut
    FireMaterial,
    /// Brandobjekt
    FireObject,
    /// Löschwasserentnahmestelle
    WaterSource,
    /// Schadensereignis
    DamageEvent,
    /// Art der Personenrettung
    RescueType,
    /// Sicherheitswache
    Standby,
    /// Fehlalarm
    FalseAlarm,
    /// Sonstige
    Other,
    /// Ortsfeuerwehr
    LocalBrigade,
}

impl LookupKind {
    /// Every lookup kind, in display order.
    pub const ALL: [Self; 14] = [
        Self::AdditionalAgency,
        Self::Resource,
        Self::ReportingAgency,
        Self::FireExtent,
        Self::FireSpread,
        Self::FireMaterial,
        Self::FireObject,
        Self::WaterSource,
        Self::DamageEvent,
        Self::RescueType,
        Self::Standby,
        Self::FalseAlarm,
        Self::Other,
        Self::LocalBrigade,
    ];

    /// Parses a lookup kind from its stored identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not name a lookup kind.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::UnknownLookupKind(s.to_string()))
    }

    /// Returns the stored identifier of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AdditionalAgency => "additional_agency",
            Self::Resource => "resource",
            Self::ReportingAgency => "reporting_agency",
            Self::FireExtent => "fire_extent",
            Self::FireSpread => "fire_spread",
            Self::FireMaterial => "fire_material",
            Self::FireObject => "fire_object",
            Self::WaterSource => "water_source",
            Self::DamageEvent => "damage_event",
            Self::RescueType => "rescue_type",
            Self::Standby => "standby",
            Self::FalseAlarm => "false_alarm",
            Self::Other => "other",
            Self::LocalBrigade => "local_brigade",
        }
    }
}

/// An entry of one of the simple lookup tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub entry_id: Option<i64>,
    pub kind: LookupKind,
    pub label: String,
}

/// Category of a dispatch keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    /// Fire
    Brand,
    /// Technical assistance
    Thl,
    /// Hazardous materials
    Abc,
    Info,
    #[default]
    Sonstig,
}

impl KeywordCategory {
    /// Parses a category from its stored identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not name a category.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "brand" => Ok(Self::Brand),
            "thl" => Ok(Self::Thl),
            "abc" => Ok(Self::Abc),
            "info" => Ok(Self::Info),
            "sonstig" => Ok(Self::Sonstig),
            _ => Err(DomainError::UnknownKeywordCategory(s.to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Thl => "thl",
            Self::Abc => "abc",
            Self::Info => "info",
            Self::Sonstig => "sonstig",
        }
    }

    /// Human-readable label used in reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Brand => "Brand",
            Self::Thl => "Technische Hilfeleistung",
            Self::Abc => "ABC",
            Self::Info => "Info",
            Self::Sonstig => "Sonstiges",
        }
    }
}

/// A dispatch keyword (Einsatzstichwort).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub keyword_id: Option<i64>,
    pub code: String,
    pub label: String,
    pub active: bool,
    pub category: KeywordCategory,
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, self.label)
    }
}

/// An address on the report distribution list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailRecipient {
    pub recipient_id: Option<i64>,
    pub email: String,
    pub active: bool,
}

/// Role of the person recorded as involved party of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyType {
    /// Geschädigter
    Geschaedigter,
    /// Kostenträger
    Kostentraeger,
    /// Eigentümer
    Eigentuemer,
    /// Verursacher
    Verursacher,
}

impl PartyType {
    /// Parses a party type from its stored identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not name a party type.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "geschaedigter" => Ok(Self::Geschaedigter),
            "kostentraeger" => Ok(Self::Kostentraeger),
            "eigentuemer" => Ok(Self::Eigentuemer),
            "verursacher" => Ok(Self::Verursacher),
            _ => Err(DomainError::UnknownPartyType(s.to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Geschaedigter => "geschaedigter",
            Self::Kostentraeger => "kostentraeger",
            Self::Eigentuemer => "eigentuemer",
            Self::Verursacher => "verursacher",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Geschaedigter => "Geschädigter",
            Self::Kostentraeger => "Kostenträger",
            Self::Eigentuemer => "Eigentümer",
            Self::Verursacher => "Verursacher",
        }
    }
}
