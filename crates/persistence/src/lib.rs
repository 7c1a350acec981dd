// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the EiDiV fire-department records service.
//!
//! This crate stores master data, incidents, duties, operators and sessions
//! in `SQLite` through Diesel. Migrations are embedded and applied when a
//! database is opened.
//!
//! ## Event numbering
//!
//! Incidents and duties carry a `(year, seq)` number that is unique per
//! event kind. `record_incident` and `record_duty` allocate the number and
//! insert the event in one `BEGIN IMMEDIATE` transaction, so concurrent
//! writers (threads or processes sharing the database file) queue on the
//! `SQLite` write lock instead of reading the same maximum.
//!
//! ## Referential integrity
//!
//! Foreign keys are enforced (`PRAGMA foreign_keys = ON` is verified at
//! startup). Master data that an event references cannot be deleted;
//! deletes report `PersistenceError::Referenced`.
//!
//! ## Testing Philosophy
//!
//! - Unit tests run against isolated in-memory databases
//! - Concurrency tests use a temporary database file shared by several
//!   connections

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use eidiv_domain::{
    Container, DutyDraft, DutyReport, DutySummary, EventKind, EventNumber, IncidentDraft,
    IncidentReport, IncidentSummary, Keyword, KeywordCategory, LookupEntry, LookupKind,
    MailRecipient, MasterData, Member, NumberedEvent, NumberingPolicy, Trailer, Vehicle,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::sqlite::BUSY_TIMEOUT_MS;
pub use data_models::{EventFilter, OperatorData, Page, RecordedEvent, SessionData};
pub use error::PersistenceError;
pub use mutations::operators::stored_timestamp;

use backend::PersistenceBackend;

/// Persistence adapter owning one `SQLite` connection.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_eidiv_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// Several adapters may open the same file; writers serialize on the
    /// database lock with a busy timeout of `BUSY_TIMEOUT_MS`.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Numbers and stores an incident atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is stored in that case.
    pub fn record_incident(
        &mut self,
        draft: &mut IncidentDraft,
        policy: &NumberingPolicy,
    ) -> Result<RecordedEvent, PersistenceError> {
        mutations::events::record_incident(&mut self.conn, draft, policy)
    }

    /// Numbers and stores a duty atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is stored in that case.
    pub fn record_duty(
        &mut self,
        draft: &mut DutyDraft,
        policy: &NumberingPolicy,
    ) -> Result<RecordedEvent, PersistenceError> {
        mutations::events::record_duty(&mut self.conn, draft, policy)
    }

    /// Assigns the next free number to `event` without storing it.
    ///
    /// The number is not reserved: until a row with it is inserted, the next
    /// allocation hands out the same value. Events that already carry a
    /// number keep it.
    ///
    /// # Errors
    ///
    /// Returns an error if the year cannot be determined or the query fails.
    pub fn assign_event_number<E: NumberedEvent>(
        &mut self,
        event: &mut E,
        policy: &NumberingPolicy,
    ) -> Result<EventNumber, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::sequence::assign_event_number(conn, event, policy, OffsetDateTime::now_utc())
        })
    }

    /// Returns the highest seq stored for `kind` in `year`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn current_max_seq(
        &mut self,
        kind: EventKind,
        year: u16,
    ) -> Result<Option<u32>, PersistenceError> {
        mutations::sequence::current_max_seq(&mut self.conn, kind, year)
    }

    /// Loads the report projection of an incident.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_incident_report(
        &mut self,
        incident_id: i64,
    ) -> Result<Option<IncidentReport>, PersistenceError> {
        queries::events::get_incident_report(&mut self.conn, incident_id)
    }

    /// Loads the report projection of a duty.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_duty_report(
        &mut self,
        duty_id: i64,
    ) -> Result<Option<DutyReport>, PersistenceError> {
        queries::events::get_duty_report(&mut self.conn, duty_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_incidents(
        &mut self,
        filter: &EventFilter,
    ) -> Result<Page<IncidentSummary>, PersistenceError> {
        queries::events::list_incidents(&mut self.conn, filter)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_duties(
        &mut self,
        filter: &EventFilter,
    ) -> Result<Page<DutySummary>, PersistenceError> {
        queries::events::list_duties(&mut self.conn, filter)
    }

    // ========================================================================
    // Master Data
    // ========================================================================

    /// Loads all master data for validating a submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn load_master_data(&mut self) -> Result<MasterData, PersistenceError> {
        queries::master_data::load_master_data(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_members(&mut self) -> Result<Vec<Member>, PersistenceError> {
        queries::master_data::list_members(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_member(&mut self, member_id: i64) -> Result<Option<Member>, PersistenceError> {
        queries::master_data::get_member(&mut self.conn, member_id)
    }

    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_member(&mut self, member: &Member) -> Result<i64, PersistenceError> {
        mutations::master_data::create_member(&mut self.conn, member)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the member does not exist.
    pub fn update_member(
        &mut self,
        member_id: i64,
        member: &Member,
    ) -> Result<(), PersistenceError> {
        mutations::master_data::update_member(&mut self.conn, member_id, member)
    }

    /// # Errors
    ///
    /// Returns `Referenced` if the member attended an event.
    pub fn delete_member(&mut self, member_id: i64) -> Result<(), PersistenceError> {
        mutations::master_data::delete_member(&mut self.conn, member_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_vehicles(&mut self) -> Result<Vec<Vehicle>, PersistenceError> {
        queries::master_data::list_vehicles(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_vehicle(&mut self, vehicle: &Vehicle) -> Result<i64, PersistenceError> {
        mutations::master_data::create_vehicle(&mut self.conn, vehicle)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the vehicle does not exist.
    pub fn update_vehicle(
        &mut self,
        vehicle_id: i64,
        vehicle: &Vehicle,
    ) -> Result<(), PersistenceError> {
        mutations::master_data::update_vehicle(&mut self.conn, vehicle_id, vehicle)
    }

    /// # Errors
    ///
    /// Returns `Referenced` if an event uses the vehicle.
    pub fn delete_vehicle(&mut self, vehicle_id: i64) -> Result<(), PersistenceError> {
        mutations::master_data::delete_vehicle(&mut self.conn, vehicle_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_containers(&mut self) -> Result<Vec<Container>, PersistenceError> {
        queries::master_data::list_containers(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_container(&mut self, container: &Container) -> Result<i64, PersistenceError> {
        mutations::master_data::create_container(&mut self.conn, container)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the container does not exist.
    pub fn update_container(
        &mut self,
        container_id: i64,
        container: &Container,
    ) -> Result<(), PersistenceError> {
        mutations::master_data::update_container(&mut self.conn, container_id, container)
    }

    /// # Errors
    ///
    /// Returns `Referenced` if an event uses the container.
    pub fn delete_container(&mut self, container_id: i64) -> Result<(), PersistenceError> {
        mutations::master_data::delete_container(&mut self.conn, container_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_trailers(&mut self) -> Result<Vec<Trailer>, PersistenceError> {
        queries::master_data::list_trailers(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_trailer(&mut self, trailer: &Trailer) -> Result<i64, PersistenceError> {
        mutations::master_data::create_trailer(&mut self.conn, trailer)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the trailer does not exist.
    pub fn update_trailer(
        &mut self,
        trailer_id: i64,
        trailer: &Trailer,
    ) -> Result<(), PersistenceError> {
        mutations::master_data::update_trailer(&mut self.conn, trailer_id, trailer)
    }

    /// # Errors
    ///
    /// Returns `Referenced` if an event uses the trailer.
    pub fn delete_trailer(&mut self, trailer_id: i64) -> Result<(), PersistenceError> {
        mutations::master_data::delete_trailer(&mut self.conn, trailer_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_lookup_entries(
        &mut self,
        kind: Option<LookupKind>,
    ) -> Result<Vec<LookupEntry>, PersistenceError> {
        queries::master_data::list_lookup_entries(&mut self.conn, kind)
    }

    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_lookup_entry(&mut self, entry: &LookupEntry) -> Result<i64, PersistenceError> {
        mutations::master_data::create_lookup_entry(&mut self.conn, entry)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no entry of `kind` has the id.
    pub fn update_lookup_entry(
        &mut self,
        kind: LookupKind,
        entry_id: i64,
        label: &str,
    ) -> Result<(), PersistenceError> {
        mutations::master_data::update_lookup_entry(&mut self.conn, kind, entry_id, label)
    }

    /// # Errors
    ///
    /// Returns `Referenced` if an incident join row uses the entry.
    pub fn delete_lookup_entry(
        &mut self,
        kind: LookupKind,
        entry_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::master_data::delete_lookup_entry(&mut self.conn, kind, entry_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_keywords(
        &mut self,
        category: Option<KeywordCategory>,
        active_only: bool,
    ) -> Result<Vec<Keyword>, PersistenceError> {
        queries::master_data::list_keywords(&mut self.conn, category, active_only)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_keyword(&mut self, keyword_id: i64) -> Result<Option<Keyword>, PersistenceError> {
        queries::master_data::get_keyword(&mut self.conn, keyword_id)
    }

    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_keyword(&mut self, keyword: &Keyword) -> Result<i64, PersistenceError> {
        mutations::master_data::create_keyword(&mut self.conn, keyword)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the keyword does not exist.
    pub fn update_keyword(
        &mut self,
        keyword_id: i64,
        keyword: &Keyword,
    ) -> Result<(), PersistenceError> {
        mutations::master_data::update_keyword(&mut self.conn, keyword_id, keyword)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the keyword does not exist.
    pub fn set_keyword_category(
        &mut self,
        keyword_id: i64,
        category: KeywordCategory,
    ) -> Result<(), PersistenceError> {
        mutations::master_data::set_keyword_category(&mut self.conn, keyword_id, category)
    }

    /// # Errors
    ///
    /// Returns `Referenced` if an incident carries the keyword.
    pub fn delete_keyword(&mut self, keyword_id: i64) -> Result<(), PersistenceError> {
        mutations::master_data::delete_keyword(&mut self.conn, keyword_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_recipients(&mut self) -> Result<Vec<MailRecipient>, PersistenceError> {
        queries::master_data::list_recipients(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn active_recipient_emails(&mut self) -> Result<Vec<String>, PersistenceError> {
        queries::master_data::active_recipient_emails(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns `Duplicate` if the address is already listed.
    pub fn create_recipient(&mut self, recipient: &MailRecipient) -> Result<i64, PersistenceError> {
        mutations::master_data::create_recipient(&mut self.conn, recipient)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the recipient does not exist.
    pub fn update_recipient(
        &mut self,
        recipient_id: i64,
        recipient: &MailRecipient,
    ) -> Result<(), PersistenceError> {
        mutations::master_data::update_recipient(&mut self.conn, recipient_id, recipient)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the recipient does not exist.
    pub fn delete_recipient(&mut self, recipient_id: i64) -> Result<(), PersistenceError> {
        mutations::master_data::delete_recipient(&mut self.conn, recipient_id)
    }

    // ========================================================================
    // Operators & Sessions
    // ========================================================================

    /// Creates a new operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the login name already exists.
    pub fn create_operator(
        &mut self,
        login_name: &str,
        display_name: &str,
        password: &str,
        role: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::operators::create_operator(
            &mut self.conn,
            login_name,
            display_name,
            password,
            role,
        )
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_operator_by_login(
        &mut self,
        login_name: &str,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::operators::get_operator_by_login(&mut self.conn, login_name)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_operator_by_id(
        &mut self,
        operator_id: i64,
    ) -> Result<Option<OperatorData>, PersistenceError> {
        queries::operators::get_operator_by_id(&mut self.conn, operator_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_operators(&mut self) -> Result<Vec<OperatorData>, PersistenceError> {
        queries::operators::list_operators(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_active_admin_operators(&mut self) -> Result<i64, PersistenceError> {
        queries::operators::count_active_admin_operators(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_last_login(&mut self, operator_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::update_last_login(&mut self.conn, operator_id)
    }

    /// Disables an operator and deletes their sessions.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the operator does not exist.
    pub fn disable_operator(&mut self, operator_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::disable_operator(&mut self.conn, operator_id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the operator does not exist.
    pub fn enable_operator(&mut self, operator_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::enable_operator(&mut self.conn, operator_id)
    }

    /// # Errors
    ///
    /// Returns an error if hashing or the update fails.
    pub fn update_password(
        &mut self,
        operator_id: i64,
        new_password: &str,
    ) -> Result<(), PersistenceError> {
        mutations::operators::update_password(&mut self.conn, operator_id, new_password)
    }

    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn create_session(
        &mut self,
        session_token: &str,
        operator_id: i64,
        expires_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::operators::create_session(&mut self.conn, session_token, operator_id, expires_at)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::operators::get_session_by_token(&mut self.conn, session_token)
    }

    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::operators::update_session_activity(&mut self.conn, session_id)
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        mutations::operators::delete_session(&mut self.conn, session_token)
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(
        &mut self,
        now: OffsetDateTime,
    ) -> Result<usize, PersistenceError> {
        mutations::operators::delete_expired_sessions(&mut self.conn, now)
    }

    /// Verifies a password against a stored bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is malformed.
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
        queries::operators::verify_password(password, password_hash)
    }
}
