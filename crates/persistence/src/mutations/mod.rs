// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations of the persistence layer.
//!
//! ## Module Organization
//!
//! - `sequence`: Per-year number allocation for incidents and duties
//! - `events`: Recording of incidents and duties with their join rows
//! - `master_data`: Members, equipment, lookups, keywords and recipients
//! - `operators`: Operator and session mutations
//!
//! Backend-specific helpers (e.g., `get_last_insert_rowid()`) are reached
//! through the `PersistenceBackend` trait. All other code uses Diesel DSL.

pub mod events;
pub mod master_data;
pub mod operators;
pub mod sequence;
