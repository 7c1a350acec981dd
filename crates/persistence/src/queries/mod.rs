// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries of the persistence layer.
//!
//! ## Module Organization
//!
//! - `events`: Report projections and paged event lists
//! - `master_data`: Master data lists, lookups and reference checks
//! - `operators`: Operator and session queries

pub mod events;
pub mod master_data;
pub mod operators;
