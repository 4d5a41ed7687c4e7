// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Investigation-record store: scoped CRUD over the hosted table with a
//! local cache, per-operation status slots, and session-gated writes.

pub mod status;
pub mod store;

pub use status::{OpKind, OpStatus, OpStatuses};
pub use store::InvestigationStore;
