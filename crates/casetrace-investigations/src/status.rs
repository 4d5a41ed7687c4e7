// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-operation status slots.
//!
//! Each operation kind owns its own slot, so two in-flight operations can
//! never clobber each other's pending/error state. Screens that want
//! passive error display read the slot for the operation they issued.

use std::collections::HashMap;

use strum::Display;

/// The four operations exposed by the investigation store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum OpKind {
    Create,
    List,
    Load,
    Update,
}

/// Status of the most recent call of a given operation kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OpStatus {
    /// No call in flight; the last one (if any) succeeded.
    #[default]
    Idle,
    /// A call is in flight.
    Pending,
    /// The last call failed with this message.
    Failed(String),
}

/// Status slots keyed by operation kind.
#[derive(Debug, Default)]
pub struct OpStatuses {
    slots: HashMap<OpKind, OpStatus>,
}

impl OpStatuses {
    pub fn get(&self, kind: OpKind) -> OpStatus {
        self.slots.get(&kind).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, kind: OpKind, status: OpStatus) {
        self.slots.insert(kind, status);
    }
}
