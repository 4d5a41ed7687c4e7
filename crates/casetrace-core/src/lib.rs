// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Casetrace client data layer.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Casetrace workspace. The gateway client
//! and the demo gateway both implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CasetraceError;
pub use types::{
    AuthEvent, AuthSession, AuthUser, HealthStatus, Investigation, InvestigationDraft,
    InvestigationId, InvestigationKind, InvestigationPatch, InvestigationStatus,
    NewInvestigation, UserId,
};

pub use traits::{AuthGateway, GatewayAdapter, RecordsGateway};
