// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Casetrace integration tests.
//!
//! Provides mock gateways and fixture builders for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockAuthGateway`] - scripted auth gateway with call counters
//! - [`MockRecordsGateway`] - in-memory investigations table
//! - [`fixtures`] - builders for users, sessions, and records

pub mod fixtures;
pub mod mock_auth;
pub mod mock_records;

pub use fixtures::{test_record, test_session, test_user};
pub use mock_auth::MockAuthGateway;
pub use mock_records::MockRecordsGateway;
