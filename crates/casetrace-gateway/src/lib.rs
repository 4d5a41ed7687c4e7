// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP clients for the Casetrace hosted backend.
//!
//! The hosted backend exposes two surfaces consumed here:
//!
//! - a session-based auth API ([`AuthClient`])
//! - a REST row interface over the investigations table ([`RecordsClient`])
//!
//! Both implement the gateway traits from `casetrace-core`, so the stores
//! never depend on this crate directly.

pub mod auth;
pub mod records;
pub mod wire;

pub use auth::AuthClient;
pub use records::RecordsClient;
