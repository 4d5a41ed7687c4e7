// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway adapter trait definitions.
//!
//! Both gateway surfaces extend the [`GatewayAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod auth;
pub mod records;

pub use adapter::GatewayAdapter;
pub use auth::AuthGateway;
pub use records::RecordsGateway;
