// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session store and demo auth gateway for the Casetrace client.
//!
//! The [`SessionStore`] is the single source of truth for "who is signed
//! in". It drives all session mutations through an auth-event channel and
//! supports a configuration-selected demo gateway so reviewers can sign in
//! without a live backend.

pub mod demo;
pub mod store;

pub use demo::{DemoGateway, DEMO_ACCESS_TOKEN};
pub use store::{SessionSnapshot, SessionStore};
