// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication gateway trait.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::CasetraceError;
use crate::traits::adapter::GatewayAdapter;
use crate::types::AuthSession;

/// Gateway surface for session-based authentication.
///
/// Implementations include the hosted backend's HTTP auth API and the
/// local demo gateway selected by configuration. Failures are returned,
/// never panicked, so callers can render the message inline.
#[async_trait]
pub trait AuthGateway: GatewayAdapter {
    /// Registers a new account and returns the resulting session.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> Result<AuthSession, CasetraceError>;

    /// Exchanges credentials for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, CasetraceError>;

    /// Invalidates the session identified by the given access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), CasetraceError>;

    /// Attempts to recover an existing session (for example from a
    /// persisted token). Returns `None` when no session exists.
    async fn current_session(&self) -> Result<Option<AuthSession>, CasetraceError>;
}
