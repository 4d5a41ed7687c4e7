// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted auth gateway for session-store tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use casetrace_core::{
    AuthGateway, AuthSession, CasetraceError, GatewayAdapter, HealthStatus,
};

/// Mock [`AuthGateway`] with pre-configured responses and call counters.
///
/// By default every session-granting call fails with a "not scripted"
/// message; builders configure success, failure, recovery, and latency.
/// Counters let tests assert on the number of network calls issued
/// (for example, that a local bypass issued none).
#[derive(Debug, Default)]
pub struct MockAuthGateway {
    session: Option<AuthSession>,
    restored: Option<AuthSession>,
    fail_message: Option<String>,
    sign_out_error: Option<String>,
    delay: Option<Duration>,
    sign_in_count: AtomicUsize,
    sign_up_count: AtomicUsize,
    sign_out_count: AtomicUsize,
    current_session_count: AtomicUsize,
}

impl MockAuthGateway {
    /// Creates a mock where every call fails with a "not scripted" error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose sign-in and sign-up return the given session.
    pub fn with_session(session: AuthSession) -> Self {
        Self {
            session: Some(session),
            ..Self::default()
        }
    }

    /// Creates a mock where every call fails with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_message: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Scripts `current_session` to recover the given session.
    pub fn with_restored(mut self, session: AuthSession) -> Self {
        self.restored = Some(session);
        self
    }

    /// Scripts sign-out to fail with the given message.
    pub fn with_sign_out_error(mut self, message: &str) -> Self {
        self.sign_out_error = Some(message.to_string());
        self
    }

    /// Adds artificial latency before every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_count.load(Ordering::SeqCst)
    }

    pub fn sign_up_calls(&self) -> usize {
        self.sign_up_count.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_count.load(Ordering::SeqCst)
    }

    pub fn current_session_calls(&self) -> usize {
        self.current_session_count.load(Ordering::SeqCst)
    }

    async fn maybe_delay(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn scripted_session(&self) -> Result<AuthSession, CasetraceError> {
        if let Some(message) = &self.fail_message {
            return Err(CasetraceError::Auth(message.clone()));
        }
        self.session
            .clone()
            .ok_or_else(|| CasetraceError::Auth("mock: no session scripted".into()))
    }
}

#[async_trait]
impl GatewayAdapter for MockAuthGateway {
    fn name(&self) -> &str {
        "mock-auth"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, CasetraceError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl AuthGateway for MockAuthGateway {
    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _metadata: BTreeMap<String, serde_json::Value>,
    ) -> Result<AuthSession, CasetraceError> {
        self.sign_up_count.fetch_add(1, Ordering::SeqCst);
        self.maybe_delay().await;
        self.scripted_session()
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthSession, CasetraceError> {
        self.sign_in_count.fetch_add(1, Ordering::SeqCst);
        self.maybe_delay().await;
        self.scripted_session()
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), CasetraceError> {
        self.sign_out_count.fetch_add(1, Ordering::SeqCst);
        self.maybe_delay().await;
        match &self.sign_out_error {
            Some(message) => Err(CasetraceError::Auth(message.clone())),
            None => Ok(()),
        }
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, CasetraceError> {
        self.current_session_count.fetch_add(1, Ordering::SeqCst);
        self.maybe_delay().await;
        if let Some(message) = &self.fail_message {
            return Err(CasetraceError::Auth(message.clone()));
        }
        Ok(self.restored.clone())
    }
}
