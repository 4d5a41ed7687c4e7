// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local auth gateway for demo/reviewer mode.
//!
//! Synthesizes a session entirely client-side so the product can be
//! exercised without a live backend. Which credential pair selects this
//! gateway comes from `[demo]` configuration, never from literals in the
//! sign-in path.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use casetrace_config::DemoConfig;
use casetrace_core::{
    AuthGateway, AuthSession, AuthUser, CasetraceError, GatewayAdapter, HealthStatus, UserId,
};

/// Marker access token carried by synthesized demo sessions.
///
/// The records gateway never accepts it; demo sessions are for exercising
/// the session and guard layers only.
pub const DEMO_ACCESS_TOKEN: &str = "demo-access-token";

/// [`AuthGateway`] implementation that answers only for the configured
/// demo credential pair.
#[derive(Debug, Clone)]
pub struct DemoGateway {
    config: DemoConfig,
}

impl DemoGateway {
    /// Builds a demo gateway, or `None` when demo mode is disabled.
    pub fn from_config(config: &DemoConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        Some(Self {
            config: config.clone(),
        })
    }

    /// Returns true when the submitted credentials are exactly the
    /// configured demo pair.
    pub fn matches(&self, email: &str, password: &str) -> bool {
        email == self.config.email && password == self.config.password
    }

    /// Synthesizes a local session with the fixed demo identity.
    fn synthesize(&self) -> AuthSession {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "display_name".to_string(),
            serde_json::Value::String(self.config.display_name.clone()),
        );
        AuthSession {
            user: AuthUser {
                id: UserId(self.config.user_id.clone()),
                email: self.config.email.clone(),
                metadata,
            },
            access_token: DEMO_ACCESS_TOKEN.to_string(),
            expires_at: chrono::Utc::now()
                + chrono::Duration::hours(self.config.session_hours as i64),
        }
    }
}

#[async_trait]
impl GatewayAdapter for DemoGateway {
    fn name(&self) -> &str {
        "demo-auth"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, CasetraceError> {
        // Purely local; always available.
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl AuthGateway for DemoGateway {
    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _metadata: BTreeMap<String, serde_json::Value>,
    ) -> Result<AuthSession, CasetraceError> {
        Err(CasetraceError::Auth(
            "Demo mode does not support sign-up".into(),
        ))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, CasetraceError> {
        if !self.matches(email, password) {
            return Err(CasetraceError::Auth("Invalid login credentials".into()));
        }
        debug!(user_id = %self.config.user_id, "demo sign-in");
        Ok(self.synthesize())
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), CasetraceError> {
        // Nothing remote to invalidate.
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, CasetraceError> {
        // Demo sessions live only for the process lifetime.
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> DemoGateway {
        DemoGateway::from_config(&DemoConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn sign_in_with_configured_pair_yields_fixed_identity() {
        let gateway = demo();
        let session = gateway.sign_in("demo@casetrace.io", "demo123").await.unwrap();
        assert_eq!(session.user.id.0, "demo-user-id");
        assert_eq!(session.access_token, DEMO_ACCESS_TOKEN);
        assert!(!session.is_expired());
    }

    #[tokio::test]
    async fn sign_in_with_other_credentials_is_rejected() {
        let gateway = demo();
        let err = gateway.sign_in("demo@casetrace.io", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn session_expiry_honors_configured_hours() {
        let mut config = DemoConfig::default();
        config.session_hours = 24;
        let gateway = DemoGateway::from_config(&config).unwrap();
        let session = gateway
            .sign_in(&config.email, &config.password)
            .await
            .unwrap();
        let lifetime = session.expires_at - chrono::Utc::now();
        assert!(lifetime.num_hours() >= 23 && lifetime.num_hours() <= 24);
    }

    #[test]
    fn disabled_demo_yields_no_gateway() {
        let mut config = DemoConfig::default();
        config.enabled = false;
        assert!(DemoGateway::from_config(&config).is_none());
    }

    #[tokio::test]
    async fn sign_up_is_not_supported() {
        let gateway = demo();
        let err = gateway
            .sign_up("demo@casetrace.io", "demo123", BTreeMap::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not support sign-up"));
    }
}
