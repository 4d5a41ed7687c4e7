// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the hosted backend's session-based auth API.
//!
//! Provides [`AuthClient`] which handles request construction, the public
//! API key header, transient error retry, and mapping of error bodies to
//! verbatim caller-facing messages.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use casetrace_config::GatewayConfig;
use casetrace_core::{
    AuthGateway, AuthSession, CasetraceError, GatewayAdapter, HealthStatus,
};

use crate::wire::{self, TokenResponse, WireUser};

/// HTTP client for the hosted backend's auth endpoints.
///
/// Manages the public API key header, connection pooling, and retry logic
/// for transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    /// Token persisted from a previous session, used by `current_session`.
    restore_token: Option<String>,
}

impl AuthClient {
    /// Creates a new auth client from gateway configuration.
    ///
    /// Fails with a configuration error when `base_url` or `anon_key` is
    /// absent; the demo sign-in path does not go through this client.
    pub fn new(config: &GatewayConfig) -> Result<Self, CasetraceError> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| CasetraceError::Config("gateway.base_url is not set".into()))?;
        let anon_key = config
            .anon_key
            .clone()
            .ok_or_else(|| CasetraceError::Config("gateway.anon_key is not set".into()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&anon_key).map_err(|e| {
                CasetraceError::Config(format!("invalid anon_key header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CasetraceError::Gateway {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            restore_token: None,
        })
    }

    /// Supplies a previously persisted access token for session recovery.
    pub fn with_restore_token(mut self, token: String) -> Self {
        self.restore_token = Some(token);
        self
    }

    /// Sends a session-granting POST and parses the token response.
    ///
    /// On transient errors (429, 500, 503), retries after a 1-second delay
    /// up to the configured retry count. Non-transient failures surface the
    /// server's own error message verbatim as an auth error.
    async fn request_session(
        &self,
        url: String,
        body: serde_json::Value,
    ) -> Result<AuthSession, CasetraceError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying auth request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| CasetraceError::Gateway {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "auth response received");

            if status.is_success() {
                let text = response.text().await.map_err(|e| CasetraceError::Gateway {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                let token: TokenResponse =
                    serde_json::from_str(&text).map_err(|e| CasetraceError::Gateway {
                        message: format!("failed to parse auth response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return token.into_session();
            }

            let text = response.text().await.unwrap_or_default();
            if wire::is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %text, "transient auth error, will retry");
                last_error = Some(CasetraceError::Auth(wire::error_message(status, &text)));
                continue;
            }

            return Err(CasetraceError::Auth(wire::error_message(status, &text)));
        }

        Err(last_error
            .unwrap_or_else(|| CasetraceError::Auth("auth request failed after retries".into())))
    }
}

#[async_trait]
impl GatewayAdapter for AuthClient {
    fn name(&self) -> &str {
        "hosted-auth"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, CasetraceError> {
        let url = format!("{}/auth/v1/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Degraded(format!(
                "auth health endpoint returned {}",
                resp.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("auth unreachable: {e}"))),
        }
    }
}

#[async_trait]
impl AuthGateway for AuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> Result<AuthSession, CasetraceError> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": metadata,
        });
        self.request_session(url, body).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, CasetraceError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });
        self.request_session(url, body).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), CasetraceError> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| CasetraceError::Gateway {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, "sign-out response received");
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(CasetraceError::Auth(wire::error_message(status, &text)))
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, CasetraceError> {
        let Some(token) = &self.restore_token else {
            return Ok(None);
        };

        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| CasetraceError::Gateway {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Persisted token no longer valid; treat as signed out.
            debug!("restore token rejected, no existing session");
            return Ok(None);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CasetraceError::Auth(wire::error_message(status, &text)));
        }

        let user: WireUser = response.json().await.map_err(|e| CasetraceError::Gateway {
            message: format!("failed to parse user response: {e}"),
            source: Some(Box::new(e)),
        })?;

        // The user endpoint does not report token expiry; assume a
        // conservative one-hour window and let the next 401 re-sync.
        Ok(Some(AuthSession {
            user: user.into(),
            access_token: token.clone(),
            expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> AuthClient {
        let config = GatewayConfig {
            base_url: Some(base_url.to_string()),
            anon_key: Some("test-anon-key".to_string()),
            timeout_secs: 5,
            max_retries: 1,
            records_table: "investigations".to_string(),
        };
        AuthClient::new(&config).unwrap()
    }

    fn session_body(user_id: &str) -> serde_json::Value {
        serde_json::json!({
            "access_token": "jwt-token",
            "expires_in": 3600,
            "user": {"id": user_id, "email": "alice@example.com"}
        })
    }

    #[tokio::test]
    async fn sign_in_success_returns_session() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "test-anon-key"))
            .and(body_partial_json(
                serde_json::json!({"email": "alice@example.com"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_body("u-42")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let session = client
            .sign_in("alice@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(session.user.id.0, "u-42");
        assert_eq!(session.access_token, "jwt-token");
    }

    #[tokio::test]
    async fn sign_in_surfaces_server_message_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.sign_in("alice@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn sign_in_retries_on_503() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_body("u-42")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let session = client
            .sign_in("alice@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(session.user.id.0, "u-42");
    }

    #[tokio::test]
    async fn sign_up_posts_metadata() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(body_partial_json(serde_json::json!({
                "data": {"display_name": "Alice"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_body("u-new")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let mut metadata = BTreeMap::new();
        metadata.insert("display_name".to_string(), serde_json::json!("Alice"));
        let session = client
            .sign_up("alice@example.com", "hunter2", metadata)
            .await
            .unwrap();
        assert_eq!(session.user.id.0, "u-new");
    }

    #[tokio::test]
    async fn sign_out_sends_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer jwt-token"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(client.sign_out("jwt-token").await.is_ok());
    }

    #[tokio::test]
    async fn current_session_without_restore_token_is_none() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());
        let session = client.current_session().await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn current_session_recovers_user_from_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer persisted-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "u-42", "email": "alice@example.com"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri()).with_restore_token("persisted-token".into());
        let session = client.current_session().await.unwrap().unwrap();
        assert_eq!(session.user.id.0, "u-42");
        assert_eq!(session.access_token, "persisted-token");
    }

    #[tokio::test]
    async fn current_session_treats_401_as_signed_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = test_client(&server.uri()).with_restore_token("stale-token".into());
        let session = client.current_session().await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn new_requires_base_url_and_anon_key() {
        let config = GatewayConfig::default();
        let err = AuthClient::new(&config).unwrap_err();
        assert!(matches!(err, CasetraceError::Config(_)));
    }
}
