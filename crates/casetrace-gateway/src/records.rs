// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for row-level CRUD over the investigations table.
//!
//! The hosted backend exposes tables through a REST row interface with
//! filter/order query parameters (`user_id=eq.X`, `order=created_at.desc`)
//! and `Prefer: return=representation` for mutations, so every write comes
//! back with the canonical stored row.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use tracing::{debug, warn};

use casetrace_config::GatewayConfig;
use casetrace_core::{
    CasetraceError, GatewayAdapter, HealthStatus, Investigation, InvestigationDraft,
    InvestigationId, InvestigationPatch, RecordsGateway, UserId,
};

use crate::wire;

/// HTTP client for the investigations table.
///
/// Requests authenticate with the signed-in user's bearer token once
/// [`authorize`](RecordsClient::authorize) is called; before that the public
/// anon key is used, and row-level security on the server decides what an
/// anonymous caller may see.
pub struct RecordsClient {
    client: reqwest::Client,
    base_url: String,
    table: String,
    max_retries: u32,
    anon_key: String,
    bearer: RwLock<Option<String>>,
}

impl RecordsClient {
    /// Creates a new records client from gateway configuration.
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
            table: config.records_table.clone(),
            max_retries: config.max_retries,
            anon_key,
            bearer: RwLock::new(None),
        })
    }

    /// Sets the bearer token used for subsequent requests.
    ///
    /// Called with the session's access token after sign-in and with `None`
    /// after sign-out.
    pub fn authorize(&self, access_token: Option<String>) {
        let mut bearer = self.bearer.write().unwrap_or_else(|e| e.into_inner());
        *bearer = access_token;
    }

    fn bearer_token(&self) -> String {
        self.bearer
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    /// Sends a table request and parses the row-array response.
    ///
    /// Mutations set `Prefer: return=representation` so the server echoes
    /// the canonical rows. Transient errors (429, 500, 503) are retried
    /// after a 1-second delay up to the configured retry count.
    async fn request_rows(
        &self,
        method: Method,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<Vec<Investigation>, CasetraceError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying table request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let mut request = self
                .client
                .request(method.clone(), self.table_url())
                .query(query)
                .bearer_auth(self.bearer_token());
            if method != Method::GET {
                request = request.header("prefer", "return=representation");
            }
            if let Some(ref body) = body {
                request = request.json(body);
            }

            let response = request.send().await.map_err(|e| CasetraceError::Gateway {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

            let status = response.status();
            debug!(status = %status, attempt, table = %self.table, "table response received");

            if status.is_success() {
                let text = response.text().await.map_err(|e| CasetraceError::Gateway {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&text).map_err(|e| CasetraceError::Gateway {
                    message: format!("failed to parse table response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let text = response.text().await.unwrap_or_default();
            if wire::is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %text, "transient table error, will retry");
                last_error = Some(CasetraceError::Gateway {
                    message: wire::error_message(status, &text),
                    source: None,
                });
                continue;
            }

            return Err(CasetraceError::Gateway {
                message: wire::error_message(status, &text),
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| CasetraceError::Gateway {
            message: "table request failed after retries".into(),
            source: None,
        }))
    }
}

#[async_trait]
impl GatewayAdapter for RecordsClient {
    fn name(&self) -> &str {
        "hosted-records"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, CasetraceError> {
        let url = format!("{}/rest/v1/", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Degraded(format!(
                "table endpoint returned {}",
                resp.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("tables unreachable: {e}"))),
        }
    }
}

#[async_trait]
impl RecordsGateway for RecordsClient {
    async fn insert(&self, draft: &InvestigationDraft) -> Result<Investigation, CasetraceError> {
        let body = serde_json::to_value(draft).map_err(|e| CasetraceError::Internal(
            format!("failed to serialize draft: {e}"),
        ))?;
        let rows = self
            .request_rows(Method::POST, &[("select", "*".to_string())], Some(body))
            .await?;
        rows.into_iter().next().ok_or_else(|| CasetraceError::Gateway {
            message: "insert returned no rows".into(),
            source: None,
        })
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Investigation>, CasetraceError> {
        self.request_rows(
            Method::GET,
            &[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("order", "created_at.desc".to_string()),
            ],
            None,
        )
        .await
    }

    async fn fetch(&self, id: &InvestigationId) -> Result<Investigation, CasetraceError> {
        let rows = self
            .request_rows(
                Method::GET,
                &[
                    ("select", "*".to_string()),
                    ("id", format!("eq.{id}")),
                ],
                None,
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CasetraceError::NotFound(id.0.clone()))
    }

    async fn update(
        &self,
        id: &InvestigationId,
        patch: &InvestigationPatch,
    ) -> Result<Investigation, CasetraceError> {
        patch.validate()?;
        let body = serde_json::to_value(patch).map_err(|e| CasetraceError::Internal(
            format!("failed to serialize patch: {e}"),
        ))?;
        let rows = self
            .request_rows(
                Method::PATCH,
                &[
                    ("select", "*".to_string()),
                    ("id", format!("eq.{id}")),
                ],
                Some(body),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| CasetraceError::NotFound(id.0.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> RecordsClient {
        let config = GatewayConfig {
            base_url: Some(base_url.to_string()),
            anon_key: Some("test-anon-key".to_string()),
            timeout_secs: 5,
            max_retries: 1,
            records_table: "investigations".to_string(),
        };
        RecordsClient::new(&config).unwrap()
    }

    fn row(id: &str, user: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "user_id": user,
            "kind": "website",
            "status": "pending",
            "target": "http://suspect.example",
            "title": "Suspicious storefront",
            "description": null,
            "risk_score": null,
            "progress": 0,
            "created_at": "2026-08-30T12:00:00Z"
        })
    }

    fn draft(user: &str) -> InvestigationDraft {
        InvestigationDraft {
            user_id: UserId(user.into()),
            kind: casetrace_core::InvestigationKind::Website,
            status: casetrace_core::InvestigationStatus::Pending,
            target: "http://suspect.example".into(),
            title: "Suspicious storefront".into(),
            description: None,
            progress: Some(0),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_returns_canonical_row() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/investigations"))
            .and(header("prefer", "return=representation"))
            .and(header("apikey", "test-anon-key"))
            .and(body_partial_json(serde_json::json!({
                "user_id": "u-42",
                "status": "pending"
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!([row("inv-1", "u-42")])),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let record = client.insert(&draft("u-42")).await.unwrap();
        assert_eq!(record.id.0, "inv-1");
        assert_eq!(record.user_id.0, "u-42");
    }

    #[tokio::test]
    async fn list_filters_by_owner_and_orders_newest_first() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/investigations"))
            .and(query_param("user_id", "eq.u-42"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                row("inv-2", "u-42"),
                row("inv-1", "u-42")
            ])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let rows = client.list_for_user(&UserId("u-42".into())).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.0, "inv-2");
    }

    #[tokio::test]
    async fn fetch_missing_row_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/investigations"))
            .and(query_param("id", "eq.inv-404"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .fetch(&InvestigationId("inv-404".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, CasetraceError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_sends_only_present_fields() {
        let server = MockServer::start().await;

        let mut updated = row("inv-1", "u-42");
        updated["status"] = serde_json::json!("completed");
        updated["risk_score"] = serde_json::json!(82);

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/investigations"))
            .and(query_param("id", "eq.inv-1"))
            .and(body_partial_json(serde_json::json!({
                "status": "completed",
                "risk_score": 82
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([updated])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let patch = InvestigationPatch {
            status: Some(casetrace_core::InvestigationStatus::Completed),
            risk_score: Some(82),
            ..Default::default()
        };
        let record = client
            .update(&InvestigationId("inv-1".into()), &patch)
            .await
            .unwrap();
        assert_eq!(record.status, casetrace_core::InvestigationStatus::Completed);
        assert_eq!(record.risk_score, Some(82));
    }

    #[tokio::test]
    async fn update_rejects_out_of_range_score_before_network() {
        let server = MockServer::start().await;
        // No mock mounted: an HTTP call would fail the test via the error path.
        let client = test_client(&server.uri());
        let patch = InvestigationPatch {
            risk_score: Some(120),
            ..Default::default()
        };
        let err = client
            .update(&InvestigationId("inv-1".into()), &patch)
            .await
            .unwrap_err();
        assert!(matches!(err, CasetraceError::InvalidField(_)));
    }

    #[tokio::test]
    async fn authorized_requests_use_session_bearer() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/investigations"))
            .and(header("authorization", "Bearer session-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client.authorize(Some("session-jwt".into()));
        let rows = client.list_for_user(&UserId("u-42".into())).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn retries_once_on_429_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/investigations"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/investigations"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([row("inv-1", "u-42")])),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let rows = client.list_for_user(&UserId("u-42".into())).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn server_error_message_surfaces_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/investigations"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "message": "duplicate key value violates unique constraint"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.insert(&draft("u-42")).await.unwrap_err();
        assert!(err
            .to_string()
            .contains("duplicate key value violates unique constraint"));
    }
}
