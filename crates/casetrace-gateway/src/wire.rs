// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire-format types for the hosted backend's JSON bodies.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use casetrace_core::{AuthSession, AuthUser, CasetraceError, UserId};

/// User object as returned inside auth responses.
#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub user_metadata: BTreeMap<String, serde_json::Value>,
}

impl From<WireUser> for AuthUser {
    fn from(wire: WireUser) -> Self {
        AuthUser {
            id: UserId(wire.id),
            email: wire.email,
            metadata: wire.user_metadata,
        }
    }
}

/// Session-bearing payload from sign-up and the password token grant.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime of the token in seconds, when the server reports one.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Absolute expiry as a unix timestamp; preferred over `expires_in`.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: WireUser,
}

impl TokenResponse {
    /// Converts the wire payload into a domain session.
    pub fn into_session(self) -> Result<AuthSession, CasetraceError> {
        let expires_at = resolve_expiry(self.expires_at, self.expires_in)?;
        Ok(AuthSession {
            user: self.user.into(),
            access_token: self.access_token,
            expires_at,
        })
    }
}

/// Default token lifetime when the server reports neither expiry field.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

fn resolve_expiry(
    expires_at: Option<i64>,
    expires_in: Option<i64>,
) -> Result<DateTime<Utc>, CasetraceError> {
    if let Some(epoch) = expires_at {
        return Utc
            .timestamp_opt(epoch, 0)
            .single()
            .ok_or_else(|| CasetraceError::Gateway {
                message: format!("invalid expires_at timestamp: {epoch}"),
                source: None,
            });
    }
    let lifetime = expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    Ok(Utc::now() + chrono::Duration::seconds(lifetime))
}

/// Error body shapes the hosted backend emits.
///
/// The auth API uses `error_description` or `msg`; the table API uses
/// `message`. All are surfaced to callers verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// Extracts the most specific message field present in the body.
    pub fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Parses an error response body, falling back to the raw text.
pub fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| format!("gateway returned {status}: {body}"))
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
pub fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_prefers_absolute_expiry() {
        let json = serde_json::json!({
            "access_token": "tok",
            "expires_in": 3600,
            "expires_at": 1_900_000_000i64,
            "user": {"id": "u-1", "email": "a@b.c"}
        });
        let resp: TokenResponse = serde_json::from_value(json).unwrap();
        let session = resp.into_session().unwrap();
        assert_eq!(session.expires_at.timestamp(), 1_900_000_000);
        assert_eq!(session.user.id.0, "u-1");
    }

    #[test]
    fn token_response_falls_back_to_relative_expiry() {
        let json = serde_json::json!({
            "access_token": "tok",
            "expires_in": 7200,
            "user": {"id": "u-1", "email": "a@b.c"}
        });
        let resp: TokenResponse = serde_json::from_value(json).unwrap();
        let before = Utc::now();
        let session = resp.into_session().unwrap();
        let lifetime = session.expires_at - before;
        assert!(lifetime.num_seconds() >= 7195 && lifetime.num_seconds() <= 7205);
    }

    #[test]
    fn error_message_picks_most_specific_field() {
        let body = r#"{"error_description": "Invalid login credentials"}"#;
        let msg = error_message(reqwest::StatusCode::BAD_REQUEST, body);
        assert_eq!(msg, "Invalid login credentials");

        let body = r#"{"message": "duplicate key value"}"#;
        let msg = error_message(reqwest::StatusCode::CONFLICT, body);
        assert_eq!(msg, "duplicate key value");
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        let msg = error_message(reqwest::StatusCode::BAD_GATEWAY, "upstream unavailable");
        assert!(msg.contains("502"));
        assert!(msg.contains("upstream unavailable"));
    }

    #[test]
    fn transient_statuses() {
        use reqwest::StatusCode;
        assert!(is_transient_error(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_error(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_transient_error(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_transient_error(StatusCode::BAD_REQUEST));
        assert!(!is_transient_error(StatusCode::UNAUTHORIZED));
    }
}
