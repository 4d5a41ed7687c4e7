// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the gateway traits and the Casetrace stores.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CasetraceError;

/// Unique identifier for a signed-in user, assigned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Unique identifier for an investigation record.
///
/// Always assigned by the gateway on insert, never minted client-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvestigationId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for InvestigationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by gateway health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Gateway is fully operational.
    Healthy,
    /// Gateway is reachable but experiencing issues.
    Degraded(String),
    /// Gateway is not reachable.
    Unhealthy(String),
}

/// The identity record for a signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    /// Optional display metadata supplied at sign-up (name, avatar, etc.).
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// A live authentication session returned by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Returns true if the session's access token has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Events on the auth-change stream.
///
/// The session store's event channel is the only writer of session state;
/// every mutation is expressed as one of these events.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// A sign-up or sign-in completed with a live session.
    SignedIn(AuthSession),
    /// An existing remote session was recovered at startup.
    SessionRestored(AuthSession),
    /// The session ended (explicit sign-out or gateway-side invalidation).
    SignedOut,
}

/// Status vocabulary for an investigation record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvestigationStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Category tag for an investigation target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvestigationKind {
    Website,
    Email,
    Document,
}

/// A single investigation record as stored on the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investigation {
    pub id: InvestigationId,
    pub user_id: UserId,
    pub kind: InvestigationKind,
    pub status: InvestigationStatus,
    /// Free-form subject of the investigation: a URL, an email address,
    /// or an uploaded-file descriptor, depending on `kind`.
    pub target: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Risk score in [0, 100]; absent until analysis completes.
    #[serde(default)]
    pub risk_score: Option<u8>,
    /// Analysis progress in [0, 100].
    #[serde(default)]
    pub progress: Option<u8>,
    pub created_at: DateTime<Utc>,
}

/// Fields the caller supplies when opening a new investigation.
///
/// Ownership, status, progress, and timestamps are stamped by the store;
/// the id comes back from the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvestigation {
    pub kind: InvestigationKind,
    pub target: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A fully stamped row ready for insert, minus the server-assigned id.
///
/// Built by the investigation store from a [`NewInvestigation`] plus the
/// current session's user id. The gateway echoes back the canonical
/// [`Investigation`] including the id it assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationDraft {
    pub user_id: UserId,
    pub kind: InvestigationKind,
    pub status: InvestigationStatus,
    pub target: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub progress: Option<u8>,
    pub created_at: DateTime<Utc>,
}

/// A partial update to an investigation record.
///
/// Absent fields are left untouched by the gateway; present fields overwrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvestigationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InvestigationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

impl InvestigationPatch {
    /// Returns true if the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.target.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.risk_score.is_none()
            && self.progress.is_none()
    }

    /// Validates that score-like fields fall in [0, 100].
    pub fn validate(&self) -> Result<(), CasetraceError> {
        if let Some(score) = self.risk_score {
            bounded_percent(score, "risk_score")?;
        }
        if let Some(progress) = self.progress {
            bounded_percent(progress, "progress")?;
        }
        Ok(())
    }
}

/// Checks that a percentage-valued field is within [0, 100].
pub fn bounded_percent(value: u8, field: &str) -> Result<u8, CasetraceError> {
    if value > 100 {
        return Err(CasetraceError::InvalidField(format!(
            "{field} must be in [0, 100], got {value}"
        )));
    }
    Ok(value)
}
