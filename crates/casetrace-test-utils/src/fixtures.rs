// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixture builders for domain objects used across test suites.

use std::collections::BTreeMap;

use chrono::Utc;

use casetrace_core::{
    AuthSession, AuthUser, Investigation, InvestigationId, InvestigationKind,
    InvestigationStatus, UserId,
};

/// Builds a user with the given id and email.
pub fn test_user(id: &str, email: &str) -> AuthUser {
    AuthUser {
        id: UserId(id.to_string()),
        email: email.to_string(),
        metadata: BTreeMap::new(),
    }
}

/// Builds a live (non-expired) session for the given user.
pub fn test_session(user_id: &str, email: &str) -> AuthSession {
    AuthSession {
        user: test_user(user_id, email),
        access_token: format!("token-{user_id}"),
        expires_at: Utc::now() + chrono::Duration::hours(1),
    }
}

/// Builds a pending investigation record created `minutes_ago` minutes ago.
pub fn test_record(id: &str, user_id: &str, minutes_ago: i64) -> Investigation {
    Investigation {
        id: InvestigationId(id.to_string()),
        user_id: UserId(user_id.to_string()),
        kind: InvestigationKind::Website,
        status: InvestigationStatus::Pending,
        target: "http://suspect.example".to_string(),
        title: format!("Case {id}"),
        description: None,
        risk_score: None,
        progress: Some(0),
        created_at: Utc::now() - chrono::Duration::minutes(minutes_ago),
    }
}
