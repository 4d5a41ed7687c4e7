// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk session cache.
//!
//! The CLI is short-lived, so the session returned at login is persisted
//! under the user's data directory and replayed on the next invocation.
//! Expired entries are discarded on load; the file itself is best-effort
//! and never blocks a command.

use std::path::PathBuf;

use tracing::{debug, warn};

use casetrace_core::AuthSession;

const SESSION_FILE: &str = "session.json";

fn session_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("casetrace").join(SESSION_FILE))
}

/// Loads the cached session, dropping it if expired or unreadable.
pub fn load() -> Option<AuthSession> {
    let path = session_path()?;
    let content = std::fs::read_to_string(&path).ok()?;
    let session: AuthSession = match serde_json::from_str(&content) {
        Ok(session) => session,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "discarding unreadable session cache");
            let _ = std::fs::remove_file(&path);
            return None;
        }
    };
    if session.is_expired() {
        debug!("cached session expired, discarding");
        let _ = std::fs::remove_file(&path);
        return None;
    }
    Some(session)
}

/// Persists the session for the next invocation.
pub fn store(session: &AuthSession) {
    let Some(path) = session_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            warn!(error = %err, "could not create session cache directory");
            return;
        }
    }
    match serde_json::to_string_pretty(session) {
        Ok(json) => {
            if let Err(err) = std::fs::write(&path, json) {
                warn!(path = %path.display(), error = %err, "could not write session cache");
            }
        }
        Err(err) => warn!(error = %err, "could not serialize session"),
    }
}

/// Removes the cached session, if any.
pub fn clear() {
    if let Some(path) = session_path() {
        let _ = std::fs::remove_file(path);
    }
}
