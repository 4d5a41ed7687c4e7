// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Casetrace client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Casetrace configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values; in
/// particular, the demo sign-in path works with no configuration at all.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CasetraceConfig {
    /// Hosted backend gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Demo sign-in settings.
    #[serde(default)]
    pub demo: DemoConfig,

    /// Client behavior settings.
    #[serde(default)]
    pub client: ClientConfig,
}

/// Hosted backend gateway configuration.
///
/// `base_url` and `anon_key` are both optional: without them every gateway
/// operation fails with a configuration error, but the demo sign-in path
/// stays available.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Base URL of the hosted backend (e.g., `https://xyz.example.co`).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Public (anonymous) API key sent with every request.
    #[serde(default)]
    pub anon_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of retries on transient errors (429, 500, 503).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Name of the investigations table on the gateway.
    #[serde(default = "default_records_table")]
    pub records_table: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            anon_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            records_table: default_records_table(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    1
}

fn default_records_table() -> String {
    "investigations".to_string()
}

/// Demo sign-in configuration.
///
/// When enabled, submitting exactly this credential pair bypasses the
/// gateway and synthesizes a local session. This is how reviewers exercise
/// the product without a live backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DemoConfig {
    /// Whether the demo sign-in path is available.
    #[serde(default = "default_demo_enabled")]
    pub enabled: bool,

    /// Email half of the demo credential pair.
    #[serde(default = "default_demo_email")]
    pub email: String,

    /// Password half of the demo credential pair.
    #[serde(default = "default_demo_password")]
    pub password: String,

    /// Fixed user id for the synthesized demo session.
    #[serde(default = "default_demo_user_id")]
    pub user_id: String,

    /// Display name recorded in the demo user's metadata.
    #[serde(default = "default_demo_display_name")]
    pub display_name: String,

    /// Lifetime of a synthesized demo session, in hours.
    #[serde(default = "default_demo_session_hours")]
    pub session_hours: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: default_demo_enabled(),
            email: default_demo_email(),
            password: default_demo_password(),
            user_id: default_demo_user_id(),
            display_name: default_demo_display_name(),
            session_hours: default_demo_session_hours(),
        }
    }
}

fn default_demo_enabled() -> bool {
    true
}

fn default_demo_email() -> String {
    "demo@casetrace.io".to_string()
}

fn default_demo_password() -> String {
    "demo123".to_string()
}

fn default_demo_user_id() -> String {
    "demo-user-id".to_string()
}

fn default_demo_display_name() -> String {
    "Demo Investigator".to_string()
}

fn default_demo_session_hours() -> u64 {
    24
}

/// Client behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
