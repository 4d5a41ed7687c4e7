// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./casetrace.toml` > `~/.config/casetrace/casetrace.toml`
//! > `/etc/casetrace/casetrace.toml` with environment variable overrides via
//! the `CASETRACE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CasetraceConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/casetrace/casetrace.toml` (system-wide)
/// 3. `~/.config/casetrace/casetrace.toml` (user XDG config)
/// 4. `./casetrace.toml` (local directory)
/// 5. `CASETRACE_*` environment variables
pub fn load_config() -> Result<CasetraceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CasetraceConfig::default()))
        .merge(Toml::file("/etc/casetrace/casetrace.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("casetrace/casetrace.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("casetrace.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<CasetraceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CasetraceConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CasetraceConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CasetraceConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CASETRACE_GATEWAY_BASE_URL` must map to
/// `gateway.base_url`, not `gateway.base.url`.
fn env_provider() -> Env {
    Env::prefixed("CASETRACE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CASETRACE_GATEWAY_ANON_KEY -> "gateway_anon_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("gateway_", "gateway.", 1)
            .replacen("demo_", "demo.", 1)
            .replacen("client_", "client.", 1);
        mapped.into()
    })
}
