// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `casetrace doctor` command implementation.
//!
//! Runs quick diagnostic checks over the loaded configuration and the
//! configured gateways.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use casetrace_core::{CasetraceError, GatewayAdapter, HealthStatus};

use crate::app::App;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

/// Runs the diagnostic checks and prints a report.
///
/// Exits non-zero through the caller when any check fails. With `--plain`,
/// disables colored output.
pub async fn run_doctor(app: &App, plain: bool) -> Result<(), CasetraceError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let mut results = Vec::new();

    results.push(check_gateway_config(app));
    results.push(check_demo_config(app));
    if let Some(auth) = app.auth_client() {
        results.push(check_health("auth api", auth.as_ref()).await);
    }
    if let Some(records) = app.records_client() {
        results.push(check_health("records api", records.as_ref()).await);
    }

    println!();
    println!("  casetrace doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    for result in &results {
        let duration_ms = result.duration.as_millis();
        let line = if use_color {
            use colored::Colorize;
            match result.status {
                CheckStatus::Pass => format!(
                    "    {} {:<16} {} ({duration_ms}ms)",
                    "✓".green(),
                    result.name,
                    result.message
                ),
                CheckStatus::Warn => format!(
                    "    {} {:<16} {} ({duration_ms}ms)",
                    "!".yellow(),
                    result.name,
                    result.message.yellow()
                ),
                CheckStatus::Fail => format!(
                    "    {} {:<16} {} ({duration_ms}ms)",
                    "✗".red(),
                    result.name,
                    result.message.red()
                ),
            }
        } else {
            let tag = match result.status {
                CheckStatus::Pass => "[OK]  ",
                CheckStatus::Warn => "[WARN]",
                CheckStatus::Fail => "[FAIL]",
            };
            format!(
                "    {tag} {:<16} {} ({duration_ms}ms)",
                result.name, result.message
            )
        };
        if result.status == CheckStatus::Fail {
            fail_count += 1;
        }
        println!("{line}");
    }
    println!();

    if fail_count > 0 {
        return Err(CasetraceError::Internal(format!(
            "{fail_count} check(s) failed"
        )));
    }
    Ok(())
}

fn check_gateway_config(app: &App) -> CheckResult {
    let start = Instant::now();
    let (status, message) = match (&app.config.gateway.base_url, &app.config.gateway.anon_key) {
        (Some(url), Some(_)) => (CheckStatus::Pass, format!("backend at {url}")),
        (Some(_), None) => (
            CheckStatus::Fail,
            "gateway.base_url set but gateway.anon_key missing".to_string(),
        ),
        (None, _) => (
            CheckStatus::Warn,
            "no backend configured (demo sign-in only)".to_string(),
        ),
    };
    CheckResult {
        name: "gateway config".to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}

fn check_demo_config(app: &App) -> CheckResult {
    let start = Instant::now();
    let (status, message) = if app.config.demo.enabled {
        (
            CheckStatus::Pass,
            format!("demo sign-in enabled for {}", app.config.demo.email),
        )
    } else {
        (CheckStatus::Pass, "demo sign-in disabled".to_string())
    };
    CheckResult {
        name: "demo config".to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}

async fn check_health(name: &str, adapter: &dyn GatewayAdapter) -> CheckResult {
    let start = Instant::now();
    let (status, message) = match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => (CheckStatus::Pass, "reachable".to_string()),
        Ok(HealthStatus::Degraded(detail)) => (CheckStatus::Warn, detail),
        Ok(HealthStatus::Unhealthy(detail)) => (CheckStatus::Fail, detail),
        Err(err) => (CheckStatus::Fail, err.to_string()),
    };
    CheckResult {
        name: name.to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}
