// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by all gateway adapters.

use async_trait::async_trait;

use crate::error::CasetraceError;
use crate::types::HealthStatus;

/// The base trait for all Casetrace gateway adapters.
///
/// Every gateway surface (auth, records) implements this trait, which
/// provides identity and health check capabilities.
#[async_trait]
pub trait GatewayAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, CasetraceError>;
}
