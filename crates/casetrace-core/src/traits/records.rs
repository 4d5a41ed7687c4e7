// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Investigation-records gateway trait.

use async_trait::async_trait;

use crate::error::CasetraceError;
use crate::traits::adapter::GatewayAdapter;
use crate::types::{
    Investigation, InvestigationDraft, InvestigationId, InvestigationPatch, UserId,
};

/// Gateway surface for row-level CRUD over the investigations table.
///
/// Every mutating call returns the gateway's canonical row so the local
/// cache can reconcile against server-assigned fields (id, created_at).
/// Ownership is enforced server-side by row-level security; the client
/// sends the owner filter but is never trusted for authorization.
#[async_trait]
pub trait RecordsGateway: GatewayAdapter {
    /// Inserts a new row and returns the canonical stored row.
    async fn insert(&self, draft: &InvestigationDraft) -> Result<Investigation, CasetraceError>;

    /// Fetches all rows owned by the given user, newest first.
    async fn list_for_user(&self, user_id: &UserId)
        -> Result<Vec<Investigation>, CasetraceError>;

    /// Fetches a single row by id.
    async fn fetch(&self, id: &InvestigationId) -> Result<Investigation, CasetraceError>;

    /// Applies a partial update and returns the canonical updated row.
    async fn update(
        &self,
        id: &InvestigationId,
        patch: &InvestigationPatch,
    ) -> Result<Investigation, CasetraceError>;
}
