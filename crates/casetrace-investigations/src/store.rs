// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRUD proxy over the remote investigations table, scoped to the current
//! session user, with local cache reconciliation.
//!
//! The store keeps the collection newest-first and reconciles it against
//! the canonical rows the gateway returns: create prepends without a
//! reload, update merges by id, and list replaces wholesale. The "current"
//! record and the collection are linked only by id; they can transiently
//! disagree between operations.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use casetrace_core::{
    CasetraceError, Investigation, InvestigationDraft, InvestigationId, InvestigationPatch,
    InvestigationStatus, NewInvestigation, RecordsGateway,
};
use casetrace_session::SessionStore;

use crate::status::{OpKind, OpStatus, OpStatuses};

/// Store for the signed-in user's investigation records.
///
/// Constructed once at startup with the session store and a records
/// gateway, and passed explicitly to consumers.
pub struct InvestigationStore {
    session: Arc<SessionStore>,
    gateway: Arc<dyn RecordsGateway>,
    records: RwLock<Vec<Investigation>>,
    current: RwLock<Option<Investigation>>,
    ops: RwLock<OpStatuses>,
}

impl InvestigationStore {
    pub fn new(session: Arc<SessionStore>, gateway: Arc<dyn RecordsGateway>) -> Self {
        Self {
            session,
            gateway,
            records: RwLock::new(Vec::new()),
            current: RwLock::new(None),
            ops: RwLock::new(OpStatuses::default()),
        }
    }

    /// Returns a copy of the cached collection, newest first.
    pub async fn records(&self) -> Vec<Investigation> {
        self.records.read().await.clone()
    }

    /// Returns the currently open record, if any.
    pub async fn current(&self) -> Option<Investigation> {
        self.current.read().await.clone()
    }

    /// Returns the status slot for the given operation kind.
    pub async fn op_status(&self, kind: OpKind) -> OpStatus {
        self.ops.read().await.get(kind)
    }

    /// Opens a new investigation for the signed-in user.
    ///
    /// Stamps ownership, `status = pending`, `progress = 0`, and the
    /// creation time, then prepends the gateway's canonical row to the
    /// collection and makes it current. Fails without any gateway call
    /// when no user is signed in.
    pub async fn create(
        &self,
        new: NewInvestigation,
    ) -> Result<Investigation, CasetraceError> {
        let Some(user) = self.session.current_user().await else {
            let err = CasetraceError::NotAuthenticated;
            self.set_status(OpKind::Create, OpStatus::Failed(err.to_string()))
                .await;
            return Err(err);
        };

        self.set_status(OpKind::Create, OpStatus::Pending).await;

        let draft = InvestigationDraft {
            user_id: user.id,
            kind: new.kind,
            status: InvestigationStatus::Pending,
            target: new.target,
            title: new.title,
            description: new.description,
            progress: Some(0),
            created_at: Utc::now(),
        };

        match self.gateway.insert(&draft).await {
            Ok(record) => {
                info!(id = %record.id, kind = %record.kind, "investigation created");
                self.records.write().await.insert(0, record.clone());
                *self.current.write().await = Some(record.clone());
                self.set_status(OpKind::Create, OpStatus::Idle).await;
                Ok(record)
            }
            Err(err) => {
                warn!(error = %err, "create failed");
                self.set_status(OpKind::Create, OpStatus::Failed(err.to_string()))
                    .await;
                Err(err)
            }
        }
    }

    /// Reloads the signed-in user's records wholesale, newest first.
    ///
    /// Silently no-ops when no user is signed in, leaving the cached
    /// collection untouched.
    pub async fn refresh(&self) -> Result<(), CasetraceError> {
        let Some(user) = self.session.current_user().await else {
            debug!("refresh skipped: no signed-in user");
            return Ok(());
        };

        self.set_status(OpKind::List, OpStatus::Pending).await;

        match self.gateway.list_for_user(&user.id).await {
            Ok(rows) => {
                debug!(count = rows.len(), "collection reloaded");
                *self.records.write().await = rows;
                self.set_status(OpKind::List, OpStatus::Idle).await;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "refresh failed");
                self.set_status(OpKind::List, OpStatus::Failed(err.to_string()))
                    .await;
                Err(err)
            }
        }
    }

    /// Fetches a single record by id and makes it current.
    ///
    /// Ownership is enforced by row-level security on the gateway, not
    /// here; a row the user cannot see comes back as not-found.
    pub async fn open(&self, id: &InvestigationId) -> Result<Investigation, CasetraceError> {
        self.set_status(OpKind::Load, OpStatus::Pending).await;

        match self.gateway.fetch(id).await {
            Ok(record) => {
                *self.current.write().await = Some(record.clone());
                self.set_status(OpKind::Load, OpStatus::Idle).await;
                Ok(record)
            }
            Err(err) => {
                warn!(id = %id, error = %err, "open failed");
                self.set_status(OpKind::Load, OpStatus::Failed(err.to_string()))
                    .await;
                Err(err)
            }
        }
    }

    /// Applies a partial update and reconciles the local cache.
    ///
    /// The gateway's canonical row replaces the matching collection entry,
    /// and the current record when it has the same id. Field overwrites
    /// are idempotent: re-applying an identical patch changes nothing.
    pub async fn update(
        &self,
        id: &InvestigationId,
        patch: InvestigationPatch,
    ) -> Result<Investigation, CasetraceError> {
        self.set_status(OpKind::Update, OpStatus::Pending).await;

        match self.gateway.update(id, &patch).await {
            Ok(record) => {
                debug!(id = %record.id, "investigation updated");
                {
                    let mut records = self.records.write().await;
                    if let Some(entry) = records.iter_mut().find(|r| &r.id == id) {
                        *entry = record.clone();
                    }
                }
                {
                    let mut current = self.current.write().await;
                    if current.as_ref().is_some_and(|c| &c.id == id) {
                        *current = Some(record.clone());
                    }
                }
                self.set_status(OpKind::Update, OpStatus::Idle).await;
                Ok(record)
            }
            Err(err) => {
                warn!(id = %id, error = %err, "update failed");
                self.set_status(OpKind::Update, OpStatus::Failed(err.to_string()))
                    .await;
                Err(err)
            }
        }
    }

    async fn set_status(&self, kind: OpKind, status: OpStatus) {
        self.ops.write().await.set(kind, status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casetrace_config::DemoConfig;
    use casetrace_core::InvestigationKind;
    use casetrace_session::DemoGateway;
    use casetrace_test_utils::{test_record, MockRecordsGateway};

    async fn signed_in_store(gateway: Arc<MockRecordsGateway>) -> InvestigationStore {
        let demo = DemoGateway::from_config(&DemoConfig::default());
        let session = Arc::new(SessionStore::new(None, demo));
        session
            .sign_in("demo@casetrace.io", "demo123")
            .await
            .expect("demo sign-in");
        InvestigationStore::new(session, gateway)
    }

    fn signed_out_store(gateway: Arc<MockRecordsGateway>) -> InvestigationStore {
        let session = Arc::new(SessionStore::new(None, None));
        InvestigationStore::new(session, gateway)
    }

    fn new_website_case() -> NewInvestigation {
        NewInvestigation {
            kind: InvestigationKind::Website,
            target: "http://suspect.example".into(),
            title: "Suspicious storefront".into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_without_session_issues_no_gateway_call() {
        let gateway = Arc::new(MockRecordsGateway::new());
        let store = signed_out_store(gateway.clone());

        let err = store.create(new_website_case()).await.unwrap_err();
        assert_eq!(err.to_string(), "User not authenticated");
        assert_eq!(gateway.calls(), 0);
        assert_eq!(
            store.op_status(OpKind::Create).await,
            OpStatus::Failed("User not authenticated".into())
        );
    }

    #[tokio::test]
    async fn create_stamps_ownership_and_pending_status() {
        let gateway = Arc::new(MockRecordsGateway::new());
        let store = signed_in_store(gateway).await;

        let record = store.create(new_website_case()).await.unwrap();
        assert_eq!(record.user_id.0, "demo-user-id");
        assert_eq!(record.status, InvestigationStatus::Pending);
        assert_eq!(record.progress, Some(0));
        assert!(record.risk_score.is_none());
    }

    #[tokio::test]
    async fn create_prepends_and_sets_current_without_reload() {
        let gateway = Arc::new(MockRecordsGateway::with_rows(vec![test_record(
            "inv-old",
            "demo-user-id",
            60,
        )]));
        let store = signed_in_store(gateway).await;
        store.refresh().await.unwrap();

        let record = store.create(new_website_case()).await.unwrap();
        let records = store.records().await;
        assert_eq!(records[0].id, record.id);
        assert_eq!(records.len(), 2);
        assert_eq!(store.current().await.unwrap().id, record.id);
    }

    #[tokio::test]
    async fn refresh_replaces_collection_newest_first() {
        let gateway = Arc::new(MockRecordsGateway::with_rows(vec![
            test_record("inv-1", "demo-user-id", 60),
            test_record("inv-2", "demo-user-id", 10),
            test_record("inv-other", "someone-else", 5),
        ]));
        let store = signed_in_store(gateway).await;

        store.refresh().await.unwrap();
        let records = store.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.0, "inv-2");
        assert_eq!(records[1].id.0, "inv-1");
    }

    #[tokio::test]
    async fn refresh_without_session_silently_no_ops() {
        let gateway = Arc::new(MockRecordsGateway::new());
        let store = signed_out_store(gateway.clone());

        store.refresh().await.unwrap();
        assert_eq!(gateway.calls(), 0);
        assert!(store.records().await.is_empty());
    }

    #[tokio::test]
    async fn open_sets_current_record() {
        let gateway = Arc::new(MockRecordsGateway::with_rows(vec![test_record(
            "inv-1",
            "demo-user-id",
            5,
        )]));
        let store = signed_in_store(gateway).await;

        let record = store.open(&InvestigationId("inv-1".into())).await.unwrap();
        assert_eq!(record.id.0, "inv-1");
        assert_eq!(store.current().await.unwrap().id.0, "inv-1");
    }

    #[tokio::test]
    async fn update_merges_into_collection_and_current() {
        let gateway = Arc::new(MockRecordsGateway::with_rows(vec![test_record(
            "inv-1",
            "demo-user-id",
            5,
        )]));
        let store = signed_in_store(gateway).await;
        store.refresh().await.unwrap();
        store.open(&InvestigationId("inv-1".into())).await.unwrap();

        let patch = InvestigationPatch {
            status: Some(InvestigationStatus::Completed),
            risk_score: Some(82),
            ..Default::default()
        };
        let updated = store
            .update(&InvestigationId("inv-1".into()), patch)
            .await
            .unwrap();

        assert_eq!(updated.status, InvestigationStatus::Completed);
        assert_eq!(updated.risk_score, Some(82));
        // Unchanged fields survive the merge.
        assert_eq!(updated.title, "Case inv-1");

        let records = store.records().await;
        assert_eq!(records[0].status, InvestigationStatus::Completed);
        assert_eq!(records[0].risk_score, Some(82));
        assert_eq!(store.current().await.unwrap().risk_score, Some(82));
    }

    #[tokio::test]
    async fn update_leaves_unrelated_current_untouched() {
        let gateway = Arc::new(MockRecordsGateway::with_rows(vec![
            test_record("inv-1", "demo-user-id", 5),
            test_record("inv-2", "demo-user-id", 10),
        ]));
        let store = signed_in_store(gateway).await;
        store.refresh().await.unwrap();
        store.open(&InvestigationId("inv-2".into())).await.unwrap();

        let patch = InvestigationPatch {
            status: Some(InvestigationStatus::Running),
            ..Default::default()
        };
        store
            .update(&InvestigationId("inv-1".into()), patch)
            .await
            .unwrap();

        let current = store.current().await.unwrap();
        assert_eq!(current.id.0, "inv-2");
        assert_eq!(current.status, InvestigationStatus::Pending);
    }

    #[tokio::test]
    async fn applying_the_same_patch_twice_is_idempotent() {
        let gateway = Arc::new(MockRecordsGateway::with_rows(vec![test_record(
            "inv-1",
            "demo-user-id",
            5,
        )]));
        let store = signed_in_store(gateway).await;

        let patch = InvestigationPatch {
            status: Some(InvestigationStatus::Completed),
            risk_score: Some(82),
            progress: Some(100),
            ..Default::default()
        };
        let first = store
            .update(&InvestigationId("inv-1".into()), patch.clone())
            .await
            .unwrap();
        let second = store
            .update(&InvestigationId("inv-1".into()), patch)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn gateway_failure_lands_in_the_operations_own_slot() {
        let gateway = Arc::new(MockRecordsGateway::new());
        let store = signed_in_store(gateway.clone()).await;

        gateway.fail_with("table offline");
        let err = store.refresh().await.unwrap_err();
        assert!(err.to_string().contains("table offline"));
        assert_eq!(
            store.op_status(OpKind::List).await,
            OpStatus::Failed("gateway error: table offline".into())
        );
        // Other slots are unaffected.
        assert_eq!(store.op_status(OpKind::Create).await, OpStatus::Idle);
    }
}
