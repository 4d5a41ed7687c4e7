// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory investigations table for store tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use casetrace_core::{
    CasetraceError, GatewayAdapter, HealthStatus, Investigation, InvestigationDraft,
    InvestigationId, InvestigationPatch, RecordsGateway, UserId,
};

/// Mock [`RecordsGateway`] backed by an in-memory row vector.
///
/// Behaves like the hosted table: ids are assigned on insert, listing
/// filters by owner and orders newest-first, and updates merge only the
/// fields present in the patch. A failure message can be injected to
/// exercise error paths, and call counters let tests assert that an
/// operation issued no network calls.
#[derive(Debug, Default)]
pub struct MockRecordsGateway {
    rows: Mutex<Vec<Investigation>>,
    fail_message: Mutex<Option<String>>,
    next_id: AtomicUsize,
    call_count: AtomicUsize,
}

impl MockRecordsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the table with existing rows.
    pub fn with_rows(rows: Vec<Investigation>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// Makes every subsequent call fail with the given message.
    pub fn fail_with(&self, message: &str) {
        *self.lock_failure() = Some(message.to_string());
    }

    /// Clears an injected failure.
    pub fn clear_failure(&self) {
        *self.lock_failure() = None;
    }

    /// Total number of gateway calls issued.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Returns a copy of the stored rows.
    pub fn rows(&self) -> Vec<Investigation> {
        self.lock_rows().clone()
    }

    fn lock_rows(&self) -> std::sync::MutexGuard<'_, Vec<Investigation>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_failure(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.fail_message.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_failure(&self) -> Result<(), CasetraceError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.lock_failure().clone() {
            return Err(CasetraceError::Gateway {
                message,
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GatewayAdapter for MockRecordsGateway {
    fn name(&self) -> &str {
        "mock-records"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, CasetraceError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl RecordsGateway for MockRecordsGateway {
    async fn insert(&self, draft: &InvestigationDraft) -> Result<Investigation, CasetraceError> {
        self.check_failure()?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = Investigation {
            id: InvestigationId(format!("inv-{n}")),
            user_id: draft.user_id.clone(),
            kind: draft.kind,
            status: draft.status,
            target: draft.target.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            risk_score: None,
            progress: draft.progress,
            created_at: draft.created_at,
        };
        self.lock_rows().push(record.clone());
        Ok(record)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Investigation>, CasetraceError> {
        self.check_failure()?;
        let mut rows: Vec<Investigation> = self
            .lock_rows()
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn fetch(&self, id: &InvestigationId) -> Result<Investigation, CasetraceError> {
        self.check_failure()?;
        self.lock_rows()
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| CasetraceError::NotFound(id.0.clone()))
    }

    async fn update(
        &self,
        id: &InvestigationId,
        patch: &InvestigationPatch,
    ) -> Result<Investigation, CasetraceError> {
        self.check_failure()?;
        patch.validate()?;
        let mut rows = self.lock_rows();
        let row = rows
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| CasetraceError::NotFound(id.0.clone()))?;

        if let Some(status) = patch.status {
            row.status = status;
        }
        if let Some(target) = &patch.target {
            row.target = target.clone();
        }
        if let Some(title) = &patch.title {
            row.title = title.clone();
        }
        if let Some(description) = &patch.description {
            row.description = Some(description.clone());
        }
        if let Some(risk_score) = patch.risk_score {
            row.risk_score = Some(risk_score);
        }
        if let Some(progress) = patch.progress {
            row.progress = Some(progress);
        }
        Ok(row.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_record;
    use casetrace_core::InvestigationStatus;

    fn draft(user: &str) -> InvestigationDraft {
        InvestigationDraft {
            user_id: UserId(user.to_string()),
            kind: casetrace_core::InvestigationKind::Email,
            status: InvestigationStatus::Pending,
            target: "phish@scam.example".into(),
            title: "Phishing email".into(),
            description: None,
            progress: Some(0),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let mock = MockRecordsGateway::new();
        let a = mock.insert(&draft("u-1")).await.unwrap();
        let b = mock.insert(&draft("u-1")).await.unwrap();
        assert_eq!(a.id.0, "inv-1");
        assert_eq!(b.id.0, "inv-2");
    }

    #[tokio::test]
    async fn list_filters_by_owner_newest_first() {
        let mock = MockRecordsGateway::with_rows(vec![
            test_record("inv-1", "u-1", 60),
            test_record("inv-2", "u-2", 30),
            test_record("inv-3", "u-1", 10),
        ]);
        let rows = mock.list_for_user(&UserId("u-1".into())).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.0, "inv-3");
        assert_eq!(rows[1].id.0, "inv-1");
    }

    #[tokio::test]
    async fn update_merges_only_present_fields() {
        let mock = MockRecordsGateway::with_rows(vec![test_record("inv-1", "u-1", 5)]);
        let patch = InvestigationPatch {
            status: Some(InvestigationStatus::Completed),
            risk_score: Some(82),
            ..Default::default()
        };
        let updated = mock.update(&InvestigationId("inv-1".into()), &patch).await.unwrap();
        assert_eq!(updated.status, InvestigationStatus::Completed);
        assert_eq!(updated.risk_score, Some(82));
        assert_eq!(updated.title, "Case inv-1");
    }

    #[tokio::test]
    async fn injected_failure_affects_all_calls() {
        let mock = MockRecordsGateway::new();
        mock.fail_with("table offline");
        assert!(mock.insert(&draft("u-1")).await.is_err());
        assert!(mock.list_for_user(&UserId("u-1".into())).await.is_err());
        mock.clear_failure();
        assert!(mock.insert(&draft("u-1")).await.is_ok());
        assert_eq!(mock.calls(), 3);
    }
}
