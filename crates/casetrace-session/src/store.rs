// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single source of truth for "who is signed in".
//!
//! The store owns the current user, the live session, and a `loading` flag
//! that is true only while an auth call is in flight. Every mutation of
//! session state goes through the auth-event channel: `apply_event` is the
//! only writer, and subscribers observe the same events the store itself
//! applies.
//!
//! Sign-out is optimistic-then-confirmed: local state clears immediately
//! and the remote invalidation happens afterwards. A remote sign-out
//! failure is returned to the caller but does not restore the cleared
//! state; the next `initialize` re-syncs against the gateway.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use casetrace_core::{AuthEvent, AuthGateway, AuthSession, AuthUser, CasetraceError};

use crate::demo::{DemoGateway, DEMO_ACCESS_TOKEN};

/// Capacity of the auth-event broadcast channel. Events are small and
/// consumers are expected to keep up; lagging receivers skip ahead.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// A point-in-time view of session state, consumed by the route guards.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub user: Option<AuthUser>,
    pub loading: bool,
}

#[derive(Debug, Default)]
struct Inner {
    user: Option<AuthUser>,
    session: Option<AuthSession>,
    loading: bool,
}

/// Process-wide session store.
///
/// Constructed once at startup and passed explicitly to consumers; there is
/// no global instance. The real auth gateway is optional so the demo
/// sign-in path keeps working with no backend configured.
pub struct SessionStore {
    gateway: Option<Arc<dyn AuthGateway>>,
    demo: Option<DemoGateway>,
    inner: RwLock<Inner>,
    events: broadcast::Sender<AuthEvent>,
}

impl SessionStore {
    /// Creates a new store over an optional real gateway and an optional
    /// demo gateway.
    pub fn new(gateway: Option<Arc<dyn AuthGateway>>, demo: Option<DemoGateway>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            gateway,
            demo,
            inner: RwLock::new(Inner::default()),
            events,
        }
    }

    /// Subscribes to the auth-event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Returns a point-in-time view of session state.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.read().await;
        SessionSnapshot {
            user: inner.user.clone(),
            loading: inner.loading,
        }
    }

    /// Returns the signed-in user, if any.
    pub async fn current_user(&self) -> Option<AuthUser> {
        self.inner.read().await.user.clone()
    }

    /// Returns the live session's access token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Attempts to recover an existing remote session.
    ///
    /// Called once at startup. With no gateway configured this is a no-op
    /// that leaves the store signed out.
    pub async fn initialize(&self) -> Result<(), CasetraceError> {
        self.set_loading(true).await;
        let result = self.restore().await;
        self.set_loading(false).await;
        result
    }

    async fn restore(&self) -> Result<(), CasetraceError> {
        let Some(gateway) = &self.gateway else {
            debug!("no auth gateway configured, starting signed out");
            return Ok(());
        };
        match gateway.current_session().await? {
            Some(session) => {
                info!(user_id = %session.user.id, "recovered existing session");
                self.apply_event(AuthEvent::SessionRestored(session)).await;
            }
            None => debug!("no existing session to recover"),
        }
        Ok(())
    }

    /// Registers a new account.
    ///
    /// Only the password's non-emptiness is checked locally; everything
    /// else is delegated to the gateway, whose error message is returned
    /// verbatim.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: BTreeMap<String, serde_json::Value>,
    ) -> Result<AuthSession, CasetraceError> {
        if password.is_empty() {
            return Err(CasetraceError::Auth("Password must not be empty".into()));
        }
        let gateway = self.gateway.clone().ok_or_else(|| {
            CasetraceError::Config("gateway.base_url is not set".into())
        })?;

        self.set_loading(true).await;
        let result = gateway.sign_up(email, password, metadata).await;
        self.set_loading(false).await;

        let session = result?;
        self.apply_event(AuthEvent::SignedIn(session.clone())).await;
        Ok(session)
    }

    /// Exchanges credentials for a session.
    ///
    /// The demo gateway is tried first when the submitted credentials match
    /// the configured demo pair, and again as a fallback when the real
    /// gateway call fails — the demo path must succeed even with the
    /// backend unreachable.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, CasetraceError> {
        if password.is_empty() {
            return Err(CasetraceError::Auth("Password must not be empty".into()));
        }

        self.set_loading(true).await;
        let result = self.sign_in_inner(email, password).await;
        self.set_loading(false).await;

        let session = result?;
        self.apply_event(AuthEvent::SignedIn(session.clone())).await;
        Ok(session)
    }

    async fn sign_in_inner(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, CasetraceError> {
        if let Some(demo) = &self.demo {
            if demo.matches(email, password) {
                return demo.sign_in(email, password).await;
            }
        }

        let Some(gateway) = &self.gateway else {
            return Err(CasetraceError::Config("gateway.base_url is not set".into()));
        };

        match gateway.sign_in(email, password).await {
            Ok(session) => Ok(session),
            Err(err) => {
                // Fallback: the demo pair must work even when the real
                // gateway throws.
                if let Some(demo) = &self.demo {
                    if demo.matches(email, password) {
                        warn!(error = %err, "gateway sign-in failed, using demo fallback");
                        return demo.sign_in(email, password).await;
                    }
                }
                Err(err)
            }
        }
    }

    /// Ends the current session.
    ///
    /// Local state clears before the remote call; a remote failure is
    /// returned but never restores the cleared session.
    pub async fn sign_out(&self) -> Result<(), CasetraceError> {
        self.set_loading(true).await;

        let token = {
            let inner = self.inner.read().await;
            inner.session.as_ref().map(|s| s.access_token.clone())
        };
        self.apply_event(AuthEvent::SignedOut).await;

        let result = match (&self.gateway, token) {
            // Demo sessions have nothing remote to invalidate.
            (_, Some(token)) if token == DEMO_ACCESS_TOKEN => Ok(()),
            (Some(gateway), Some(token)) => {
                let r = gateway.sign_out(&token).await;
                if let Err(ref err) = r {
                    warn!(error = %err, "remote sign-out failed; local session already cleared");
                }
                r
            }
            _ => Ok(()),
        };

        self.set_loading(false).await;
        result
    }

    /// Applies an auth event to local state and publishes it.
    ///
    /// This is the only code path that writes `user` and `session`.
    async fn apply_event(&self, event: AuthEvent) {
        {
            let mut inner = self.inner.write().await;
            match &event {
                AuthEvent::SignedIn(session) | AuthEvent::SessionRestored(session) => {
                    inner.user = Some(session.user.clone());
                    inner.session = Some(session.clone());
                }
                AuthEvent::SignedOut => {
                    inner.user = None;
                    inner.session = None;
                }
            }
        }
        // No receivers is fine; the store itself already applied the event.
        let _ = self.events.send(event);
    }

    async fn set_loading(&self, loading: bool) {
        self.inner.write().await.loading = loading;
    }
}
