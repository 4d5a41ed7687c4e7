// SPDX-FileCopyrightText: 2026 Casetrace Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of gateways and stores for one CLI invocation.
//!
//! Everything is constructed here from the loaded configuration and passed
//! down explicitly. The auth and records clients are optional so that demo
//! sign-in keeps working with no backend configured.

use std::sync::Arc;

use tracing::debug;

use casetrace_config::CasetraceConfig;
use casetrace_core::{AuthGateway, AuthSession, CasetraceError, RecordsGateway};
use casetrace_gateway::{AuthClient, RecordsClient};
use casetrace_investigations::InvestigationStore;
use casetrace_session::{DemoGateway, SessionStore, DEMO_ACCESS_TOKEN};

use crate::token;

pub struct App {
    pub config: CasetraceConfig,
    pub session: Arc<SessionStore>,
    auth: Option<Arc<AuthClient>>,
    records: Option<Arc<RecordsClient>>,
    investigations: Option<InvestigationStore>,
}

impl App {
    /// Builds the full object graph from configuration plus the cached
    /// session, if one survives on disk.
    pub fn build(config: CasetraceConfig) -> Result<Self, CasetraceError> {
        let cached = token::load();
        let demo = DemoGateway::from_config(&config.demo);

        let auth = if config.gateway.base_url.is_some() {
            let mut client = AuthClient::new(&config.gateway)?;
            if let Some(session) = &cached {
                if session.access_token != DEMO_ACCESS_TOKEN {
                    client = client.with_restore_token(session.access_token.clone());
                }
            }
            Some(Arc::new(client))
        } else {
            debug!("no gateway.base_url configured, auth client disabled");
            None
        };

        let records = if config.gateway.base_url.is_some() {
            Some(Arc::new(RecordsClient::new(&config.gateway)?))
        } else {
            None
        };

        let session = Arc::new(SessionStore::new(
            auth.clone().map(|client| client as Arc<dyn AuthGateway>),
            demo,
        ));
        let investigations = records.clone().map(|client| {
            InvestigationStore::new(session.clone(), client as Arc<dyn RecordsGateway>)
        });

        Ok(Self {
            config,
            session,
            auth,
            records,
            investigations,
        })
    }

    /// Re-establishes the signed-in state from the cached session.
    ///
    /// A cached demo session is replayed locally through the demo gateway;
    /// a real one is verified against the backend. Either way the records
    /// client picks up the resulting access token.
    pub async fn restore(&self) -> Result<(), CasetraceError> {
        match token::load() {
            Some(session) if session.access_token == DEMO_ACCESS_TOKEN => {
                if self.config.demo.enabled {
                    self.session
                        .sign_in(&self.config.demo.email, &self.config.demo.password)
                        .await?;
                } else {
                    debug!("cached demo session but demo mode disabled, discarding");
                    token::clear();
                }
            }
            Some(_) => self.session.initialize().await?,
            None => {}
        }
        self.sync_records_auth().await;
        Ok(())
    }

    /// Points the records client at the current access token (or back at
    /// anonymous access after sign-out).
    pub async fn sync_records_auth(&self) {
        if let Some(records) = &self.records {
            records.authorize(self.session.access_token().await);
        }
    }

    /// The investigation store, which needs a configured backend.
    pub fn investigations(&self) -> Result<&InvestigationStore, CasetraceError> {
        self.investigations
            .as_ref()
            .ok_or_else(|| CasetraceError::Config("gateway.base_url is not set".into()))
    }

    pub fn auth_client(&self) -> Option<&Arc<AuthClient>> {
        self.auth.as_ref()
    }

    pub fn records_client(&self) -> Option<&Arc<RecordsClient>> {
        self.records.as_ref()
    }

    /// Signs in, caches the session, and authorizes the records client.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, CasetraceError> {
        let session = self.session.sign_in(email, password).await?;
        token::store(&session);
        self.sync_records_auth().await;
        Ok(session)
    }

    /// Clears the cached session and signs out.
    ///
    /// The cache and records authorization are cleared before the remote
    /// call, matching the store's optimistic sign-out.
    pub async fn logout(&self) -> Result<(), CasetraceError> {
        token::clear();
        let result = self.session.sign_out().await;
        self.sync_records_auth().await;
        result
    }
}
