use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::contract::client::{AppointmentsApi, ClinicalHistoryApi, PatientsApi};
use crate::contract::error::ClientError;
use crate::domain::dashboard::{self, DashboardSummary};
use crate::domain::events::SessionEvent;
use crate::domain::ports::{EventPublisher, SessionStorage};
use crate::domain::session::{SessionState, SessionStore};
use crate::gateways::RestGateway;
use crate::infra::http::ApiClient;

/// Fully wired client: session store, access layer and domain APIs sharing
/// one session.
#[derive(Clone)]
pub struct ClinicClient {
    session: SessionStore,
    gateway: Arc<RestGateway>,
}

impl ClinicClient {
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn SessionStorage>,
        events: Arc<dyn EventPublisher<SessionEvent>>,
    ) -> Result<Self, ClientError> {
        let state = Arc::new(SessionState::hydrate(storage, events));
        let api = ApiClient::new(config, state.clone())?;
        Ok(Self::assemble(state, api))
    }

    /// Same as [`ClinicClient::new`] but with a caller-built reqwest client.
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        storage: Arc<dyn SessionStorage>,
        events: Arc<dyn EventPublisher<SessionEvent>>,
    ) -> Result<Self, ClientError> {
        let state = Arc::new(SessionState::hydrate(storage, events));
        let api = ApiClient::with_http_client(http, base_url, state.clone())?;
        Ok(Self::assemble(state, api))
    }

    fn assemble(state: Arc<SessionState>, api: ApiClient) -> Self {
        debug!(authenticated = state.is_authenticated(), "Wiring clinic client");
        let gateway = Arc::new(RestGateway::new(api));
        let session = SessionStore::new(state, gateway.clone());
        info!("Clinic client ready");
        Self { session, gateway }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        self.gateway.api()
    }

    pub fn patients(&self) -> Arc<dyn PatientsApi> {
        self.gateway.clone()
    }

    pub fn appointments(&self) -> Arc<dyn AppointmentsApi> {
        self.gateway.clone()
    }

    pub fn history(&self) -> Arc<dyn ClinicalHistoryApi> {
        self.gateway.clone()
    }

    pub async fn dashboard(
        &self,
        now: chrono::NaiveDateTime,
    ) -> Result<DashboardSummary, ClientError> {
        dashboard::load_dashboard(
            self.gateway.as_ref(),
            self.gateway.as_ref(),
            self.gateway.as_ref(),
            now,
        )
        .await
    }
}
