#![allow(dead_code)]

use std::sync::Arc;

use clinic_client::domain::ports::SessionStorage;
use clinic_client::domain::session::{CURRENT_USER_KEY, TOKEN_KEY};
use clinic_client::infra::events::RecordingPublisher;
use clinic_client::infra::storage::MemorySessionStorage;
use clinic_client::{ClientConfig, ClinicClient};
use httpmock::MockServer;

pub struct Harness {
    pub client: ClinicClient,
    pub storage: Arc<MemorySessionStorage>,
    pub events: Arc<RecordingPublisher>,
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig {
        base_url: server.base_url(),
        timeout_sec: 5,
    }
}

pub fn client_on(server: &MockServer, storage: Arc<dyn SessionStorage>) -> (ClinicClient, Arc<RecordingPublisher>) {
    let events = Arc::new(RecordingPublisher::default());
    let client = ClinicClient::new(&config_for(server), storage, events.clone())
        .expect("client should build");
    (client, events)
}

/// Client with no persisted session.
pub fn anonymous(server: &MockServer) -> Harness {
    let storage = Arc::new(MemorySessionStorage::default());
    let (client, events) = client_on(server, storage.clone());
    Harness {
        client,
        storage,
        events,
    }
}

/// Client restored from a session persisted as `token` / `currentUser`.
pub fn logged_in(server: &MockServer, token: &str) -> Harness {
    let storage = Arc::new(MemorySessionStorage::default());
    storage.set(TOKEN_KEY, token).unwrap();
    storage
        .set(CURRENT_USER_KEY, r#"{"username":"drperez","rol":"MEDICO"}"#)
        .unwrap();
    let (client, events) = client_on(server, storage.clone());
    Harness {
        client,
        storage,
        events,
    }
}
