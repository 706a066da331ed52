use parking_lot::Mutex;
use tracing::{info, warn};

use crate::domain::events::SessionEvent;
use crate::domain::ports::EventPublisher;

/// Default publisher: session changes end up in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

impl EventPublisher<SessionEvent> for TracingPublisher {
    fn publish(&self, event: &SessionEvent) {
        match event {
            SessionEvent::LoggedIn { username, at } => {
                info!(%username, %at, "session established")
            }
            SessionEvent::LoggedOut { at } => info!(%at, "session closed"),
            SessionEvent::Expired { at } => warn!(%at, "session expired, login required"),
        }
    }
}

/// Keeps every published event; lets callers (and tests) react after the fact.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().clone()
    }

    pub fn saw_expiry(&self) -> bool {
        self.events
            .lock()
            .iter()
            .any(|e| matches!(e, SessionEvent::Expired { .. }))
    }
}

impl EventPublisher<SessionEvent> for RecordingPublisher {
    fn publish(&self, event: &SessionEvent) {
        self.events.lock().push(event.clone());
    }
}
