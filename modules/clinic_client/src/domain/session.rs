use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::contract::error::ClientError;
use crate::contract::model::{Role, Session, User};
use crate::domain::events::SessionEvent;
use crate::domain::ports::{AuthPort, EventPublisher, SessionStorage, StorageError};

/// Durable key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Durable key holding the JSON-encoded `{username, rol}`.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// In-memory session plus its durable copy.
///
/// Shared between the session store (which establishes and clears it) and the
/// access layer (which reads the token and tears it down on 401/403).
pub struct SessionState {
    storage: Arc<dyn SessionStorage>,
    events: Arc<dyn EventPublisher<SessionEvent>>,
    current: RwLock<Option<Session>>,
}

impl SessionState {
    /// Restore the session persisted by a previous run. Missing or unreadable
    /// entries leave the state unauthenticated.
    pub fn hydrate(
        storage: Arc<dyn SessionStorage>,
        events: Arc<dyn EventPublisher<SessionEvent>>,
    ) -> Self {
        let current = match load_session(storage.as_ref()) {
            Ok(session) => session,
            Err(e) => {
                warn!("Could not read persisted session, starting logged out: {}", e);
                None
            }
        };
        if let Some(s) = &current {
            debug!(username = %s.user.username, "Restored persisted session");
        }
        Self {
            storage,
            events,
            current: RwLock::new(current),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.current.read().as_ref().map(|s| s.user.clone())
    }

    pub fn snapshot(&self) -> Option<Session> {
        self.current.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .as_ref()
            .is_some_and(|s| !s.token.is_empty())
    }

    /// Persist and install a fresh session, replacing any previous one.
    pub(crate) fn establish(&self, session: Session) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(&session.user).map_err(|e| StorageError::Corrupt {
            path: CURRENT_USER_KEY.to_string(),
            message: e.to_string(),
        })?;

        let persisted = self
            .storage
            .set(TOKEN_KEY, &session.token)
            .and_then(|_| self.storage.set(CURRENT_USER_KEY, &user_json));
        if let Err(e) = persisted {
            self.erase_durable();
            return Err(e);
        }

        let username = session.user.username.clone();
        *self.current.write() = Some(session);
        self.events.publish(&SessionEvent::LoggedIn {
            username,
            at: Utc::now(),
        });
        Ok(())
    }

    /// Explicit logout. Never fails.
    pub(crate) fn clear(&self) {
        self.erase_durable();
        *self.current.write() = None;
        self.events.publish(&SessionEvent::LoggedOut { at: Utc::now() });
    }

    /// The server rejected our credentials: drop everything we hold.
    pub(crate) fn invalidate(&self) {
        self.erase_durable();
        *self.current.write() = None;
        self.events.publish(&SessionEvent::Expired { at: Utc::now() });
    }

    fn erase_durable(&self) {
        for key in [TOKEN_KEY, CURRENT_USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, "Failed to erase persisted session entry: {}", e);
            }
        }
    }
}

fn load_session(storage: &dyn SessionStorage) -> Result<Option<Session>, StorageError> {
    let token = storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
    let user = storage.get(CURRENT_USER_KEY)?;

    let (Some(token), Some(raw_user)) = (token, user) else {
        return Ok(None);
    };

    match serde_json::from_str::<User>(&raw_user) {
        Ok(user) => Ok(Some(Session { token, user })),
        Err(e) => {
            warn!("Ignoring unreadable {} entry: {}", CURRENT_USER_KEY, e);
            Ok(None)
        }
    }
}

/// Single source of truth for "is a user authenticated" and "who are they".
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<SessionState>,
    auth: Arc<dyn AuthPort>,
}

impl SessionStore {
    pub fn new(state: Arc<SessionState>, auth: Arc<dyn AuthPort>) -> Self {
        Self { state, auth }
    }

    #[instrument(name = "clinic_client.session.login", skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let response = self.auth.login(username, password).await?;

        let user = User {
            username: response.username,
            role: response.role,
        };
        self.state.establish(Session {
            token: response.token,
            user: user.clone(),
        })?;

        info!(role = %user.role, "Logged in");
        Ok(user)
    }

    #[instrument(name = "clinic_client.session.register", skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<(), ClientError> {
        self.auth.register(username, password, role).await?;
        info!("Registered new user");
        Ok(())
    }

    /// Forget the session locally. No network call; idempotent.
    #[instrument(name = "clinic_client.session.logout", skip(self))]
    pub fn logout(&self) {
        self.state.clear();
        info!("Logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.user()
    }

    pub fn token(&self) -> Option<String> {
        self.state.token()
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::events::RecordingPublisher;
    use crate::infra::storage::MemorySessionStorage;

    fn state_with(storage: Arc<MemorySessionStorage>) -> (SessionState, Arc<RecordingPublisher>) {
        let events = Arc::new(RecordingPublisher::default());
        (SessionState::hydrate(storage, events.clone()), events)
    }

    fn session() -> Session {
        Session {
            token: "tok-123".into(),
            user: User {
                username: "drperez".into(),
                role: Role::Medico,
            },
        }
    }

    #[test]
    fn hydrate_from_empty_storage_is_logged_out() {
        let (state, _) = state_with(Arc::new(MemorySessionStorage::default()));
        assert!(!state.is_authenticated());
        assert!(state.user().is_none());
    }

    #[test]
    fn hydrate_requires_both_entries() {
        let storage = Arc::new(MemorySessionStorage::default());
        storage.set(TOKEN_KEY, "tok").unwrap();
        let (state, _) = state_with(storage);
        assert!(!state.is_authenticated());
    }

    #[test]
    fn hydrate_ignores_corrupt_user_blob() {
        let storage = Arc::new(MemorySessionStorage::default());
        storage.set(TOKEN_KEY, "tok").unwrap();
        storage.set(CURRENT_USER_KEY, "{not json").unwrap();
        let (state, _) = state_with(storage);
        assert!(!state.is_authenticated());
    }

    #[test]
    fn establish_persists_both_entries() {
        let storage = Arc::new(MemorySessionStorage::default());
        let (state, events) = state_with(storage.clone());

        state.establish(session()).unwrap();

        assert!(state.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-123"));
        let stored: User =
            serde_json::from_str(&storage.get(CURRENT_USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, session().user);
        assert!(matches!(
            events.events().as_slice(),
            [SessionEvent::LoggedIn { username, .. }] if username == "drperez"
        ));

        let (restored, _) = state_with(storage);
        assert_eq!(restored.snapshot(), Some(session()));
    }

    #[test]
    fn clear_is_idempotent() {
        let storage = Arc::new(MemorySessionStorage::default());
        let (state, _) = state_with(storage.clone());
        state.establish(session()).unwrap();

        state.clear();
        state.clear();

        assert!(!state.is_authenticated());
        assert!(storage.get(TOKEN_KEY).unwrap().is_none());
        assert!(storage.get(CURRENT_USER_KEY).unwrap().is_none());
    }

    #[test]
    fn invalidate_publishes_expired() {
        let storage = Arc::new(MemorySessionStorage::default());
        let (state, events) = state_with(storage.clone());
        state.establish(session()).unwrap();

        state.invalidate();

        assert!(storage.is_empty());
        assert!(matches!(
            events.events().last(),
            Some(SessionEvent::Expired { .. })
        ));
    }
}
