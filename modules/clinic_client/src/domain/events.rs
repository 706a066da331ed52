use chrono::{DateTime, Utc};

/// Session lifecycle changes, published for whoever drives the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { username: String, at: DateTime<Utc> },
    LoggedOut { at: DateTime<Utc> },
    /// The server rejected the token (401/403); the user must log in again.
    Expired { at: DateTime<Utc> },
}
