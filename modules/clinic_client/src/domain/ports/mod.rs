pub mod auth;
pub mod storage;

pub use auth::AuthPort;
pub use storage::{SessionStorage, StorageError};

/// Output port: publish domain events (no knowledge of transport).
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}
