use async_trait::async_trait;

use crate::contract::error::ClientError;
use crate::contract::model::{LoginResponse, Role};

/// Remote authentication endpoints the session store delegates to.
#[async_trait]
pub trait AuthPort: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError>;

    async fn register(&self, username: &str, password: &str, role: Role)
        -> Result<(), ClientError>;
}
