//! Authentication API trait

use async_trait::async_trait;

use crate::client::models::AuthResponse;
use crate::error::Result;
use crate::token::Credential;

/// Login operations against the auth endpoint
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Perform one login with the service account credential.
    ///
    /// Any failure (transport, non-2xx status, unparseable body) is an error.
    async fn login(&self, credential: &Credential) -> Result<AuthResponse>;
}
