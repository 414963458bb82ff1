//! Authentication models

use serde::{Serialize, Serializer};

use crate::token::Credential;

/// Login request body: `{"role": ..., "jwt": ...}`
///
/// `Debug` shows the credential redacted, so the request can be logged.
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest<'a> {
    /// Role bound to the calling workload
    pub role: &'a str,

    /// Service account token
    #[serde(rename = "jwt", serialize_with = "serialize_credential")]
    pub credential: &'a Credential,
}

impl<'a> AuthRequest<'a> {
    pub fn new(role: &'a str, credential: &'a Credential) -> Self {
        Self { role, credential }
    }
}

fn serialize_credential<S: Serializer>(
    credential: &&Credential,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(credential.expose())
}

/// Login response: status plus an arbitrary JSON document
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResponse {
    /// HTTP status code
    pub status: u16,

    /// Parsed response body, never interpreted
    pub body: serde_json::Value,
}

impl AuthResponse {
    /// Body pretty-printed with 2-space indentation
    pub fn pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.body)
    }
}
