//! HTTP login client implementation

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::AuthApi;
use super::models::{AuthRequest, AuthResponse};
use crate::config::{Settings, TlsPolicy};
use crate::error::{ApiError, Result};
use crate::token::Credential;

/// Longest error body kept in an [`ApiError::Status`]
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Client for the Kubernetes auth login endpoint.
///
/// The underlying reqwest client (and its connection pool) is built once and
/// reused for every login.
pub struct LoginClient {
    http: HttpClient,
    url: String,
    role: String,
}

impl LoginClient {
    /// Create a new login client from resolved settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut builder = HttpClient::builder()
            .timeout(settings.timeout)
            .pool_max_idle_per_host(settings.pool_max_idle)
            .pool_idle_timeout(settings.pool_idle_timeout)
            .user_agent(concat!("sa-login/", env!("CARGO_PKG_VERSION")));

        if settings.tls == TlsPolicy::AcceptInvalidCerts {
            log::warn!("TLS certificate verification is disabled; any server certificate is trusted");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            url: settings.endpoint.url(),
            role: settings.role.clone(),
        })
    }

    /// Login URL this client posts to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AuthApi for LoginClient {
    async fn login(&self, credential: &Credential) -> Result<AuthResponse> {
        let request = AuthRequest::new(&self.role, credential);
        log::info!("Sending login request to {}: {:?}", self.url, request);

        let response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "*/*")
            .json(&request)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        log::info!("Login response status: {}", status.as_u16());

        let response_text = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            }
            .into());
        }

        let body: serde_json::Value = serde_json::from_str(&response_text).map_err(|e| {
            ApiError::InvalidResponse(format!("Response body is not valid JSON: {}", e))
        })?;

        let auth = AuthResponse {
            status: status.as_u16(),
            body,
        };
        log::info!("{}", auth.pretty()?);

        Ok(auth)
    }
}
