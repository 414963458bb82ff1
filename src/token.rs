//! Service account token handling

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::TokenError;

/// Service account token presented to the auth endpoint.
///
/// The raw value is only reachable through [`Credential::expose`]; `Debug`
/// and `Display` are redacted so it cannot end up in log lines.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building the request body
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the non-secret claims if the token is a JWT.
    ///
    /// Returns `None` for opaque tokens or payloads that fail to decode.
    pub fn claims(&self) -> Option<TokenClaims> {
        let mut parts = self.0.trim().split('.');
        let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let payload_bytes = base64_decode_url(payload).ok()?;
        serde_json::from_slice(&payload_bytes).ok()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<redacted, {} bytes>)", self.0.len())
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Claims from a service account JWT that are safe to log
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub iss: Option<String>,

    #[serde(default)]
    pub sub: Option<String>,

    /// Expiry as a Unix timestamp
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// True if the token carries an expiry that is already in the past
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at(), Some(expires_at) if expires_at <= now)
    }
}

/// Decode base64url (URL-safe base64, padding optional)
fn base64_decode_url(input: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    use base64::{Engine as _, engine::general_purpose};

    general_purpose::URL_SAFE_NO_PAD.decode(input.trim_end_matches('='))
}

/// Read the whole token file. Contents are kept verbatim.
pub fn read_token(path: &Path) -> Result<Credential, TokenError> {
    let token = std::fs::read_to_string(path).map_err(|source| TokenError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Credential::new(token))
}

/// Log what is known about the token without revealing it
pub fn log_token_summary(credential: &Credential) {
    if credential.is_empty() {
        log::warn!("Service account token file is empty");
        return;
    }

    match credential.claims() {
        Some(claims) => {
            log::info!(
                "Loaded service account token (subject: {}, issuer: {})",
                claims.sub.as_deref().unwrap_or("unknown"),
                claims.iss.as_deref().unwrap_or("unknown"),
            );
            if let Some(expires_at) = claims.expires_at() {
                if claims.is_expired(Utc::now()) {
                    log::warn!("Service account token expired at {}", expires_at.to_rfc3339());
                } else {
                    log::info!("Service account token expires at {}", expires_at.to_rfc3339());
                }
            }
        }
        None => log::info!("Loaded opaque service account token ({} bytes)", credential.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose};
    use tempfile::tempdir;

    fn make_jwt(payload: &str) -> String {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#);
        let body = general_purpose::URL_SAFE_NO_PAD.encode(payload);
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn test_read_token_keeps_contents_verbatim() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("token");
        std::fs::write(&path, "abc.def.ghi\n").unwrap();

        let credential = read_token(&path).unwrap();
        assert_eq!(credential.expose(), "abc.def.ghi\n");
    }

    #[test]
    fn test_read_token_missing_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("does-not-exist");

        let err = read_token(&path).unwrap_err();
        let TokenError::Unreadable { path: err_path, source } = err;
        assert_eq!(err_path, path);
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_read_token_rejects_invalid_utf8() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("token");
        std::fs::write(&path, [0x65, 0xff, 0xfe, 0x2e]).unwrap();

        let err = read_token(&path).unwrap_err();
        let TokenError::Unreadable { path: err_path, source } = err;
        assert_eq!(err_path, path);
        assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_credential_is_redacted() {
        let credential = Credential::new("super-secret-token");

        assert!(!format!("{:?}", credential).contains("super-secret-token"));
        assert!(!format!("{}", credential).contains("super-secret-token"));
        assert_eq!(credential.expose(), "super-secret-token");
    }

    #[test]
    fn test_claims_from_jwt() {
        let token = make_jwt(
            r#"{"iss":"kubernetes/serviceaccount","sub":"system:serviceaccount:default:testapp","exp":4102444800}"#,
        );
        let claims = Credential::new(token).claims().unwrap();

        assert_eq!(
            claims.sub.as_deref(),
            Some("system:serviceaccount:default:testapp")
        );
        assert_eq!(claims.iss.as_deref(), Some("kubernetes/serviceaccount"));
        assert_eq!(claims.expires_at().unwrap().to_rfc3339(), "2100-01-01T00:00:00+00:00");
        assert!(!claims.is_expired(Utc::now()));
    }

    #[test]
    fn test_claims_expired() {
        let token = make_jwt(r#"{"sub":"system:serviceaccount:default:testapp","exp":1}"#);
        let claims = Credential::new(token).claims().unwrap();
        assert!(claims.is_expired(Utc::now()));
    }

    #[test]
    fn test_claims_tolerate_trailing_newline() {
        let token = format!("{}\n", make_jwt(r#"{"sub":"svc"}"#));
        let claims = Credential::new(token).claims().unwrap();
        assert_eq!(claims.sub.as_deref(), Some("svc"));
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_claims_opaque_token() {
        assert!(Credential::new("not-a-jwt").claims().is_none());
        assert!(Credential::new("a.b").claims().is_none());
        assert!(Credential::new("a.b.c.d").claims().is_none());
        assert!(Credential::new("a.!!!.c").claims().is_none());
    }
}
