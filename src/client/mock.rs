//! Mock auth client for testing
//!
//! Replays scripted outcomes and records how many logins ran and how many
//! overlapped, without making real HTTP calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::AuthApi;
use super::models::AuthResponse;
use crate::error::{ApiError, Result};
use crate::token::Credential;

/// Outcome of one scripted login
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Success(serde_json::Value),
    Failure(String),
}

/// Mock API client for testing.
///
/// Outcomes are consumed in order; once exhausted every login succeeds with
/// an empty object.
#[derive(Default)]
pub struct MockAuthClient {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    credentials: Arc<Mutex<Vec<String>>>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockAuthClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for upcoming logins
    pub fn with_outcomes(mut self, outcomes: Vec<MockOutcome>) -> Self {
        self.outcomes = Arc::new(Mutex::new(outcomes.into()));
        self
    }

    /// Make every login take this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of logins started
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of logins observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Raw credentials received, in order
    pub async fn credentials(&self) -> Vec<String> {
        self.credentials.lock().await.clone()
    }
}

#[async_trait]
impl AuthApi for MockAuthClient {
    async fn login(&self, credential: &Credential) -> Result<AuthResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        self.credentials
            .lock()
            .await
            .push(credential.expose().to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let outcome = self.outcomes.lock().await.pop_front();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            Some(MockOutcome::Failure(msg)) => Err(ApiError::Network(msg).into()),
            Some(MockOutcome::Success(body)) => Ok(AuthResponse { status: 200, body }),
            None => Ok(AuthResponse {
                status: 200,
                body: serde_json::json!({}),
            }),
        }
    }
}
