//! Periodic login loop
//!
//! One task alternates between a ticker and a shutdown signal. Each tick runs
//! exactly one login; the next tick is not considered until that login has
//! returned, so attempts never overlap. The first failed login ends the loop.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use crate::client::AuthApi;
use crate::config::MAX_DURATION_SECS;
use crate::error::{Error, Result};
use crate::token::Credential;

/// Why the loop stopped
#[derive(Debug)]
pub enum StopReason {
    /// A termination signal was received
    Signal,
    /// A login attempt failed
    AuthFailed(Error),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Signal => f.write_str("shutdown signal"),
            StopReason::AuthFailed(err) => write!(f, "login failed: {}", err),
        }
    }
}

/// Terminal state of the loop
#[derive(Debug)]
pub struct Stopped {
    pub reason: StopReason,
    /// Login attempts made, including the failed one
    pub attempts: u64,
}

/// Run logins every `interval` until `shutdown` resolves or a login fails.
///
/// The first login happens one full interval after the call. A signal that
/// arrives during a login is acted on once that login returns. Intervals
/// longer than a day are clamped to one day.
pub async fn run_loop<A, F>(
    api: &A,
    credential: &Credential,
    interval: Duration,
    shutdown: F,
) -> Stopped
where
    A: AuthApi + ?Sized,
    F: Future<Output = ()>,
{
    let interval = interval.min(Duration::from_secs(MAX_DURATION_SECS));
    let first_tick = Instant::now()
        .checked_add(interval)
        .unwrap_or_else(Instant::now);
    let mut ticker = time::interval_at(first_tick, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut attempts: u64 = 0;

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                return Stopped { reason: StopReason::Signal, attempts };
            }
            _ = ticker.tick() => {
                attempts += 1;
                log::debug!("Login attempt {}", attempts);

                if let Err(err) = api.login(credential).await {
                    log::error!("Login attempt {} failed: {}", attempts, err);
                    return Stopped { reason: StopReason::AuthFailed(err), attempts };
                }
            }
        }
    }
}

/// Run a single login immediately
pub async fn run_once<A>(api: &A, credential: &Credential) -> Result<()>
where
    A: AuthApi + ?Sized,
{
    let response = api.login(credential).await?;
    log::debug!("One-shot login returned HTTP {}", response.status);
    Ok(())
}

/// Termination signals the loop listens for.
///
/// Handlers are registered on construction so a signal delivered during the
/// first login is not lost. SIGKILL cannot be caught and is not listed.
pub struct ShutdownSignal {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    pub fn install() -> Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            Ok(Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Wait for the first termination signal
    pub async fn recv(self) {
        #[cfg(unix)]
        {
            let Self {
                mut interrupt,
                mut terminate,
            } = self;
            tokio::select! {
                _ = interrupt.recv() => log::info!("Received SIGINT"),
                _ = terminate.recv() => log::info!("Received SIGTERM"),
            }
        }

        #[cfg(not(unix))]
        {
            match tokio::signal::ctrl_c().await {
                Ok(()) => log::info!("Received Ctrl-C"),
                Err(e) => {
                    log::error!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}
