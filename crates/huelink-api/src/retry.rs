// Bounded retry for transient transport failures.
//
// Bridges refuse connections under load and take a moment to come back
// after a restart. Failures to connect are retried up to a fixed budget;
// timeouts and everything else are returned immediately. A cancelled
// token stops the loop before the next attempt.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, is_transient};

/// Retry budget for a single logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 256,
            delay: Duration::from_millis(20),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Send the request produced by `build`, rebuilding it for every attempt.
    pub async fn send<F>(&self, build: F) -> Result<reqwest::Response, Error>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        self.send_cancellable(&CancellationToken::new(), build).await
    }

    /// Like [`send`](Self::send), but gives up between attempts once
    /// `cancel` fires, returning the last transport error.
    pub async fn send_cancellable<F>(
        &self,
        cancel: &CancellationToken,
        build: F,
    ) -> Result<reqwest::Response, Error>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt: u32 = 0;
        loop {
            match build().send().await {
                Ok(resp) => return Ok(resp),
                Err(e) if is_transient(&e) && attempt < self.max_retries => {
                    if cancel.is_cancelled() {
                        debug!(attempt, "cancelled, not retrying");
                        return Err(Error::Transport(e));
                    }
                    attempt += 1;
                    debug!(attempt, error = %e, "connection failed, retrying");
                    if !self.delay.is_zero() {
                        tokio::select! {
                            () = cancel.cancelled() => return Err(Error::Transport(e)),
                            () = tokio::time::sleep(self.delay) => {}
                        }
                    }
                }
                Err(e) if is_transient(&e) && self.max_retries > 0 => {
                    warn!(attempts = attempt + 1, "retry budget exhausted");
                    return Err(Error::RetriesExhausted {
                        attempts: attempt + 1,
                        source: e,
                    });
                }
                Err(e) => return Err(Error::Transport(e)),
            }
        }
    }
}
