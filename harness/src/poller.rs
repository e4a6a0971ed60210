//! Bounded retry with exponential backoff.
//!
//! The harness's one reusable waiting primitive: it probes an operation
//! until a predicate accepts the observation, backing off exponentially
//! between attempts. Used both for cluster sync readiness and for
//! transaction confirmation.

use std::future::Future;
use std::time::Duration;

use log::{debug, trace, warn};

use crate::clock::Clock;
use crate::config::{DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_BASE_DELAY_SECS, DEFAULT_POLL_MULTIPLIER};

/// Backoff schedule of a poll loop.
///
/// The delay after failed attempt `i` (0-based) is
/// `base_delay * multiplier^i`; with the defaults (16 attempts, 1s base,
/// multiplier 2) the worst-case cumulative wait is `2^16 - 1` seconds.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl BackoffConfig {
    /// Delay slot for the given 0-based attempt index.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * self.multiplier.saturating_pow(attempt)
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_POLL_ATTEMPTS,
            base_delay: Duration::from_secs(DEFAULT_POLL_BASE_DELAY_SECS),
            multiplier: DEFAULT_POLL_MULTIPLIER,
        }
    }
}

/// What a poll loop ended with.
///
/// Exhaustion is an outcome, not an error: the last unsuccessful
/// observation is handed back and the caller decides whether continuing
/// past it is acceptable.
#[derive(Debug)]
pub enum PollOutcome<T> {
    Satisfied { value: T, attempts: u32 },
    Exhausted { last: T, attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Satisfied { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Satisfied { value, .. } => value,
            Self::Exhausted { last, .. } => last,
        }
    }
}

/// Poll `operation` until `predicate` accepts its observation.
///
/// Attempt 0 runs immediately; the first accepted observation returns
/// [`PollOutcome::Satisfied`] at once, skipping the remaining schedule.
/// Every failed attempt sleeps its backoff slot before the loop moves on,
/// so an exhausted run has waited the full schedule. Operation errors are
/// not retried; they propagate to the caller immediately. Only negative
/// observations consume the attempt budget.
pub async fn poll_until<T, E, F, Fut, P>(
    clock: &dyn Clock,
    config: &BackoffConfig,
    mut operation: F,
    mut predicate: P,
) -> Result<PollOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&T) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempts = 0u32;

    loop {
        let observation = operation().await?;
        attempts += 1;

        if predicate(&observation) {
            trace!("predicate satisfied on attempt {}", attempts);
            return Ok(PollOutcome::Satisfied {
                value: observation,
                attempts,
            });
        }

        let delay = config.delay_for(attempts - 1);
        debug!(
            "attempt {}/{} unsatisfied, backing off {:?}",
            attempts, max_attempts, delay
        );
        clock.sleep(delay).await;

        if attempts >= max_attempts {
            warn!("poll budget exhausted after {} attempts", attempts);
            return Ok(PollOutcome::Exhausted {
                last: observation,
                attempts,
            });
        }
    }
}
