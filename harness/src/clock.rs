//! Clock abstraction so every wait in the harness is injectable.
//!
//! Production code sleeps through [`SystemClock`]; tests pair
//! [`PausedClock`] with tokio's paused runtime and advance time explicitly,
//! which makes the poller's backoff schedule observable without real delays.

use std::future::Future;
use std::pin::Pin;
use tokio::time::{self, Duration, Instant};

/// Time source and sleep facility for the harness.
///
/// Backoff waits are the harness's only suspension points, and all of them
/// go through this trait.
pub trait Clock: Send + Sync {
    /// Current instant; simulated time under a paused runtime.
    fn now(&self) -> Instant;

    /// Sleep for the given duration.
    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Real wall-clock time, used by the binary.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        time::Instant::now()
    }

    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(time::sleep(d))
    }
}

/// Paused clock for deterministic tests.
///
/// Construct inside a plain `#[tokio::test]`; the constructor pauses tokio
/// time, after which sleeps resolve instantly once time is advanced (or
/// auto-advanced by an otherwise idle runtime). With
/// `#[tokio::test(start_paused = true)]` use [`SystemClock`] directly
/// instead, since time is already paused there.
pub struct PausedClock;

impl PausedClock {
    pub fn new() -> Self {
        time::pause();
        Self
    }

    /// Manually advance simulated time, waking any sleeps that expire.
    pub async fn advance(&self, d: Duration) {
        time::advance(d).await
    }
}

impl Clock for PausedClock {
    fn now(&self) -> Instant {
        time::Instant::now()
    }

    fn sleep(&self, d: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(time::sleep(d))
    }
}

impl Default for PausedClock {
    fn default() -> Self {
        Self::new()
    }
}
