//! Simulated network.
//!
//! Every service call waits a latency proportional to a configured base
//! before running. A latency longer than the timeout fails the call before
//! anything runs.

use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::error::ApiError;

/// Share of the base latency an operation waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Latency {
    /// The whole base latency (authentication, subscriptions, event writes).
    Full,
    Half,
    Third,
    /// `numerator / 8` of the base: 5/8 for profile writes, 3/8 for
    /// bookmark toggles and read-state updates.
    Eighths(u32),
}

impl Latency {
    pub fn of(self, base: Duration) -> Duration {
        match self {
            Latency::Full => base,
            Latency::Half => base / 2,
            Latency::Third => base / 3,
            Latency::Eighths(n) => base * n / 8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Network {
    base: Duration,
    timeout: Duration,
}

impl Network {
    pub fn new(base: Duration, timeout: Duration) -> Self {
        Self { base, timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.base_latency(), config.call_timeout())
    }

    /// No latency; calls still time out.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::from_secs(30))
    }

    /// Runs `call` after the simulated latency.
    ///
    /// Only the latency counts against the timeout. Once `call` starts it
    /// runs to completion, so a commit is never cut off between its writes.
    pub async fn call<T, F>(
        &self,
        operation: &'static str,
        latency: Latency,
        call: F,
    ) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let delay = latency.of(self.base);
        let delivered = delay.is_zero()
            || tokio::time::timeout(self.timeout, tokio::time::sleep(delay))
                .await
                .is_ok();
        if !delivered {
            tracing::warn!(
                operation,
                timeout_ms = self.timeout.as_millis() as u64,
                "Call timed out"
            );
            return Err(ApiError::Timeout(operation));
        }

        let result = call.await;
        if let Err(e) = &result {
            tracing::debug!(operation, code = e.code(), "Call failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_fractions() {
        let base = Duration::from_millis(800);
        assert_eq!(Latency::Full.of(base), Duration::from_millis(800));
        assert_eq!(Latency::Half.of(base), Duration::from_millis(400));
        assert_eq!(Latency::Third.of(base), Duration::from_nanos(266_666_666));
        assert_eq!(Latency::Eighths(5).of(base), Duration::from_millis(500));
        assert_eq!(Latency::Eighths(3).of(base), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_waits_latency() {
        let network = Network::new(Duration::from_millis(800), Duration::from_secs(5));
        let start = tokio::time::Instant::now();

        let value = network
            .call("lookup", Latency::Half, async { Ok::<_, ApiError>(7) })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_times_out() {
        let network = Network::new(Duration::from_millis(800), Duration::from_millis(100));
        let result = network
            .call("slow", Latency::Full, async { Ok::<_, ApiError>(()) })
            .await;
        assert!(matches!(result, Err(ApiError::Timeout("slow"))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_is_not_cut_off() {
        let network = Network::new(Duration::from_millis(80), Duration::from_millis(100));
        let ran = std::sync::atomic::AtomicBool::new(false);

        let result = network
            .call("commit", Latency::Full, async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                ran.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok::<_, ApiError>(())
            })
            .await;

        assert!(result.is_ok());
        assert!(ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_call_never_runs() {
        let network = Network::new(Duration::from_millis(800), Duration::from_millis(100));
        let ran = std::sync::atomic::AtomicBool::new(false);

        let result = network
            .call("write", Latency::Full, async {
                ran.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok::<_, ApiError>(())
            })
            .await;

        assert!(matches!(result, Err(ApiError::Timeout("write"))));
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let result: Result<(), ApiError> = Network::instant()
            .call("lookup", Latency::Full, async { Err(ApiError::InvalidCredentials) })
            .await;
        assert!(matches!(result, Err(ApiError::InvalidCredentials)));
    }
}
