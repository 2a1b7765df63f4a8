//! Per-scraper pacing between scraping operations.
//!
//! Every scraper owns its own gate; pacing is deliberately not shared
//! global state, so one slow site never throttles another. The delay is
//! jittered so request timing does not look machine-regular to site
//! defenses.

use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

/// Fallback inter-request delay when the source does not configure one.
pub const DEFAULT_DELAY_MS: u64 = 1_200;

/// Jitter applied to every wait: the configured delay scaled by a factor
/// drawn uniformly from `1.0 ± JITTER_FRACTION`.
const JITTER_FRACTION: f64 = 0.25;

/// Awaitable gate enforcing a minimum (jittered) spacing between
/// operations.
#[derive(Debug)]
pub struct RateGate {
    delay: Duration,
    last_pass: Option<Instant>,
}

impl RateGate {
    #[must_use]
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            last_pass: None,
        }
    }

    /// Sleeps until the jittered delay since the previous pass has
    /// elapsed. The first call never sleeps.
    pub async fn wait(&mut self) {
        if let Some(last) = self.last_pass {
            let target = jittered(self.delay);
            let elapsed = last.elapsed();
            if elapsed < target {
                tokio::time::sleep(target - elapsed).await;
            }
        }
        self.last_pass = Some(Instant::now());
    }
}

fn jittered(delay: Duration) -> Duration {
    let factor = rand::rng().random_range((1.0 - JITTER_FRACTION)..=(1.0 + JITTER_FRACTION));
    delay.mul_f64(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_within_bounds() {
        let base = Duration::from_millis(1_000);
        for _ in 0..100 {
            let j = jittered(base);
            assert!(j >= Duration::from_millis(750), "jitter too low: {j:?}");
            assert!(j <= Duration::from_millis(1_250), "jitter too high: {j:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_wait_does_not_sleep() {
        let mut gate = RateGate::new(5_000);
        let before = Instant::now();
        gate.wait().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn second_wait_enforces_spacing() {
        let mut gate = RateGate::new(1_000);
        gate.wait().await;
        let before = Instant::now();
        gate.wait().await;
        let waited = Instant::now() - before;
        // Lower jitter bound is 750 ms.
        assert!(waited >= Duration::from_millis(750), "waited {waited:?}");
    }
}
