//! Per-provider request spacing
//!
//! `RateLimiter::acquire` suspends the caller until the provider's minimum
//! interval has elapsed since the previous dispatch (and, when configured,
//! until the sliding one-minute window has room). The check-and-update runs
//! under a per-provider async mutex, so concurrent callers queue up instead of
//! both reading the same timestamp.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::config::RateLimitConfig;
use crate::types::ProviderId;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct Slot {
    last_dispatch_at: Option<Instant>,
    /// Dispatch times inside the current window (only kept with `max_per_minute`)
    window: VecDeque<Instant>,
}

impl Slot {
    fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.window.front() {
            if now.duration_since(*oldest) >= WINDOW {
                self.window.pop_front();
            } else {
                break;
            }
        }
    }

    /// How long a dispatch at `now` has to wait.
    fn required_wait(&mut self, limit: &RateLimitConfig, now: Instant) -> Duration {
        let mut wait = Duration::ZERO;

        let min_interval = limit.interval();
        if let Some(last) = self.last_dispatch_at {
            let elapsed = now.duration_since(last);
            if elapsed < min_interval {
                wait = min_interval - elapsed;
            }
        }

        if let Some(max) = limit.max_per_minute {
            self.prune(now);
            if self.window.len() >= max as usize
                && let Some(oldest) = self.window.front()
            {
                let frees_at = *oldest + WINDOW;
                wait = wait.max(frees_at.saturating_duration_since(now));
            }
        }

        wait
    }

    fn record(&mut self, limit: &RateLimitConfig, at: Instant) {
        self.last_dispatch_at = Some(at);
        if limit.max_per_minute.is_some() {
            self.window.push_back(at);
        }
    }
}

#[derive(Debug)]
struct Entry {
    limit: Mutex<RateLimitConfig>,
    slot: tokio::sync::Mutex<Slot>,
}

/// Shared limiter keyed by provider.
#[derive(Debug, Default)]
pub struct RateLimiter {
    entries: Mutex<HashMap<ProviderId, Arc<Entry>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor returning a shareable limiter.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register (or replace) the limit for a provider.
    ///
    /// Replacing a limit keeps the dispatch history, so spacing is preserved.
    pub fn set_limit(&self, provider: ProviderId, limit: RateLimitConfig) {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        match entries.get(&provider) {
            Some(entry) => *entry.limit.lock().unwrap_or_else(|p| p.into_inner()) = limit,
            None => {
                entries.insert(
                    provider,
                    Arc::new(Entry {
                        limit: Mutex::new(limit),
                        slot: tokio::sync::Mutex::new(Slot::default()),
                    }),
                );
            }
        }
    }

    /// Currently registered limit for `provider`.
    pub fn limit(&self, provider: ProviderId) -> Option<RateLimitConfig> {
        self.entry(provider)
            .map(|entry| entry.limit.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }

    /// Wait until a dispatch to `provider` is permitted and record it.
    ///
    /// Providers without a registered limit pass straight through. Returns
    /// the time spent waiting.
    pub async fn acquire(&self, provider: ProviderId) -> Duration {
        let Some(entry) = self.entry(provider) else {
            return Duration::ZERO;
        };

        let mut slot = entry.slot.lock().await;
        let limit = entry.limit.lock().unwrap_or_else(|p| p.into_inner()).clone();
        let wait = slot.required_wait(&limit, Instant::now());
        if !wait.is_zero() {
            tracing::debug!(
                target: "moodreel::rate_limit",
                provider = %provider,
                wait_ms = wait.as_millis() as u64,
                "waiting for rate limit"
            );
            tokio::time::sleep(wait).await;
        }
        slot.record(&limit, Instant::now());
        wait
    }

    /// Time of the last recorded dispatch for `provider`.
    pub async fn last_dispatch_at(&self, provider: ProviderId) -> Option<Instant> {
        let entry = self.entry(provider)?;
        let slot = entry.slot.lock().await;
        slot.last_dispatch_at
    }

    fn entry(&self, provider: ProviderId) -> Option<Arc<Entry>> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.get(&provider).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn second_acquire_waits_for_min_interval() {
        let limiter = RateLimiter::new();
        limiter.set_limit(
            ProviderId::RemoveBg,
            RateLimitConfig::min_interval(Duration::from_millis(1000)),
        );

        let first = limiter.acquire(ProviderId::RemoveBg).await;
        let first_at = Instant::now();
        let second = limiter.acquire(ProviderId::RemoveBg).await;

        assert_eq!(first, Duration::ZERO);
        assert_eq!(second, Duration::from_millis(1000));
        assert!(Instant::now().duration_since(first_at) >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_time_counts_toward_interval() {
        let limiter = RateLimiter::new();
        limiter.set_limit(
            ProviderId::RemoveBg,
            RateLimitConfig::min_interval(Duration::from_millis(1000)),
        );

        limiter.acquire(ProviderId::RemoveBg).await;
        tokio::time::advance(Duration::from_millis(700)).await;
        let waited = limiter.acquire(ProviderId::RemoveBg).await;
        assert_eq!(waited, Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_stays_pending_until_interval_elapses() {
        let limiter = RateLimiter::new();
        limiter.set_limit(
            ProviderId::RemoveBg,
            RateLimitConfig::min_interval(Duration::from_millis(1000)),
        );
        limiter.acquire(ProviderId::RemoveBg).await;

        let mut second = tokio_test::task::spawn(limiter.acquire(ProviderId::RemoveBg));
        tokio_test::assert_pending!(second.poll());
        tokio::time::advance(Duration::from_millis(999)).await;
        tokio_test::assert_pending!(second.poll());
        tokio::time::advance(Duration::from_millis(1)).await;
        tokio_test::assert_ready!(second.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn unregistered_provider_is_not_limited() {
        let limiter = RateLimiter::new();
        assert_eq!(limiter.acquire(ProviderId::Stripe).await, Duration::ZERO);
        assert_eq!(limiter.acquire(ProviderId::Stripe).await, Duration::ZERO);
        assert!(limiter.last_dispatch_at(ProviderId::Stripe).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn window_cap_holds_back_the_overflowing_call() {
        let limiter = RateLimiter::new();
        limiter.set_limit(
            ProviderId::RemoveBg,
            RateLimitConfig::unlimited().with_max_per_minute(2),
        );

        let start = Instant::now();
        limiter.acquire(ProviderId::RemoveBg).await;
        limiter.acquire(ProviderId::RemoveBg).await;
        let waited = limiter.acquire(ProviderId::RemoveBg).await;

        assert_eq!(waited, WINDOW);
        assert!(Instant::now().duration_since(start) >= WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_are_serialized() {
        let limiter = Arc::new(RateLimiter::new());
        limiter.set_limit(
            ProviderId::ElevenLabs,
            RateLimitConfig::min_interval(Duration::from_millis(500)),
        );

        let start = Instant::now();
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    limiter.acquire(ProviderId::ElevenLabs).await;
                    Instant::now()
                })
            })
            .collect();

        let mut finished = Vec::new();
        for handle in handles {
            finished.push(handle.await.unwrap());
        }
        finished.sort();

        assert!(finished[1].duration_since(finished[0]) >= Duration::from_millis(500));
        assert!(finished[2].duration_since(finished[1]) >= Duration::from_millis(500));
        assert!(finished[2].duration_since(start) >= Duration::from_millis(1000));
    }
}
