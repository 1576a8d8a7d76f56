//! Sliding-window publish rate limiting.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::{BusError, BusResult};
use crate::publisher::Publisher;

/// Default publish budget per window.
pub const DEFAULT_MESSAGES_PER_SECOND: u32 = 10;

/// Admits at most `limit` events in any sliding `window`.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    admitted: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            admitted: VecDeque::with_capacity(limit as usize),
        }
    }

    pub fn per_second(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(1))
    }

    /// Try to admit one event at `now`.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        while let Some(&oldest) = self.admitted.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.admitted.pop_front();
            } else {
                break;
            }
        }
        if self.admitted.len() < self.limit as usize {
            self.admitted.push_back(now);
            true
        } else {
            false
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::per_second(DEFAULT_MESSAGES_PER_SECOND)
    }
}

/// Publisher wrapper that drops messages beyond the limiter's budget.
///
/// Dropped messages are reported as [`BusError::RateLimited`] and counted.
#[derive(Debug)]
pub struct RateLimitedPublisher<P> {
    inner: P,
    limiter: Mutex<RateLimiter>,
    dropped: AtomicU64,
}

impl<P: Publisher> RateLimitedPublisher<P> {
    pub fn new(inner: P, limiter: RateLimiter) -> Self {
        Self {
            inner,
            limiter: Mutex::new(limiter),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn publish_at(&self, topic: &str, payload: &str, now: Instant) -> BusResult<()> {
        let admitted = self
            .limiter
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .try_acquire(now);
        if !admitted {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(target: "bus", topic, "rate limit exceeded");
            return Err(BusError::RateLimited {
                topic: topic.to_string(),
            });
        }
        self.inner.publish(topic, payload)
    }
}

impl<P: Publisher> Publisher for RateLimitedPublisher<P> {
    fn publish(&self, topic: &str, payload: &str) -> BusResult<()> {
        self.publish_at(topic, payload, Instant::now())
    }
}
