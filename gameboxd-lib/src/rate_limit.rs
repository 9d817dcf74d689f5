//! Fixed-window request limiter keyed by client identifier.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Buckets kept before expired ones are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// Returned when a client is over its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    /// Time until the current window closes.
    pub retry_after: Duration,
}

struct Bucket {
    window_start: Instant,
    count: u32,
}

#[derive(Default)]
struct Buckets {
    by_client: HashMap<String, Bucket>,
    last_sweep: Option<Instant>,
}

/// Allows `limit` requests per client in each `window`.
///
/// One instance is shared by every request it guards; nothing is global.
pub struct FixedWindowLimiter {
    limit: u32,
    window: Duration,
    sweep_threshold: usize,
    buckets: Mutex<Buckets>,
}

impl FixedWindowLimiter {
    /// A `limit` of zero disables limiting.
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            sweep_threshold: SWEEP_THRESHOLD,
            buckets: Mutex::new(Buckets::default()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count one request from `client`.
    pub fn check(&self, client: &str) -> Result<(), RateLimited> {
        self.check_at(client, Instant::now())
    }

    /// [`check`](Self::check) with an explicit clock.
    pub fn check_at(&self, client: &str, now: Instant) -> Result<(), RateLimited> {
        if self.limit == 0 {
            return Ok(());
        }

        // Counters stay usable after a panic elsewhere.
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);

        // At most one sweep per window, however many clients show up.
        let due = buckets
            .last_sweep
            .is_none_or(|at| now.duration_since(at) >= self.window);
        if buckets.by_client.len() >= self.sweep_threshold && due {
            let window = self.window;
            buckets
                .by_client
                .retain(|_, b| now.duration_since(b.window_start) < window);
            buckets.last_sweep = Some(now);
        }

        let bucket = buckets.by_client.entry(client.to_string()).or_insert(Bucket {
            window_start: now,
            count: 0,
        });

        let elapsed = now.duration_since(bucket.window_start);
        if elapsed >= self.window {
            bucket.window_start = now;
            bucket.count = 0;
        }

        if bucket.count >= self.limit {
            return Err(RateLimited {
                retry_after: self.window.saturating_sub(now.duration_since(bucket.window_start)),
            });
        }
        bucket.count += 1;
        Ok(())
    }
}
