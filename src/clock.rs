// Authoritative time for lecture unlocking. Client clocks are never
// trusted; the backend's server-time RPC is cached here with a short TTL.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::backend::TimeSource;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

struct Cached {
    value: DateTime<Utc>,
    fetched_at: Instant,
}

/// Read-through cache over a `TimeSource`. At most one refresh per TTL
/// window; concurrent misses may each fetch, which is harmless since both
/// converge on roughly the same timestamp. Never fails: a fetch error
/// degrades to the local wall clock and leaves the cache untouched.
pub struct ServerClock<S> {
    source: S,
    ttl: Duration,
    override_now: Option<DateTime<Utc>>,
    cache: Mutex<Option<Cached>>,
}

impl<S: TimeSource> ServerClock<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        ServerClock {
            source,
            ttl,
            override_now: None,
            cache: Mutex::new(None),
        }
    }

    /// Pins `now()` to a fixed timestamp, bypassing cache and network.
    pub fn with_override(source: S, now: DateTime<Utc>) -> Self {
        let mut clock = Self::new(source, DEFAULT_TTL);
        clock.override_now = Some(now);
        clock
    }

    pub async fn now(&self) -> DateTime<Utc> {
        if let Some(pinned) = self.override_now {
            return pinned;
        }
        if let Some(cached) = self.cache.lock().unwrap().as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                return cached.value;
            }
        }
        match self.source.fetch_now().await {
            Ok(value) => {
                *self.cache.lock().unwrap() = Some(Cached {
                    value,
                    fetched_at: Instant::now(),
                });
                value
            }
            Err(e) => {
                tracing::warn!(error = %e, "server-time fetch failed, falling back to local clock");
                Utc::now()
            }
        }
    }

    #[cfg(test)]
    fn cached_value(&self) -> Option<DateTime<Utc>> {
        self.cache.lock().unwrap().as_ref().map(|c| c.value)
    }
}
