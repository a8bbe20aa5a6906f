//! In-memory memoization of provider fetches.
//!
//! Repeated scans of the same symbol and range (e.g. a multiplier sweep, or
//! re-running with a different band mode) should not hit the network again.
//! Entries are keyed by `(symbol, start, end)` and expire after a fixed TTL.
//! Only successful fetches are cached.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::debug;

use super::provider::{DataError, DataProvider, FetchResult};

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

type MemoKey = (String, NaiveDate, NaiveDate);

/// Wraps another provider with a TTL cache.
pub struct MemoProvider<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<MemoKey, (Instant, FetchResult)>>,
}

impl<P: DataProvider> MemoProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    pub fn with_ttl(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MemoKey, (Instant, FetchResult)>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<P: DataProvider> DataProvider for MemoProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let key = (symbol.to_string(), start, end);

        if let Some((stored_at, cached)) = self.lock().get(&key) {
            if stored_at.elapsed() < self.ttl {
                debug!(symbol, %start, %end, "memo hit");
                return Ok(cached.clone());
            }
        }

        // Lock is released across the inner fetch.
        debug!(symbol, %start, %end, "memo miss");
        let fetched = self.inner.fetch(symbol, start, end)?;
        self.lock().insert(key, (Instant::now(), fetched.clone()));
        Ok(fetched)
    }
}
