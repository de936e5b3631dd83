use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;

use crate::config::FreshnessPolicy;

/// single-value cache with an explicit freshness policy
///
/// Time is read from the injected provider on every call, so tests can drive expiry.
#[derive(Debug, Clone)]
pub struct ConfigCache<T> {
    policy: FreshnessPolicy,
    entry: Option<CacheEntry<T>>,
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    stored_at: DateTime<Utc>,
}

impl<T> ConfigCache<T> {
    pub fn new(policy: FreshnessPolicy) -> Self {
        Self {
            policy,
            entry: None,
        }
    }

    pub fn policy(&self) -> FreshnessPolicy {
        self.policy
    }

    /// change the freshness policy; the current entry is judged against the new ttl
    pub fn set_policy(&mut self, policy: FreshnessPolicy) {
        self.policy = policy;
    }

    pub fn put(&mut self, value: T, time_provider: &SafeTimeProvider) {
        self.entry = Some(CacheEntry {
            value,
            stored_at: time_provider.now(),
        });
    }

    /// fresh value, if any
    pub fn get(&self, time_provider: &SafeTimeProvider) -> Option<&T> {
        let now = time_provider.now();
        self.entry
            .as_ref()
            .filter(|entry| self.is_fresh_at(entry, now))
            .map(|entry| &entry.value)
    }

    /// last stored value regardless of age
    pub fn last_known(&self) -> Option<&T> {
        self.entry.as_ref().map(|entry| &entry.value)
    }

    pub fn is_fresh(&self, time_provider: &SafeTimeProvider) -> bool {
        self.get(time_provider).is_some()
    }

    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            tracing::debug!("config cache invalidated");
        }
    }

    /// return the fresh value or load a new one; a failed load keeps the stale entry
    pub fn get_or_refresh<E, F>(&mut self, time_provider: &SafeTimeProvider, loader: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let now = time_provider.now();
        let is_fresh = self
            .entry
            .as_ref()
            .map(|entry| self.is_fresh_at(entry, now))
            .unwrap_or(false);
        let fresh = if is_fresh { self.entry.take() } else { None };

        let entry = match fresh {
            Some(entry) => entry,
            None => {
                tracing::debug!("config cache miss, loading");
                CacheEntry {
                    value: loader()?,
                    stored_at: now,
                }
            }
        };

        Ok(&self.entry.insert(entry).value)
    }

    fn is_fresh_at(&self, entry: &CacheEntry<T>, now: DateTime<Utc>) -> bool {
        now - entry.stored_at < self.policy.ttl()
    }
}

impl<T> Default for ConfigCache<T> {
    fn default() -> Self {
        Self::new(FreshnessPolicy::default())
    }
}
