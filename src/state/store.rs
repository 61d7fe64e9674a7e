use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;
use std::num::NonZeroI64;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;

use crate::errors::{StoreError, UnexpectedState};
use crate::services::expiry::{ExpiryScheduler, TokioExpiry};
use crate::state::counters::ValueCounters;

/// Anything usable as a key: the store only hashes and compares it.
pub trait StoreKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> StoreKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// One recorded (key, value, timestamp) event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation<K> {
    pub key: K,
    pub value: i64,
    pub observed_at: Instant,
}

/// What happened when an observation's expiry fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpiryOutcome {
    /// The matching decrement was applied.
    Expired { remaining: u64 },
    /// Nothing to decrement; already logged.
    Anomalous(UnexpectedState),
}

struct Inner<K> {
    keys: RwLock<HashMap<K, Arc<ValueCounters>>>,
    scheduler: Arc<dyn ExpiryScheduler<K>>,
}

/// Shared counting store, cloned into every request handler.
///
/// The outer lock only guards finding or creating a key's
/// [`ValueCounters`]; it is released before the per-key lock is taken, so
/// unrelated keys are mutated in parallel.
pub struct KeyStore<K> {
    inner: Arc<Inner<K>>,
}

impl<K> Clone for KeyStore<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: StoreKey> KeyStore<K> {
    pub fn new(scheduler: impl ExpiryScheduler<K> + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                keys: RwLock::new(HashMap::new()),
                scheduler: Arc::new(scheduler),
            }),
        }
    }

    /// Store whose observations expire `ttl` after they were made.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(TokioExpiry::new(ttl))
    }

    /// Count one occurrence of `value` under `key` and schedule its expiry.
    ///
    /// The increment is applied before the expiry is handed to the
    /// scheduler, so a decrement can never overtake its increment.
    pub fn record_observation(&self, key: K, value: NonZeroI64, observed_at: Instant) {
        let value = value.get();
        let count = self.counters_for(&key).increment(value);

        tracing::debug!(?key, value, count, "observation recorded");

        self.inner.scheduler.schedule(
            self.clone(),
            Observation {
                key,
                value,
                observed_at,
            },
        );
    }

    /// Every value recorded under `key` with its live count.
    pub fn query_summary(&self, key: &K) -> Result<BTreeMap<i64, u64>, StoreError> {
        self.lookup(key)
            .map(|counters| counters.snapshot())
            .ok_or(StoreError::NotFound)
    }

    /// Sum of all live values recorded under `key`.
    pub fn sum(&self, key: &K) -> Result<i64, StoreError> {
        self.lookup(key)
            .map(|counters| counters.sum())
            .ok_or(StoreError::NotFound)
    }

    /// Number of keys ever observed.
    pub fn key_count(&self) -> usize {
        self.inner
            .keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Apply the decrement matching `observation`.
    ///
    /// A missing target is logged and reported, never retried.
    pub fn expire(&self, observation: &Observation<K>) -> ExpiryOutcome {
        let result = match self.lookup(&observation.key) {
            None => Err(UnexpectedState::MissingKey),
            Some(counters) => counters.decrement(observation.value),
        };

        match result {
            Ok(remaining) => {
                tracing::debug!(
                    key = ?observation.key,
                    value = observation.value,
                    remaining,
                    "observation expired"
                );
                ExpiryOutcome::Expired { remaining }
            }
            Err(anomaly) => {
                tracing::error!(
                    key = ?observation.key,
                    value = observation.value,
                    observed_at = ?observation.observed_at,
                    age = ?observation.observed_at.elapsed(),
                    %anomaly,
                    "unable to decrement expired observation, this should not happen"
                );
                ExpiryOutcome::Anomalous(anomaly)
            }
        }
    }

    fn lookup(&self, key: &K) -> Option<Arc<ValueCounters>> {
        self.inner
            .keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Find the key's counters, creating them under the write lock if absent.
    pub(crate) fn counters_for(&self, key: &K) -> Arc<ValueCounters> {
        if let Some(counters) = self.lookup(key) {
            return counters;
        }

        let mut keys = self
            .inner
            .keys
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Another writer may have created it between the two locks.
        Arc::clone(keys.entry(key.clone()).or_default())
    }
}
