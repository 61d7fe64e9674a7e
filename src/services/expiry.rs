use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::sleep_until;

use crate::state::store::{ExpiryOutcome, KeyStore, Observation, StoreKey};

/// How long an observation stays counted.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Arranges exactly one future decrement for each recorded observation.
pub trait ExpiryScheduler<K>: Send + Sync {
    /// Called once per observation, after its increment has been applied.
    fn schedule(&self, store: KeyStore<K>, observation: Observation<K>);
}

/// One tokio timer task per observation.
///
/// Deadlines are anchored on the observation's own timestamp. Tasks are
/// never batched, reordered or cancelled; they die with the runtime.
/// Outside a tokio runtime, or when the deadline is unrepresentable, the
/// expiry is logged as lost instead of scheduled.
#[derive(Debug, Clone, Copy)]
pub struct TokioExpiry {
    ttl: Duration,
}

impl TokioExpiry {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for TokioExpiry {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<K: StoreKey> ExpiryScheduler<K> for TokioExpiry {
    fn schedule(&self, store: KeyStore<K>, observation: Observation<K>) {
        let Some(deadline) = observation.observed_at.checked_add(self.ttl) else {
            tracing::error!(
                key = ?observation.key,
                value = observation.value,
                ttl = ?self.ttl,
                "expiry deadline overflows the clock, observation will never expire"
            );
            return;
        };

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(
                    key = ?observation.key,
                    value = observation.value,
                    error = %e,
                    "no tokio runtime to schedule expiry, observation will never expire"
                );
                return;
            }
        };

        handle.spawn(async move {
            sleep_until(deadline).await;

            if let ExpiryOutcome::Anomalous(_) = store.expire(&observation) {
                // Already logged by the store; the observation is done either way.
                tracing::debug!(key = ?observation.key, "expiry finished anomalously");
            }
        });
    }
}
