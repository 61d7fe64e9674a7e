use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::errors::UnexpectedState;

/// Live occurrence counts for every value reported under one key.
///
/// Each instance carries its own lock, so mutations on one key never wait
/// on another key. Entries that drop back to zero are kept.
#[derive(Debug, Default)]
pub struct ValueCounters {
    counts: Mutex<HashMap<i64, u64>>,
}

impl ValueCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `value` and return the new count.
    pub fn increment(&self, value: i64) -> u64 {
        let mut counts = self.lock();
        let count = counts.entry(value).or_insert(0);
        *count += 1;
        *count
    }

    /// Remove one occurrence of `value` and return the remaining count.
    ///
    /// The entry stays in the map even when it reaches zero.
    pub fn decrement(&self, value: i64) -> Result<u64, UnexpectedState> {
        let mut counts = self.lock();
        match counts.get_mut(&value) {
            None => Err(UnexpectedState::MissingValue { value }),
            Some(0) => Err(UnexpectedState::Underflow { value }),
            Some(count) => {
                *count -= 1;
                Ok(*count)
            }
        }
    }

    /// Consistent copy of every (value, count) pair, ordered by value.
    pub fn snapshot(&self) -> BTreeMap<i64, u64> {
        self.lock().iter().map(|(v, c)| (*v, *c)).collect()
    }

    /// Sum of `value * count` over all live occurrences, clamped to `i64`.
    ///
    /// Each product fits in `i128`; clamping only once keeps the result
    /// independent of map iteration order.
    pub fn sum(&self) -> i64 {
        let total = self.lock().iter().fold(0i128, |acc, (value, count)| {
            acc.saturating_add(i128::from(*value) * i128::from(*count))
        });
        i64::try_from(total).unwrap_or(if total < 0 { i64::MIN } else { i64::MAX })
    }

    // Every critical section leaves the map consistent, so a poisoned
    // guard is still safe to use.
    pub(crate) fn lock(&self) -> MutexGuard<'_, HashMap<i64, u64>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
