pub mod counters;
pub mod store;

pub use counters::ValueCounters;
pub use store::{ExpiryOutcome, KeyStore, Observation, StoreKey};
