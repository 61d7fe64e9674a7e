//! In-process counting store: per key, how many times each integer value
//! was reported within a rolling window, plus a small axum front end.

pub mod app;
pub mod config;
pub mod errors;
pub mod routes;
pub mod services;
pub mod state;

pub use errors::{StoreError, UnexpectedState, ValidationError};
pub use services::expiry::{ExpiryScheduler, TokioExpiry, DEFAULT_TTL};
pub use state::{ExpiryOutcome, KeyStore, Observation, ValueCounters};
