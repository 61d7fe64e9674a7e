pub mod expiry;
pub mod metric_service;
