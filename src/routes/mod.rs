pub mod metric_routes;
pub mod system_routes;
