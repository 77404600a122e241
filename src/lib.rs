pub mod configuration;
pub mod domain;
pub mod fallback_store;
pub mod routes;
pub mod startup;
pub mod submission_sink;
pub mod telemetry;
pub mod utils;
pub mod webhook_client;
pub mod widgets;
