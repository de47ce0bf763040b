// Common library for shared code across the dispatcher binary and tooling

pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod errors;
pub mod message;
pub mod models;
pub mod notify;
pub mod store;
pub mod telemetry;
