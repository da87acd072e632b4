pub mod attribution;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod page;
pub mod queue;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod tracker;
