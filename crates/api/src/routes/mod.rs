//! HTTP endpoint handlers.

pub mod connections;
pub mod devices;
pub mod events;
pub mod health;
pub mod sync_logs;
