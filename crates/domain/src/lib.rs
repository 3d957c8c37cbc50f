//! Domain layer for the Inventory Sync backend.
//!
//! Contains the core domain models (connections, synced devices, sync
//! logs, export records), request/response DTOs, and the collaborator
//! trait for the external source-of-truth inventory.

pub mod models;
pub mod services;
