//! Domain service traits and supporting implementations.

pub mod inventory;

pub use inventory::{InMemorySourceInventory, SourceInventory};
