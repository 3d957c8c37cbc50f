//! Entity definitions (database row mappings).

pub mod connection;
pub mod export_record;
pub mod sync_log;
pub mod synced_device;

pub use connection::ConnectionEntity;
pub use export_record::ExportRecordEntity;
pub use sync_log::SyncLogEntity;
pub use synced_device::SyncedDeviceEntity;
