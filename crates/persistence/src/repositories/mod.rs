//! Repository implementations.

pub mod connection;
pub mod export_record;
pub mod sync_log;
pub mod synced_device;

pub use connection::ConnectionRepository;
pub use export_record::ExportRecordRepository;
pub use sync_log::SyncLogRepository;
pub use synced_device::SyncedDeviceRepository;
