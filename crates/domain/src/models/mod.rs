//! Domain model definitions.

pub mod conflict;
pub mod connection;
pub mod export_record;
pub mod source_device;
pub mod sync_log;
pub mod synced_device;

pub use conflict::{ConflictSide, IpConflict, IpConflictReport};
pub use connection::{
    Connection, ConnectionResponse, CreateConnectionRequest, UpdateConnectionRequest,
    DEFAULT_MONITOR_PORT,
};
pub use export_record::{ExportRecord, ExportStats, ExportStatus};
pub use source_device::{SourceDevice, SourceDeviceStatus};
pub use sync_log::{SyncLog, SyncLogResponse, SyncLogStatus, SyncType};
pub use synced_device::{SyncStatus, SyncedDevice, SyncedDeviceResponse, SyncedDeviceStats};
